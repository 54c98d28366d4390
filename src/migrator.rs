use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_products_table::Migration),
            Box::new(m20240101_000002_create_ledger_tables::Migration),
            Box::new(m20240101_000003_create_purchases_table::Migration),
            Box::new(m20240101_000004_create_sales_table::Migration),
            Box::new(m20240101_000005_create_payments_table::Migration),
            Box::new(m20240101_000006_create_preturns_table::Migration),
            Box::new(m20240101_000007_create_receiving_tables::Migration),
            Box::new(m20240101_000008_create_images_table::Migration),
            Box::new(m20240101_000009_create_notifications_table::Migration),
        ]
    }
}

mod m20240101_000001_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Unit).string().not_null())
                        .col(ColumnDef::new(Products::Cost).decimal().not_null())
                        .col(ColumnDef::new(Products::Price).decimal().not_null())
                        .col(
                            ColumnDef::new(Products::AlertQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
        Name,
        Code,
        Unit,
        Cost,
        Price,
        AlertQuantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_ledger_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_ledger_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLines::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLines::OwnerKind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLines::OwnerId).big_integer().not_null())
                        .col(
                            ColumnDef::new(OrderLines::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLines::UnitAmount).decimal().not_null())
                        .col(ColumnDef::new(OrderLines::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderLines::Subtotal).decimal().not_null())
                        .col(ColumnDef::new(OrderLines::ExpiryDate).date().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_order_lines_owner")
                        .table(OrderLines::Table)
                        .col(OrderLines::OwnerKind)
                        .col(OrderLines::OwnerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockLevels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockLevels::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLevels::StoreId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLevels::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLevels::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockLevels::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockLevels::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_levels_store_product")
                        .table(StockLevels::Table)
                        .col(StockLevels::StoreId)
                        .col(StockLevels::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockLevels::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderLines::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum OrderLines {
        Table,
        Id,
        OwnerKind,
        OwnerId,
        ProductId,
        UnitAmount,
        Quantity,
        Subtotal,
        ExpiryDate,
    }

    #[derive(Iden)]
    enum StockLevels {
        Table,
        Id,
        StoreId,
        ProductId,
        Quantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_purchases_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_purchases_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Purchases::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Purchases::ReferenceNo).string().not_null())
                        .col(
                            ColumnDef::new(Purchases::PurchasedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Purchases::StoreId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Purchases::CompanyId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Purchases::UserId).big_integer().not_null())
                        .col(ColumnDef::new(Purchases::CreditDays).integer().null())
                        .col(ColumnDef::new(Purchases::PaymentDueAt).timestamp().null())
                        .col(
                            ColumnDef::new(Purchases::Discount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Purchases::Shipping)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Purchases::GrandTotal).decimal().not_null())
                        .col(ColumnDef::new(Purchases::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Purchases::Note).string().null())
                        .col(ColumnDef::new(Purchases::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Purchases::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_purchases_supplier_reference")
                        .table(Purchases::Table)
                        .col(Purchases::SupplierId)
                        .col(Purchases::ReferenceNo)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Purchases {
        Table,
        Id,
        ReferenceNo,
        PurchasedAt,
        StoreId,
        CompanyId,
        SupplierId,
        UserId,
        CreditDays,
        PaymentDueAt,
        Discount,
        Shipping,
        GrandTotal,
        Status,
        Note,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_sales_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sales::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Sales::ReferenceNo).string().not_null())
                        .col(ColumnDef::new(Sales::SoldAt).timestamp().not_null())
                        .col(ColumnDef::new(Sales::StoreId).big_integer().not_null())
                        .col(ColumnDef::new(Sales::CompanyId).big_integer().not_null())
                        .col(ColumnDef::new(Sales::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Sales::UserId).big_integer().not_null())
                        .col(ColumnDef::new(Sales::BillerId).big_integer().not_null())
                        .col(ColumnDef::new(Sales::GrandTotal).decimal().not_null())
                        .col(ColumnDef::new(Sales::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Sales::Note).string().null())
                        .col(ColumnDef::new(Sales::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Sales::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_customer_reference")
                        .table(Sales::Table)
                        .col(Sales::CustomerId)
                        .col(Sales::ReferenceNo)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Sales {
        Table,
        Id,
        ReferenceNo,
        SoldAt,
        StoreId,
        CompanyId,
        CustomerId,
        UserId,
        BillerId,
        GrandTotal,
        Status,
        Note,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_payments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_payments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Payments::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::PaidAt).timestamp().not_null())
                        .col(ColumnDef::new(Payments::ReferenceNo).string().not_null())
                        .col(ColumnDef::new(Payments::Amount).decimal().not_null())
                        .col(ColumnDef::new(Payments::Note).string().null())
                        .col(
                            ColumnDef::new(Payments::PayableKind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::PayableId).big_integer().not_null())
                        .col(ColumnDef::new(Payments::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_payments_payable")
                        .table(Payments::Table)
                        .col(Payments::PayableKind)
                        .col(Payments::PayableId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Payments {
        Table,
        Id,
        PaidAt,
        ReferenceNo,
        Amount,
        Note,
        PayableKind,
        PayableId,
        Status,
        CreatedAt,
    }
}

mod m20240101_000006_create_preturns_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_preturns_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Preturns::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Preturns::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Preturns::ReturnedAt).timestamp().not_null())
                        .col(ColumnDef::new(Preturns::ReferenceNo).string().not_null())
                        .col(ColumnDef::new(Preturns::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(Preturns::PurchaseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Preturns::Note).string().null())
                        .col(ColumnDef::new(Preturns::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Preturns::Attachment).string().null())
                        .col(ColumnDef::new(Preturns::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_preturns_purchase")
                        .table(Preturns::Table)
                        .col(Preturns::PurchaseId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Preturns::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Preturns {
        Table,
        Id,
        ReturnedAt,
        ReferenceNo,
        Amount,
        PurchaseId,
        Note,
        Status,
        Attachment,
        CreatedAt,
    }
}

mod m20240101_000007_create_receiving_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_receiving_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PreOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PreOrders::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PreOrders::UserId).big_integer().not_null())
                        .col(ColumnDef::new(PreOrders::OrderedAt).timestamp().not_null())
                        .col(ColumnDef::new(PreOrders::ReferenceNo).string().not_null())
                        .col(
                            ColumnDef::new(PreOrders::CompanyId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreOrders::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PreOrders::Discount).string().null())
                        .col(ColumnDef::new(PreOrders::Note).string().null())
                        .col(ColumnDef::new(PreOrders::GrandTotal).decimal().not_null())
                        .col(ColumnDef::new(PreOrders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(PreOrders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PreOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PreOrderItems::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreOrderItems::PreOrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PreOrderItems::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PreOrderItems::Cost).decimal().not_null())
                        .col(ColumnDef::new(PreOrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(PreOrderItems::Discount).string().null())
                        .col(ColumnDef::new(PreOrderItems::CategoryId).big_integer().null())
                        .col(ColumnDef::new(PreOrderItems::Subtotal).decimal().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Receipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Receipts::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Receipts::PreOrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Receipts::StoreId).big_integer().not_null())
                        .col(ColumnDef::new(Receipts::CompanyId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Receipts::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Receipts::ReferenceNo).string().not_null())
                        .col(ColumnDef::new(Receipts::ShippingCarrier).string().null())
                        .col(ColumnDef::new(Receipts::ReceivedAt).timestamp().not_null())
                        .col(ColumnDef::new(Receipts::TotalAmount).decimal().not_null())
                        .col(ColumnDef::new(Receipts::Note).string().null())
                        .col(ColumnDef::new(Receipts::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Receipts::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_receipts_pre_order")
                        .table(Receipts::Table)
                        .col(Receipts::PreOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReceiptItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReceiptItems::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceiptItems::ReceiptId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceiptItems::PreOrderItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceiptItems::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReceiptItems::Cost).decimal().not_null())
                        .col(ColumnDef::new(ReceiptItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(ReceiptItems::Amount).decimal().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_receipt_items_pre_order_item")
                        .table(ReceiptItems::Table)
                        .col(ReceiptItems::PreOrderItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReceiptItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Receipts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PreOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PreOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PreOrders {
        Table,
        Id,
        UserId,
        OrderedAt,
        ReferenceNo,
        CompanyId,
        SupplierId,
        Discount,
        Note,
        GrandTotal,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum PreOrderItems {
        Table,
        Id,
        PreOrderId,
        ProductId,
        Cost,
        Quantity,
        Discount,
        CategoryId,
        Subtotal,
    }

    #[derive(Iden)]
    enum Receipts {
        Table,
        Id,
        PreOrderId,
        StoreId,
        CompanyId,
        SupplierId,
        ReferenceNo,
        ShippingCarrier,
        ReceivedAt,
        TotalAmount,
        Note,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum ReceiptItems {
        Table,
        Id,
        ReceiptId,
        PreOrderItemId,
        ProductId,
        Cost,
        Quantity,
        Amount,
    }
}

mod m20240101_000008_create_images_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_images_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Images::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Images::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Images::OwnerKind).string_len(32).not_null())
                        .col(ColumnDef::new(Images::OwnerId).big_integer().not_null())
                        .col(ColumnDef::new(Images::Path).string().not_null())
                        .col(ColumnDef::new(Images::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_images_owner")
                        .table(Images::Table)
                        .col(Images::OwnerKind)
                        .col(Images::OwnerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Images::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Images {
        Table,
        Id,
        OwnerKind,
        OwnerId,
        Path,
        CreatedAt,
    }
}

mod m20240101_000009_create_notifications_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Notifications::Kind)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Notifications::ReferenceNo)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(Notifications::CompanyId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Notifications {
        Table,
        Id,
        Kind,
        ReferenceNo,
        Amount,
        CompanyId,
        CreatedAt,
    }
}
