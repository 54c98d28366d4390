mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal_macros::dec;

use common::{admin, secretary, user, user_of_company, TestApp};
use tradeledger_api::errors::ServiceError;
use tradeledger_api::services::inventory;
use tradeledger_api::services::receiving::{
    CreatePreOrderInput, PreOrderItemInput, ReceiveInput, ReceiveItemInput,
};

const STORE: i64 = 1;

fn pre_order_input(reference_no: &str, product_id: i64) -> CreatePreOrderInput {
    CreatePreOrderInput {
        ordered_at: Utc::now(),
        reference_no: reference_no.to_string(),
        supplier_id: 7,
        discount: None,
        note: None,
        items: vec![PreOrderItemInput {
            product_id,
            cost: dec!(100),
            quantity: 10,
            discount: Some("10%".to_string()),
            category_id: None,
        }],
        attachments: vec![],
    }
}

fn receive_input(reference_no: &str, pre_order_item_id: i64, quantity: i32) -> ReceiveInput {
    ReceiveInput {
        received_at: Utc::now(),
        reference_no: reference_no.to_string(),
        store_id: STORE,
        shipping_carrier: None,
        note: None,
        items: vec![ReceiveItemInput {
            pre_order_item_id,
            cost: dec!(100),
            quantity,
            discount: Some("10%".to_string()),
        }],
    }
}

#[tokio::test]
async fn pre_order_item_subtotal_applies_percentage_discount() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-1").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-1", product))
        .await
        .unwrap();

    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    // (100 − 10%) × 10
    assert_eq!(view.items[0].item.subtotal, dec!(900));
    assert_eq!(view.pre_order.grand_total, dec!(900));
    assert_eq!(view.received_amount, dec!(0));
    assert_eq!(view.items[0].received_quantity, 0);
}

#[tokio::test]
async fn receiving_moves_stock_and_computes_amounts() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-2").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-2", product))
        .await
        .unwrap();
    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    let item_id = view.items[0].item.id;

    app.services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-1", item_id, 10))
        .await
        .unwrap();

    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    assert_eq!(view.received_amount, dec!(900));
    assert_eq!(view.items[0].received_quantity, 10);

    let stock = inventory::stock_quantity(app.db.as_ref(), STORE, product)
        .await
        .unwrap();
    assert_eq!(stock, 10);

    // Receipt lines count into the derived product quantity.
    let quantity = inventory::product_quantity(app.db.as_ref(), product)
        .await
        .unwrap();
    assert_eq!(quantity, 10);
}

#[tokio::test]
async fn partial_receipts_accumulate() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-3").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-3", product))
        .await
        .unwrap();
    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    let item_id = view.items[0].item.id;

    app.services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-3a", item_id, 4))
        .await
        .unwrap();
    app.services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-3b", item_id, 6))
        .await
        .unwrap();

    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    assert_eq!(view.items[0].received_quantity, 10);
    // 4×90 + 6×90
    assert_eq!(view.received_amount, dec!(900));

    let stock = inventory::stock_quantity(app.db.as_ref(), STORE, product)
        .await
        .unwrap();
    assert_eq!(stock, 10);

    let receipts = app.services.receiving.list_receipts(&actor, pre_order_id).await.unwrap();
    assert_eq!(receipts.len(), 2);
}

#[tokio::test]
async fn duplicate_receipt_reference_rejected_per_supplier() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-4").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-4", product))
        .await
        .unwrap();
    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    let item_id = view.items[0].item.id;

    app.services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-4", item_id, 4))
        .await
        .unwrap();
    let err = app
        .services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-4", item_id, 6))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::DuplicateReference(_));

    // The rejected receipt moved nothing.
    let stock = inventory::stock_quantity(app.db.as_ref(), STORE, product)
        .await
        .unwrap();
    assert_eq!(stock, 4);
}

#[tokio::test]
async fn over_receiving_is_allowed() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-5").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-5", product))
        .await
        .unwrap();
    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    let item_id = view.items[0].item.id;

    // 10 ordered, 15 received; no ceiling enforced.
    app.services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-5", item_id, 15))
        .await
        .unwrap();

    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    assert_eq!(view.items[0].received_quantity, 15);
}

#[tokio::test]
async fn pre_order_with_receipts_cannot_be_deleted() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-6").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-6", product))
        .await
        .unwrap();
    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    let item_id = view.items[0].item.id;

    app.services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-6", item_id, 2))
        .await
        .unwrap();

    let err = app
        .services
        .receiving
        .delete_pre_order(&actor, pre_order_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // Without receipts it deletes cleanly.
    let empty_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-7", product))
        .await
        .unwrap();
    app.services
        .receiving
        .delete_pre_order(&actor, empty_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn receipt_update_replaces_items_and_reconciles_stock() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-7").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-8", product))
        .await
        .unwrap();
    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    let item_id = view.items[0].item.id;

    let receipt_id = app
        .services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-8", item_id, 10))
        .await
        .unwrap();

    app.services
        .receiving
        .update_receipt(&actor, receipt_id, receive_input("GRN-8", item_id, 6))
        .await
        .unwrap();

    let stock = inventory::stock_quantity(app.db.as_ref(), STORE, product)
        .await
        .unwrap();
    assert_eq!(stock, 6);

    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    assert_eq!(view.items[0].received_quantity, 6);
    assert_eq!(view.received_amount, dec!(540));
}

#[tokio::test]
async fn receipt_delete_is_gated_and_reverses_stock() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-8").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-9", product))
        .await
        .unwrap();
    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    let item_id = view.items[0].item.id;

    let receipt_id = app
        .services
        .receiving
        .receive(&actor, pre_order_id, receive_input("GRN-9", item_id, 10))
        .await
        .unwrap();

    let err = app
        .services
        .receiving
        .delete_receipt(&secretary(), receipt_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Permission(_));

    app.services
        .receiving
        .delete_receipt(&actor, receipt_id)
        .await
        .unwrap();

    let stock = inventory::stock_quantity(app.db.as_ref(), STORE, product)
        .await
        .unwrap();
    assert_eq!(stock, 0);

    let view = app.services.receiving.get_pre_order(&actor, pre_order_id).await.unwrap();
    assert_eq!(view.received_amount, dec!(0));
    assert_eq!(view.items[0].received_quantity, 0);
}

#[tokio::test]
async fn pre_order_detail_is_fenced_by_company() {
    let app = TestApp::new().await;
    let product = app.seed_product("R-10").await;
    let actor = user();

    let pre_order_id = app
        .services
        .receiving
        .create_pre_order(&actor, pre_order_input("PO-10", product))
        .await
        .unwrap();

    let outsider = user_of_company(99);
    let err = app
        .services
        .receiving
        .get_pre_order(&outsider, pre_order_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Permission(_));

    let err = app
        .services
        .receiving
        .list_receipts(&outsider, pre_order_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Permission(_));

    // Admins see across companies.
    let view = app
        .services
        .receiving
        .get_pre_order(&admin(), pre_order_id)
        .await
        .unwrap();
    assert_eq!(view.pre_order.reference_no, "PO-10");
}
