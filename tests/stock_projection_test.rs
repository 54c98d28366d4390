mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{user, TestApp};
use tradeledger_api::config::StockPolicy;
use tradeledger_api::errors::ServiceError;
use tradeledger_api::services::inventory;
use tradeledger_api::services::purchases::{
    CreatePurchaseInput, ImageEditMode, LineItemInput, LineItemPatch, UpdatePurchaseInput,
};
use tradeledger_api::services::sales::{CreateSaleInput, UpdateSaleInput};

const STORE: i64 = 1;

fn purchase_input(reference_no: &str, product_id: i64, quantity: i32) -> CreatePurchaseInput {
    CreatePurchaseInput {
        purchased_at: Utc::now(),
        reference_no: reference_no.to_string(),
        store_id: STORE,
        supplier_id: 7,
        credit_days: 30,
        discount: Decimal::ZERO,
        shipping: Decimal::ZERO,
        note: None,
        items: vec![LineItemInput {
            product_id,
            unit_amount: dec!(100),
            quantity,
            expiry_date: None,
        }],
        attachments: vec![],
    }
}

fn sale_input(reference_no: &str, product_id: i64, quantity: i32) -> CreateSaleInput {
    CreateSaleInput {
        sold_at: Utc::now(),
        reference_no: reference_no.to_string(),
        store_id: STORE,
        customer_id: 3,
        biller_id: 1,
        note: None,
        items: vec![LineItemInput {
            product_id,
            unit_amount: dec!(150),
            quantity,
            expiry_date: None,
        }],
        attachments: vec![],
    }
}

async fn stock(app: &TestApp, product_id: i64) -> i32 {
    inventory::stock_quantity(app.db.as_ref(), STORE, product_id)
        .await
        .unwrap()
}

#[tokio::test]
async fn purchases_and_sales_move_the_projection() {
    let app = TestApp::new().await;
    let product = app.seed_product("S-1").await;
    let actor = user();

    app.services
        .purchases
        .create(&actor, purchase_input("PU-1", product, 10))
        .await
        .unwrap();
    assert_eq!(stock(&app, product).await, 10);

    app.services
        .sales
        .create(&actor, sale_input("SA-1", product, 4))
        .await
        .unwrap();
    assert_eq!(stock(&app, product).await, 6);

    // Derived product quantity agrees with the projection.
    let quantity = inventory::product_quantity(app.db.as_ref(), product)
        .await
        .unwrap();
    assert_eq!(quantity, 6);
}

#[tokio::test]
async fn edited_line_adjusts_stock_by_the_quantity_delta() {
    let app = TestApp::new().await;
    let product = app.seed_product("S-2").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(&actor, purchase_input("PU-2", product, 10))
        .await
        .unwrap();

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    let line_id = view.items[0].id;

    app.services
        .purchases
        .update(
            &actor,
            purchase_id,
            UpdatePurchaseInput {
                purchased_at: Utc::now(),
                reference_no: "PU-2".to_string(),
                supplier_id: 7,
                credit_days: 30,
                discount: Decimal::ZERO,
                shipping: Decimal::ZERO,
                note: None,
                items: vec![LineItemPatch {
                    id: Some(line_id),
                    product_id: product,
                    unit_amount: dec!(100),
                    quantity: 7,
                    expiry_date: None,
                }],
                image_mode: ImageEditMode::Keep,
                attachments: vec![],
            },
        )
        .await
        .unwrap();

    assert_eq!(stock(&app, product).await, 7);

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(view.purchase.grand_total, dec!(700));
}

#[tokio::test]
async fn dropped_line_keeps_its_stock_contribution() {
    let app = TestApp::new().await;
    let kept = app.seed_product("S-3a").await;
    let dropped = app.seed_product("S-3b").await;
    let actor = user();

    let mut input = purchase_input("PU-3", kept, 5);
    input.items.push(LineItemInput {
        product_id: dropped,
        unit_amount: dec!(100),
        quantity: 8,
        expiry_date: None,
    });
    let purchase_id = app.services.purchases.create(&actor, input).await.unwrap();
    assert_eq!(stock(&app, dropped).await, 8);

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    let kept_line = view
        .items
        .iter()
        .find(|line| line.product_id == kept)
        .unwrap();

    // Omit the second line: its row goes away, its stock stays.
    app.services
        .purchases
        .update(
            &actor,
            purchase_id,
            UpdatePurchaseInput {
                purchased_at: Utc::now(),
                reference_no: "PU-3".to_string(),
                supplier_id: 7,
                credit_days: 30,
                discount: Decimal::ZERO,
                shipping: Decimal::ZERO,
                note: None,
                items: vec![LineItemPatch {
                    id: Some(kept_line.id),
                    product_id: kept,
                    unit_amount: dec!(100),
                    quantity: 5,
                    expiry_date: None,
                }],
                image_mode: ImageEditMode::Keep,
                attachments: vec![],
            },
        )
        .await
        .unwrap();

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(stock(&app, dropped).await, 8);
    assert_eq!(view.purchase.grand_total, dec!(500));
}

#[tokio::test]
async fn line_reassigned_to_another_product_moves_stock_with_it() {
    let app = TestApp::new().await;
    let first = app.seed_product("S-7a").await;
    let second = app.seed_product("S-7b").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(&actor, purchase_input("PU-7", first, 10))
        .await
        .unwrap();
    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    let line_id = view.items[0].id;

    app.services
        .purchases
        .update(
            &actor,
            purchase_id,
            UpdatePurchaseInput {
                purchased_at: Utc::now(),
                reference_no: "PU-7".to_string(),
                supplier_id: 7,
                credit_days: 30,
                discount: Decimal::ZERO,
                shipping: Decimal::ZERO,
                note: None,
                items: vec![LineItemPatch {
                    id: Some(line_id),
                    product_id: second,
                    unit_amount: dec!(100),
                    quantity: 10,
                    expiry_date: None,
                }],
                image_mode: ImageEditMode::Keep,
                attachments: vec![],
            },
        )
        .await
        .unwrap();

    // Both projections agree with the ledger after the move.
    assert_eq!(stock(&app, first).await, 0);
    assert_eq!(stock(&app, second).await, 10);
    let first_quantity = inventory::product_quantity(app.db.as_ref(), first)
        .await
        .unwrap();
    let second_quantity = inventory::product_quantity(app.db.as_ref(), second)
        .await
        .unwrap();
    assert_eq!(first_quantity, 0);
    assert_eq!(second_quantity, 10);
}

#[tokio::test]
async fn reassigned_sale_line_restores_the_old_product() {
    let app = TestApp::new().await;
    let first = app.seed_product("S-8a").await;
    let second = app.seed_product("S-8b").await;
    let actor = user();

    app.services
        .purchases
        .create(&actor, purchase_input("PU-8a", first, 10))
        .await
        .unwrap();
    app.services
        .purchases
        .create(&actor, purchase_input("PU-8b", second, 10))
        .await
        .unwrap();

    let sale_id = app
        .services
        .sales
        .create(&actor, sale_input("SA-8", first, 4))
        .await
        .unwrap();
    assert_eq!(stock(&app, first).await, 6);

    let view = app.services.sales.get(&actor, sale_id).await.unwrap();
    let line_id = view.items[0].id;

    app.services
        .sales
        .update(
            &actor,
            sale_id,
            UpdateSaleInput {
                sold_at: Utc::now(),
                reference_no: "SA-8".to_string(),
                customer_id: 3,
                biller_id: 1,
                note: None,
                items: vec![LineItemPatch {
                    id: Some(line_id),
                    product_id: second,
                    unit_amount: dec!(150),
                    quantity: 3,
                    expiry_date: None,
                }],
                image_mode: ImageEditMode::Keep,
                attachments: vec![],
            },
        )
        .await
        .unwrap();

    assert_eq!(stock(&app, first).await, 10);
    assert_eq!(stock(&app, second).await, 7);
}

#[tokio::test]
async fn permissive_policy_allows_negative_stock() {
    let app = TestApp::new().await;
    let product = app.seed_product("S-4").await;
    let actor = user();

    app.services
        .sales
        .create(&actor, sale_input("SA-4", product, 3))
        .await
        .unwrap();

    assert_eq!(stock(&app, product).await, -3);
}

#[tokio::test]
async fn strict_policy_rejects_oversell_and_rolls_back() {
    let app = TestApp::with_policy(StockPolicy::Strict).await;
    let product = app.seed_product("S-5").await;
    let actor = user();

    app.services
        .purchases
        .create(&actor, purchase_input("PU-5", product, 2))
        .await
        .unwrap();

    let err = app
        .services
        .sales
        .create(&actor, sale_input("SA-5", product, 5))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // The failed sale left nothing behind.
    assert_eq!(stock(&app, product).await, 2);
    let quantity = inventory::product_quantity(app.db.as_ref(), product)
        .await
        .unwrap();
    assert_eq!(quantity, 2);
}

#[tokio::test]
async fn deleting_a_sale_restores_stock() {
    let app = TestApp::new().await;
    let product = app.seed_product("S-6").await;
    let actor = user();

    app.services
        .purchases
        .create(&actor, purchase_input("PU-6", product, 10))
        .await
        .unwrap();
    let sale_id = app
        .services
        .sales
        .create(&actor, sale_input("SA-6", product, 4))
        .await
        .unwrap();
    assert_eq!(stock(&app, product).await, 6);

    app.services.sales.delete(&actor, sale_id).await.unwrap();
    assert_eq!(stock(&app, product).await, 10);
}
