mod common;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{user, TestApp};
use tradeledger_api::services::purchases::{
    CreatePurchaseInput, ImageEditMode, LineItemInput, LineItemPatch, PurchaseView,
    UpdatePurchaseInput,
};
use tradeledger_api::services::AttachmentUpload;

fn attachment(filename: &str) -> AttachmentUpload {
    AttachmentUpload {
        filename: filename.to_string(),
        bytes: filename.as_bytes().to_vec(),
    }
}

fn purchase_input(
    reference_no: &str,
    product_id: i64,
    attachments: Vec<AttachmentUpload>,
) -> CreatePurchaseInput {
    CreatePurchaseInput {
        purchased_at: Utc::now(),
        reference_no: reference_no.to_string(),
        store_id: 1,
        supplier_id: 7,
        credit_days: 30,
        discount: Decimal::ZERO,
        shipping: Decimal::ZERO,
        note: None,
        items: vec![LineItemInput {
            product_id,
            unit_amount: dec!(100),
            quantity: 10,
            expiry_date: None,
        }],
        attachments,
    }
}

fn update_input(
    reference_no: &str,
    view: &PurchaseView,
    image_mode: ImageEditMode,
    attachments: Vec<AttachmentUpload>,
) -> UpdatePurchaseInput {
    let line = &view.items[0];
    UpdatePurchaseInput {
        purchased_at: Utc::now(),
        reference_no: reference_no.to_string(),
        supplier_id: 7,
        credit_days: 30,
        discount: Decimal::ZERO,
        shipping: Decimal::ZERO,
        note: None,
        items: vec![LineItemPatch {
            id: Some(line.id),
            product_id: line.product_id,
            unit_amount: line.unit_amount,
            quantity: line.quantity,
            expiry_date: None,
        }],
        image_mode,
        attachments,
    }
}

#[tokio::test]
async fn create_stores_attachments_and_lists_them() {
    let app = TestApp::new().await;
    let product = app.seed_product("A-1").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(
            &actor,
            purchase_input(
                "PU-A1",
                product,
                vec![attachment("invoice.pdf"), attachment("photo.png")],
            ),
        )
        .await
        .unwrap();

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(view.images.len(), 2);
    assert_eq!(app.storage.len(), 2);
    for key in &view.images {
        assert!(app.storage.contains(key));
    }
}

#[tokio::test]
async fn keep_mode_leaves_attachments_untouched() {
    let app = TestApp::new().await;
    let product = app.seed_product("A-2").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(
            &actor,
            purchase_input("PU-A2", product, vec![attachment("invoice.pdf")]),
        )
        .await
        .unwrap();
    let before = app.services.purchases.get(&actor, purchase_id).await.unwrap();

    app.services
        .purchases
        .update(
            &actor,
            purchase_id,
            update_input("PU-A2", &before, ImageEditMode::Keep, vec![]),
        )
        .await
        .unwrap();

    let after = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(after.images, before.images);
    assert_eq!(app.storage.len(), 1);
}

#[tokio::test]
async fn replace_all_swaps_every_attachment() {
    let app = TestApp::new().await;
    let product = app.seed_product("A-3").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(
            &actor,
            purchase_input(
                "PU-A3",
                product,
                vec![attachment("old-1.pdf"), attachment("old-2.pdf")],
            ),
        )
        .await
        .unwrap();
    let before = app.services.purchases.get(&actor, purchase_id).await.unwrap();

    app.services
        .purchases
        .update(
            &actor,
            purchase_id,
            update_input(
                "PU-A3",
                &before,
                ImageEditMode::ReplaceAll,
                vec![attachment("new.pdf")],
            ),
        )
        .await
        .unwrap();

    let after = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(after.images.len(), 1);
    assert!(app.storage.contains(&after.images[0]));

    // The replaced objects are gone from storage after commit.
    assert_eq!(app.storage.len(), 1);
    for old in &before.images {
        assert!(!app.storage.contains(old));
    }
}

#[tokio::test]
async fn retain_keeps_only_the_named_attachments() {
    let app = TestApp::new().await;
    let product = app.seed_product("A-4").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(
            &actor,
            purchase_input(
                "PU-A4",
                product,
                vec![attachment("keep-me.pdf"), attachment("drop-me.pdf")],
            ),
        )
        .await
        .unwrap();
    let before = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    let kept = before.images[0].clone();
    let dropped = before.images[1].clone();

    app.services
        .purchases
        .update(
            &actor,
            purchase_id,
            update_input(
                "PU-A4",
                &before,
                ImageEditMode::Retain(vec![kept.clone()]),
                vec![attachment("extra.pdf")],
            ),
        )
        .await
        .unwrap();

    let after = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(after.images.len(), 2);
    assert!(after.images.contains(&kept));
    assert!(!after.images.contains(&dropped));

    assert_eq!(app.storage.len(), 2);
    assert!(app.storage.contains(&kept));
    assert!(!app.storage.contains(&dropped));
}
