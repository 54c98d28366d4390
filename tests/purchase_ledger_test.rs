mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

use common::{admin, secretary, user, user_of_company, TestApp};
use tradeledger_api::entities::payment::PayableKind;
use tradeledger_api::entities::{notification, order_line, payment, preturn, DocumentStatus};
use tradeledger_api::errors::ServiceError;
use tradeledger_api::services::payments::RecordPaymentInput;
use tradeledger_api::services::preturns::CreatePreturnInput;
use tradeledger_api::services::purchases::{CreatePurchaseInput, LineItemInput, PurchaseFilter};

fn purchase_input(reference_no: &str, supplier_id: i64, product_id: i64) -> CreatePurchaseInput {
    CreatePurchaseInput {
        purchased_at: Utc::now(),
        reference_no: reference_no.to_string(),
        store_id: 1,
        supplier_id,
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
        attachments: vec![],
    }
}

fn payment_input(reference_no: &str, purchase_id: i64, amount: Decimal) -> RecordPaymentInput {
    RecordPaymentInput {
        paid_at: Utc::now(),
        reference_no: reference_no.to_string(),
        payable_kind: PayableKind::Purchase,
        payable_id: purchase_id,
        amount,
        note: None,
        attachments: vec![],
    }
}

fn preturn_input(reference_no: &str, purchase_id: i64, amount: Decimal) -> CreatePreturnInput {
    CreatePreturnInput {
        returned_at: Utc::now(),
        reference_no: reference_no.to_string(),
        purchase_id,
        amount,
        note: None,
        attachment: None,
    }
}

#[tokio::test]
async fn detail_and_list_report_identical_derived_amounts() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-1").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(&actor, purchase_input("PU-1", 7, product))
        .await
        .unwrap();

    app.services
        .payments
        .record(&actor, payment_input("PAY-1", purchase_id, dec!(300)))
        .await
        .unwrap();
    app.services
        .preturns
        .create(&actor, preturn_input("RET-1", purchase_id, dec!(100)))
        .await
        .unwrap();

    let detail = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    let (listed, total) = app
        .services
        .purchases
        .list(&actor, PurchaseFilter::default())
        .await
        .unwrap();

    assert_eq!(total, 1);
    let from_list = &listed[0];
    assert_eq!(detail.paid_amount, dec!(300));
    assert_eq!(detail.returned_amount, dec!(100));
    assert_eq!(detail.total_amount, dec!(900));
    assert_eq!(detail.balance, dec!(600));
    assert_eq!(from_list.paid_amount, detail.paid_amount);
    assert_eq!(from_list.returned_amount, detail.returned_amount);
    assert_eq!(from_list.total_amount, detail.total_amount);
    assert_eq!(from_list.balance, detail.balance);
}

#[tokio::test]
async fn pending_payments_and_returns_do_not_count() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-2").await;
    let actor = user();
    let sec = secretary();

    let purchase_id = app
        .services
        .purchases
        .create(&actor, purchase_input("PU-2", 7, product))
        .await
        .unwrap();

    // Secretary-created rows start pending and are excluded from the
    // derived amounts until approved.
    let payment_id = app
        .services
        .payments
        .record(&sec, payment_input("PAY-2", purchase_id, dec!(400)))
        .await
        .unwrap();
    let preturn_id = app
        .services
        .preturns
        .create(&sec, preturn_input("RET-2", purchase_id, dec!(50)))
        .await
        .unwrap();

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(view.paid_amount, Decimal::ZERO);
    assert_eq!(view.returned_amount, Decimal::ZERO);
    assert_eq!(view.total_amount, dec!(1000));

    app.services.payments.approve(&actor, payment_id).await.unwrap();
    app.services.preturns.approve(&actor, preturn_id).await.unwrap();

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(view.paid_amount, dec!(400));
    assert_eq!(view.returned_amount, dec!(50));
    assert_eq!(view.total_amount, dec!(950));
    assert_eq!(view.balance, dec!(550));
}

#[tokio::test]
async fn duplicate_reference_rejected_without_partial_rows() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-3").await;
    let actor = user();

    app.services
        .purchases
        .create(&actor, purchase_input("PU-3", 7, product))
        .await
        .unwrap();

    let err = app
        .services
        .purchases
        .create(&actor, purchase_input("PU-3", 7, product))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::DuplicateReference(_));

    // Same reference for a different supplier is fine.
    app.services
        .purchases
        .create(&actor, purchase_input("PU-3", 8, product))
        .await
        .unwrap();

    let lines = order_line::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(lines.len(), 2, "rejected attempt must not leave lines");
}

#[tokio::test]
async fn secretary_creates_pending_and_cannot_approve() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-4").await;
    let sec = secretary();

    let purchase_id = app
        .services
        .purchases
        .create(&sec, purchase_input("PU-4", 7, product))
        .await
        .unwrap();

    let view = app.services.purchases.get(&sec, purchase_id).await.unwrap();
    assert_eq!(view.purchase.status, DocumentStatus::Pending);

    let err = app
        .services
        .purchases
        .approve(&sec, purchase_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Permission(_));

    app.services
        .purchases
        .approve(&user(), purchase_id)
        .await
        .unwrap();
    let view = app.services.purchases.get(&sec, purchase_id).await.unwrap();
    assert_eq!(view.purchase.status, DocumentStatus::Approved);

    let notifications = notification::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].kind,
        tradeledger_api::entities::notification::NotificationKind::PurchaseApproved
    );
}

#[tokio::test]
async fn secretary_may_delete_only_pending_documents() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-5").await;
    let actor = user();
    let sec = secretary();

    // Approved purchase: secretary blocked, admin allowed, cascade
    // removes payments and returns.
    let approved_id = app
        .services
        .purchases
        .create(&actor, purchase_input("PU-5", 7, product))
        .await
        .unwrap();
    app.services
        .payments
        .record(&actor, payment_input("PAY-5", approved_id, dec!(100)))
        .await
        .unwrap();
    app.services
        .preturns
        .create(&actor, preturn_input("RET-5", approved_id, dec!(10)))
        .await
        .unwrap();

    let err = app
        .services
        .purchases
        .delete(&sec, approved_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Permission(_));

    app.services.purchases.delete(&admin(), approved_id).await.unwrap();

    assert!(payment::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap()
        .is_empty());
    assert!(preturn::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap()
        .is_empty());
    assert!(order_line::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap()
        .is_empty());

    // Pending purchase: secretary may delete.
    let pending_id = app
        .services
        .purchases
        .create(&sec, purchase_input("PU-6", 7, product))
        .await
        .unwrap();
    app.services.purchases.delete(&sec, pending_id).await.unwrap();
}

#[tokio::test]
async fn admin_deleting_pending_purchase_emits_rejection() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-6").await;
    let sec = secretary();

    let pending_id = app
        .services
        .purchases
        .create(&sec, purchase_input("PU-7", 7, product))
        .await
        .unwrap();
    app.services.purchases.delete(&admin(), pending_id).await.unwrap();

    let notifications = notification::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(
        notifications[0].kind,
        tradeledger_api::entities::notification::NotificationKind::PurchaseRejected
    );
    assert_eq!(notifications[0].reference_no, "PU-7");
}

#[tokio::test]
async fn cross_company_access_requires_admin() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-7").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(&actor, purchase_input("PU-8", 7, product))
        .await
        .unwrap();

    let outsider = user_of_company(99);
    let err = app
        .services
        .purchases
        .get(&outsider, purchase_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Permission(_));

    let (views, _) = app
        .services
        .purchases
        .list(&outsider, PurchaseFilter::default())
        .await
        .unwrap();
    assert!(views.is_empty());

    // Payment and return histories hang off the purchase, so they are
    // fenced the same way.
    let err = app
        .services
        .payments
        .list_for(&outsider, PayableKind::Purchase, purchase_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Permission(_));
    let err = app
        .services
        .preturns
        .list_for_purchase(&outsider, purchase_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Permission(_));

    // Admins see across companies.
    let view = app.services.purchases.get(&admin(), purchase_id).await.unwrap();
    assert_eq!(view.purchase.reference_no, "PU-8");
}

#[tokio::test]
async fn over_return_is_permitted_and_drives_total_negative() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-8").await;
    let actor = user();

    let purchase_id = app
        .services
        .purchases
        .create(&actor, purchase_input("PU-9", 7, product))
        .await
        .unwrap();

    // No ceiling check against the outstanding amount.
    app.services
        .preturns
        .create(&actor, preturn_input("RET-9", purchase_id, dec!(1500)))
        .await
        .unwrap();

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    assert_eq!(view.returned_amount, dec!(1500));
    assert_eq!(view.total_amount, dec!(-500));
}

#[tokio::test]
async fn purchase_due_date_follows_credit_days() {
    let app = TestApp::new().await;
    let product = app.seed_product("P-9").await;
    let actor = user();

    let mut input = purchase_input("PU-10", 7, product);
    input.credit_days = 15;
    let purchase_id = app.services.purchases.create(&actor, input).await.unwrap();

    let view = app.services.purchases.get(&actor, purchase_id).await.unwrap();
    let purchased_at = view.purchase.purchased_at;
    let due = view.purchase.payment_due_at.expect("due date set");
    assert_eq!((due - purchased_at).num_days(), 15);
    assert_eq!(view.purchase.credit_days, Some(15));
}
