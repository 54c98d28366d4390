pub mod common;
pub mod payments;
pub mod pre_orders;
pub mod preturns;
pub mod products;
pub mod purchases;
pub mod sales;

use std::sync::Arc;

use crate::services::{
    notifications::NotificationSink, payments::PaymentService, preturns::PreturnService,
    products::ProductService, purchases::PurchaseService, receiving::ReceivingService,
    sales::SaleService, ServiceContext,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub purchases: Arc<PurchaseService>,
    pub sales: Arc<SaleService>,
    pub payments: Arc<PaymentService>,
    pub preturns: Arc<PreturnService>,
    pub receiving: Arc<ReceivingService>,
    pub products: Arc<ProductService>,
}

impl AppServices {
    pub fn new(ctx: ServiceContext) -> Self {
        let notifications = NotificationSink::new(ctx.db.clone());
        Self {
            purchases: Arc::new(PurchaseService::new(ctx.clone(), notifications.clone())),
            sales: Arc::new(SaleService::new(ctx.clone(), notifications)),
            payments: Arc::new(PaymentService::new(ctx.clone())),
            preturns: Arc::new(PreturnService::new(ctx.clone())),
            receiving: Arc::new(ReceivingService::new(ctx.clone())),
            products: Arc::new(ProductService::new(ctx)),
        }
    }
}
