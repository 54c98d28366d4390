//! Shared test harness: in-memory SQLite with migrations applied and
//! the full service container wired against an in-memory object store.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};

use tradeledger_api::auth::{AuthenticatedUser, Role};
use tradeledger_api::config::StockPolicy;
use tradeledger_api::db::{run_migrations, DbPool};
use tradeledger_api::handlers::AppServices;
use tradeledger_api::services::products::CreateProductInput;
use tradeledger_api::services::ServiceContext;
use tradeledger_api::storage::{InMemoryObjectStore, SharedObjectStore};

pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub storage: Arc<InMemoryObjectStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(StockPolicy::Permissive).await
    }

    pub async fn with_policy(policy: StockPolicy) -> Self {
        // A single connection keeps every query on the same in-memory
        // database.
        let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .sqlx_logging(false);
        let db = Arc::new(
            Database::connect(opt)
                .await
                .expect("failed to open in-memory database"),
        );
        run_migrations(db.as_ref())
            .await
            .expect("migrations failed");

        let storage = Arc::new(InMemoryObjectStore::new());
        let shared: SharedObjectStore = storage.clone();
        let services = AppServices::new(ServiceContext {
            db: db.clone(),
            storage: shared,
            stock_policy: policy,
        });

        Self {
            db,
            services,
            storage,
        }
    }

    pub async fn seed_product(&self, code: &str) -> i64 {
        self.services
            .products
            .create(CreateProductInput {
                name: format!("Product {code}"),
                code: code.to_string(),
                unit: "pcs".to_string(),
                cost: Decimal::from(100),
                price: Decimal::from(150),
                alert_quantity: 5,
            })
            .await
            .expect("failed to seed product")
    }
}

pub fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        id: 1,
        role: Role::Admin,
        company_id: 1,
        first_store_id: 1,
    }
}

pub fn user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: 2,
        role: Role::User,
        company_id: 1,
        first_store_id: 1,
    }
}

pub fn secretary() -> AuthenticatedUser {
    AuthenticatedUser {
        id: 3,
        role: Role::Secretary,
        company_id: 1,
        first_store_id: 1,
    }
}

pub fn user_of_company(company_id: i64) -> AuthenticatedUser {
    AuthenticatedUser {
        id: 4,
        role: Role::User,
        company_id,
        first_store_id: 1,
    }
}
