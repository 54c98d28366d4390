//! Trading-ledger API library.
//!
//! Core functionality for the tradeledger API: purchase and sale
//! aggregates, payment and return ledgers, the pre-order receiving
//! workflow, and the store stock projection that all of them keep
//! consistent.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;
pub mod storage;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::db::DbPool;
use crate::storage::SharedObjectStore;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub storage: SharedObjectStore,
}

impl AppState {
    /// Wires the full state from a connected pool and configuration.
    pub fn build(db: Arc<DbPool>, config: config::AppConfig, storage: SharedObjectStore) -> Self {
        let ctx = services::ServiceContext {
            db: db.clone(),
            storage: storage.clone(),
            stock_policy: config.stock_policy,
        };
        Self {
            db,
            config,
            services: handlers::AppServices::new(ctx),
            storage,
        }
    }
}

/// Standard response envelope returned by every handler.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Full v1 API surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", handlers::products::routes())
        .nest("/purchases", handlers::purchases::routes())
        .nest("/sales", handlers::sales::routes())
        .nest("/payments", handlers::payments::routes())
        .nest("/preturns", handlers::preturns::routes())
        .nest("/pre-orders", handlers::pre_orders::pre_order_routes())
        .nest("/receipts", handlers::pre_orders::receipt_routes())
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match db::ping(state.db.as_ref()).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "database": database,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Health endpoint, mounted outside the versioned API.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
