//! Service Orders API Library
//!
//! REST backend for field service orders and their part line items.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod observability;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{response::Redirect, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub orders: services::orders::ServiceOrderService,
}

/// Envelope for paginated list responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
}

/// Builds the application router: orders API, health probe, root redirect
/// and (when enabled) the interactive documentation.
pub fn app_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(root_redirect))
        .route("/healthz", get(handlers::health::healthz))
        .nest("/api/orders", handlers::orders::orders_router());

    if state.config.docs_enabled() {
        app = app.merge(openapi::swagger_ui());
    }

    app.layer(observability::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            observability::request_id_middleware,
        ))
        .with_state(state)
}

async fn root_redirect() -> Redirect {
    Redirect::to("/swagger")
}
