use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use service_orders_api::{
    app_router,
    config::AppConfig,
    db,
    entities::service_order,
    services::orders::ServiceOrderService,
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness spinning up the application router backed by the
/// ephemeral in-memory store.
pub struct TestApp {
    router: Router,
    pub db: Arc<DatabaseConnection>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::default();
        cfg.environment = "test".to_string();

        let pool = db::connect_ephemeral()
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);
        let orders = ServiceOrderService::new(db.clone(), (&cfg).into());
        let state = AppState {
            db: db.clone(),
            config: cfg,
            orders,
        };

        Self {
            router: app_router(state),
            db,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).expect("encode body")))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request should complete")
    }

    /// Insert an order row directly, with a controlled creation timestamp.
    pub async fn seed_order(
        &self,
        service_name: &str,
        area: &str,
        technician: &str,
        status: &str,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        service_order::ActiveModel {
            id: Set(id),
            service_name: Set(service_name.to_string()),
            area: Set(area.to_string()),
            technician_name: Set(technician.to_string()),
            status: Set(status.to_string()),
            created_at: Set(created_at),
            total_cost: Set(Decimal::ZERO),
        }
        .insert(&*self.db)
        .await
        .expect("seed order");
        id
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

/// Decimals are serialized as strings; compare them as decimals so scale
/// differences ("0" vs "0.00") don't matter.
pub fn decimal_field(value: &Value, key: &str) -> Decimal {
    value[key]
        .as_str()
        .map(|raw| raw.parse().expect("parse decimal field"))
        .unwrap_or_else(|| panic!("field {key} should be a decimal string, got {:?}", value[key]))
}
