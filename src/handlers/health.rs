use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// Health probe with process status and environment label. Deliberately
/// excluded from the published API documentation.
pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(_) => "reachable",
        Err(_) => "unreachable",
    };

    Json(json!({
        "status": "ok",
        "env": state.config.environment,
        "database": database,
    }))
}
