use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::orders::{
    CreatedServiceOrder, OrderListQuery, OrderStatus, ServiceOrderInput, ServiceOrderResponse,
};
use crate::{AppState, PagedResult};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Page number (default: 1)
    pub page: Option<u64>,
    /// Items per page (default: 10, capped by configuration)
    pub page_size: Option<u64>,
    /// Exact-match area filter; blank is treated as absent
    pub area: Option<String>,
    /// Exact-match technician filter; blank is treated as absent
    pub technician: Option<String>,
    /// Exact-match status filter (open, in_progress, done, canceled)
    pub status: Option<String>,
}

/// Create the service orders router
pub fn orders_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
}

/// List service orders with filtering and pagination
#[utoipa::path(
    get,
    path = "/api/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paged list of service orders", body = PagedResult<ServiceOrderResponse>),
        (status = 400, description = "Invalid filter parameters", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<PagedResult<ServiceOrderResponse>>, ServiceError> {
    let status = match params
        .status
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
    {
        Some(raw) => Some(raw.parse::<OrderStatus>().map_err(|_| {
            ServiceError::ValidationError(format!("unknown order status: {raw}"))
        })?),
        None => None,
    };

    let result = state
        .orders
        .list_orders(OrderListQuery {
            page: params.page,
            page_size: params.page_size,
            area: params.area,
            technician: params.technician,
            status,
        })
        .await?;

    Ok(Json(result))
}

/// Fetch a single service order with its parts
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Service order ID")),
    responses(
        (status = 200, description = "Service order details", body = ServiceOrderResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceOrderResponse>, ServiceError> {
    let order = state.orders.get_order(id).await?;
    Ok(Json(order))
}

/// Create a service order together with its part line items
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = ServiceOrderInput,
    responses(
        (status = 201, description = "Service order created", body = CreatedServiceOrder),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<ServiceOrderInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = state.orders.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedServiceOrder { id })))
}

/// Replace a service order: scalars are overwritten and the part set is
/// rebuilt from the request body
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Service order ID")),
    request_body = ServiceOrderInput,
    responses(
        (status = 204, description = "Service order replaced"),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServiceOrderInput>,
) -> Result<StatusCode, ServiceError> {
    state.orders.update_order(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a service order and all of its parts
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Service order ID")),
    responses(
        (status = 204, description = "Service order deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
