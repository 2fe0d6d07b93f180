use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AppConfig,
    db::DbPool,
    entities::service_order::{
        self, ActiveModel as ServiceOrderActiveModel, Entity as ServiceOrderEntity,
        Model as ServiceOrderModel,
    },
    entities::service_part::{
        self, ActiveModel as ServicePartActiveModel, Entity as ServicePartEntity,
        Model as ServicePartModel,
    },
    errors::ServiceError,
    PagedResult,
};

/// Order lifecycle status. Any value is accepted at create and update; no
/// transition rules are enforced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Open,
    InProgress,
    Done,
    Canceled,
}

/// Request/Response types for the service order service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServicePartInput {
    #[validate(length(
        min = 1,
        max = 120,
        message = "partName must be between 1 and 120 characters"
    ))]
    pub part_name: String,

    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,

    pub unit_price: Decimal,
}

impl ServicePartInput {
    /// Unit prices are stored with two decimal places.
    fn normalized(&self) -> ServicePartInput {
        ServicePartInput {
            part_name: self.part_name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price.round_dp(2),
        }
    }
}

/// Body accepted by both create and full-replace update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceOrderInput {
    #[validate(length(
        min = 1,
        max = 120,
        message = "serviceName must be between 1 and 120 characters"
    ))]
    pub service_name: String,

    #[validate(length(min = 1, max = 80, message = "area must be between 1 and 80 characters"))]
    pub area: String,

    #[validate(length(
        min = 1,
        max = 120,
        message = "technicianName must be between 1 and 120 characters"
    ))]
    pub technician_name: String,

    pub status: OrderStatus,

    #[serde(default)]
    pub parts: Vec<ServicePartInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePartResponse {
    pub id: Uuid,
    pub part_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrderResponse {
    pub id: Uuid,
    pub service_name: String,
    pub area: String,
    pub technician_name: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub total_cost: Decimal,
    pub parts: Vec<ServicePartResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedServiceOrder {
    pub id: Uuid,
}

/// Filters and pagination for the order listing.
#[derive(Debug, Default, Clone)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub area: Option<String>,
    pub technician: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Pagination bounds sourced from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl From<&AppConfig> for PageLimits {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            default_page_size: cfg.api_default_page_size,
            max_page_size: cfg.api_max_page_size,
        }
    }
}

/// Derived order total: sum of quantity × unit price over the given parts.
/// Invoked by every mutating lifecycle operation immediately before the
/// write; an empty part set sums to zero.
pub fn order_total(parts: &[ServicePartInput]) -> Decimal {
    parts
        .iter()
        .map(|part| Decimal::from(part.quantity) * part.unit_price)
        .sum()
}

/// Blank or whitespace-only text filters are treated as absent.
fn text_filter(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn project_order(
    order: ServiceOrderModel,
    parts: Vec<ServicePartModel>,
) -> Result<ServiceOrderResponse, ServiceError> {
    let status = OrderStatus::from_str(&order.status).map_err(|_| {
        ServiceError::InternalError(format!(
            "unrecognized order status in store: {}",
            order.status
        ))
    })?;

    Ok(ServiceOrderResponse {
        id: order.id,
        service_name: order.service_name,
        area: order.area,
        technician_name: order.technician_name,
        status,
        created_at: order.created_at,
        total_cost: order.total_cost,
        parts: parts
            .into_iter()
            .map(|part| ServicePartResponse {
                line_total: part.line_total(),
                id: part.id,
                part_name: part.part_name,
                quantity: part.quantity,
                unit_price: part.unit_price,
            })
            .collect(),
    })
}

/// Service for managing service orders and their part line items.
#[derive(Clone)]
pub struct ServiceOrderService {
    db: Arc<DbPool>,
    limits: PageLimits,
}

impl ServiceOrderService {
    pub fn new(db: Arc<DbPool>, limits: PageLimits) -> Self {
        Self { db, limits }
    }

    /// Rejects invalid input before any persistence and returns the part set
    /// with unit prices normalized to two decimal places.
    fn validated_parts(input: &ServiceOrderInput) -> Result<Vec<ServicePartInput>, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for part in &input.parts {
            part.validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }
        Ok(input
            .parts
            .iter()
            .map(ServicePartInput::normalized)
            .collect())
    }

    /// Creates a service order together with its initial part set.
    #[instrument(skip(self, input), fields(service_name = %input.service_name))]
    pub async fn create_order(&self, input: ServiceOrderInput) -> Result<Uuid, ServiceError> {
        let parts = Self::validated_parts(&input)?;
        let total = order_total(&parts);

        let db = &*self.db;
        let order_id = Uuid::new_v4();
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        ServiceOrderActiveModel {
            id: Set(order_id),
            service_name: Set(input.service_name),
            area: Set(input.area),
            technician_name: Set(input.technician_name),
            status: Set(input.status.to_string()),
            created_at: Set(now),
            total_cost: Set(total),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to create service order");
            ServiceError::DatabaseError(e)
        })?;

        for part in &parts {
            ServicePartActiveModel {
                id: Set(Uuid::new_v4()),
                part_name: Set(part.part_name.clone()),
                quantity: Set(part.quantity),
                unit_price: Set(part.unit_price),
                service_order_id: Set(order_id),
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to insert service part");
                ServiceError::DatabaseError(e)
            })?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, total_cost = %total, "Service order created");
        Ok(order_id)
    }

    /// Retrieves a service order with its parts.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<ServiceOrderResponse, ServiceError> {
        let db = &*self.db;

        let order = ServiceOrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to fetch service order");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Service order {order_id} not found")))?;

        let parts = ServicePartEntity::find()
            .filter(service_part::Column::ServiceOrderId.eq(order_id))
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to fetch service parts");
                ServiceError::DatabaseError(e)
            })?;

        project_order(order, parts)
    }

    /// Lists service orders, newest first, with optional exact-match filters.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        query: OrderListQuery,
    ) -> Result<PagedResult<ServiceOrderResponse>, ServiceError> {
        let db = &*self.db;
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query
            .page_size
            .unwrap_or(self.limits.default_page_size)
            .clamp(1, self.limits.max_page_size);

        let mut find = ServiceOrderEntity::find();
        if let Some(area) = text_filter(query.area.as_deref()) {
            find = find.filter(service_order::Column::Area.eq(area));
        }
        if let Some(technician) = text_filter(query.technician.as_deref()) {
            find = find.filter(service_order::Column::TechnicianName.eq(technician));
        }
        if let Some(status) = query.status {
            find = find.filter(service_order::Column::Status.eq(status.to_string()));
        }

        let paginator = find
            .order_by_desc(service_order::Column::CreatedAt)
            .paginate(db, page_size);

        let total_count = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count service orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(error = %e, page, page_size, "Failed to fetch service orders page");
            ServiceError::DatabaseError(e)
        })?;

        let order_ids: Vec<Uuid> = orders.iter().map(|order| order.id).collect();
        let mut parts_by_order: HashMap<Uuid, Vec<ServicePartModel>> = HashMap::new();
        if !order_ids.is_empty() {
            let parts = ServicePartEntity::find()
                .filter(service_part::Column::ServiceOrderId.is_in(order_ids))
                .all(db)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch parts for listed orders");
                    ServiceError::DatabaseError(e)
                })?;
            for part in parts {
                parts_by_order
                    .entry(part.service_order_id)
                    .or_default()
                    .push(part);
            }
        }

        let items = orders
            .into_iter()
            .map(|order| {
                let parts = parts_by_order.remove(&order.id).unwrap_or_default();
                project_order(order, parts)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            total = total_count,
            page,
            page_size,
            returned_count = items.len(),
            "Service orders listed"
        );

        Ok(PagedResult {
            items,
            page,
            page_size,
            total_count,
        })
    }

    /// Replaces a service order: scalar fields are overwritten and the part
    /// set is fully rebuilt from the input. No merge of existing rows.
    #[instrument(skip(self, input), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        input: ServiceOrderInput,
    ) -> Result<(), ServiceError> {
        let parts = Self::validated_parts(&input)?;
        let total = order_total(&parts);
        let db = &*self.db;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to start transaction for order update");
            ServiceError::DatabaseError(e)
        })?;

        let order = ServiceOrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to find service order for update");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Service order not found for update");
                ServiceError::NotFound(format!("Service order {order_id} not found"))
            })?;

        // created_at is immutable; only the mutable scalars are overwritten.
        let mut active: ServiceOrderActiveModel = order.into();
        active.service_name = Set(input.service_name);
        active.area = Set(input.area);
        active.technician_name = Set(input.technician_name);
        active.status = Set(input.status.to_string());
        active.total_cost = Set(total);
        active.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to update service order");
            ServiceError::DatabaseError(e)
        })?;

        ServicePartEntity::delete_many()
            .filter(service_part::Column::ServiceOrderId.eq(order_id))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to delete existing service parts");
                ServiceError::DatabaseError(e)
            })?;

        for part in &parts {
            ServicePartActiveModel {
                id: Set(Uuid::new_v4()),
                part_name: Set(part.part_name.clone()),
                quantity: Set(part.quantity),
                unit_price: Set(part.unit_price),
                service_order_id: Set(order_id),
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to insert replacement service part");
                ServiceError::DatabaseError(e)
            })?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order update");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            order_id = %order_id,
            total_cost = %total,
            part_count = parts.len(),
            "Service order replaced"
        );
        Ok(())
    }

    /// Deletes a service order and its parts.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to start transaction for order delete");
            ServiceError::DatabaseError(e)
        })?;

        let order = ServiceOrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to find service order for delete");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Service order not found for delete");
                ServiceError::NotFound(format!("Service order {order_id} not found"))
            })?;

        // Children first, then the parent; the schema-level cascade is a
        // backstop, not the mechanism.
        ServicePartEntity::delete_many()
            .filter(service_part::Column::ServiceOrderId.eq(order_id))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to delete service parts");
                ServiceError::DatabaseError(e)
            })?;

        ServiceOrderEntity::delete_by_id(order.id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to delete service order");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order delete");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, "Service order deleted");
        Ok(())
    }
}
