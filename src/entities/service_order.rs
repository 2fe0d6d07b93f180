use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_name: String,
    pub area: String,
    pub technician_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// Derived from the part rows; recomputed before every persisting write.
    pub total_cost: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_part::Entity")]
    ServicePart,
}

impl Related<super::service_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServicePart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
