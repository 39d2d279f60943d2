use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// A maintenance requisition. Keyed for humans by the
/// (`order_number`, `order_year`) pair; numbers restart at 1 each year.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_number: i32,
    pub order_year: i32,
    pub order_date: Option<Date>,
    pub requester: Option<String>,
    pub order_type: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    utoipa::ToSchema,
)]
pub enum Requester {
    #[serde(rename = "1BAVEX")]
    #[strum(serialize = "1BAVEX")]
    Bavex,
    #[serde(rename = "BMS")]
    #[strum(serialize = "BMS")]
    Bms,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    utoipa::ToSchema,
)]
pub enum OrderType {
    #[serde(rename = "RMS")]
    #[strum(serialize = "RMS")]
    Rms,
    #[serde(rename = "FSM")]
    #[strum(serialize = "FSM")]
    Fsm,
    #[serde(rename = "REQ")]
    #[strum(serialize = "REQ")]
    Req,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    utoipa::ToSchema,
)]
pub enum OrderStatus {
    /// Not yet sent to the supplier.
    #[serde(rename = "NOT")]
    #[strum(serialize = "NOT")]
    NotSent,
    /// Open, nothing supplied yet.
    #[serde(rename = "OPEN")]
    #[strum(serialize = "OPEN")]
    Open,
    /// Open, partially supplied.
    #[serde(rename = "OPEN2")]
    #[strum(serialize = "OPEN2")]
    OpenPartial,
    /// Finished, fully supplied.
    #[serde(rename = "CLOSE")]
    #[strum(serialize = "CLOSE")]
    Closed,
    /// Finished without supply.
    #[serde(rename = "CLOSE2")]
    #[strum(serialize = "CLOSE2")]
    ClosedUnattended,
    #[serde(rename = "CANCEL")]
    #[strum(serialize = "CANCEL")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
