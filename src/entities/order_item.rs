use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Line item of a maintenance order. References exactly one of
/// `inventory_id` (stock requisition) or `item_id` (catalog requisition);
/// the rule is enforced at request-validation time, not by the schema.
/// Order items carry attendance metadata only and never mutate stock.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: i32,
    pub inventory_id: Option<i32>,
    pub item_id: Option<i32>,
    pub aircraft_id: Option<i32>,
    pub aircraft_destination_id: Option<i32>,
    /// Requisition number assigned by the operator.
    pub operator: Option<String>,
    pub service_type: Option<String>,
    pub quantity: i32,
    pub quantity_supplied: Option<i32>,
    pub dpe: Option<String>,
    pub eglog: Option<String>,
    /// Whether the part travels with a log card.
    pub log: bool,
    pub sn_attended: Option<String>,
    pub expiration_date_attended: Option<Date>,
    pub nf_answer: Option<String>,
    pub attended_date: Option<Date>,
    pub collected: bool,
    pub gmm: Option<String>,
    pub bms: Option<String>,
    pub hb_destination: Option<String>,
    pub contract_old: bool,
    pub reason: Option<String>,
    pub troubleshooting: Option<String>,
    pub failure_description: Option<String>,
    pub observation: Option<String>,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub tsn_item: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub tso_item: Option<Decimal>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    utoipa::ToSchema,
)]
pub enum ServiceType {
    #[serde(rename = "RUSH")]
    #[strum(serialize = "RUSH")]
    Rush,
    #[serde(rename = "PROG")]
    #[strum(serialize = "PROG")]
    Prog,
    /// Aircraft on ground, highest urgency.
    #[serde(rename = "AOG")]
    #[strum(serialize = "AOG")]
    Aog,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::maintenance_order::Entity",
        from = "Column::OrderId",
        to = "super::maintenance_order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::inventory::Entity",
        from = "Column::InventoryId",
        to = "super::inventory::Column::Id"
    )]
    Inventory,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::aircraft::Entity",
        from = "Column::AircraftId",
        to = "super::aircraft::Column::Id"
    )]
    Aircraft,
    #[sea_orm(
        belongs_to = "super::aircraft::Entity",
        from = "Column::AircraftDestinationId",
        to = "super::aircraft::Column::Id"
    )]
    AircraftDestination,
}

impl Related<super::maintenance_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
