use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// One physical stock unit (serialized) or bulk quantity bucket.
///
/// Business invariant: a row with a serial number always carries
/// `quantity == minimum_quantity == 1`. Bulk rows hold the running quantity
/// for an (item, location) bucket.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_id: i32,
    pub serial_number: Option<String>,
    /// Kanban classification, see [`Kanban`]. Defaults to `NOT`.
    pub kanban: String,
    pub location_id: Option<i32>,
    pub quantity: i32,
    pub minimum_quantity: Option<i32>,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_serialized(&self) -> bool {
        self.serial_number.is_some()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    utoipa::ToSchema,
)]
pub enum Kanban {
    #[serde(rename = "ENGINE")]
    #[strum(serialize = "ENGINE")]
    Engine,
    #[serde(rename = "CELL")]
    #[strum(serialize = "CELL")]
    Cell,
    #[serde(rename = "NOT")]
    #[strum(serialize = "NOT")]
    Not,
}

impl Default for Kanban {
    fn default() -> Self {
        Kanban::Not
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    #[sea_orm(has_many = "super::outflow::Entity")]
    Outflow,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::outflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Outflow.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
