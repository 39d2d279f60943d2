use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Catalog entry for a part, keyed by manufacturer part number.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Manufacturer part number, unique across the catalog.
    #[sea_orm(unique)]
    #[validate(length(min = 1, max = 255))]
    pub mpn: String,

    pub pn: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Document kind the part is referenced by (IPC, CMM, ...).
    pub doc: Option<String>,
    /// Technical publication reference within `doc`.
    pub tec_pub: Option<String>,
    pub aircraft_doc: Option<String>,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventory,
    #[sea_orm(has_many = "super::inflow::Entity")]
    Inflow,
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl Related<super::inflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inflow.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
