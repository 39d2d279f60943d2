use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Physical storage coordinate within a site. The composite
/// (site, section, shelf, case, item_number) tuple is unique.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub site_id: i32,
    pub section: Option<String>,
    pub shelf: Option<i32>,
    pub case_no: Option<i32>,
    pub item_number: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location_site::Entity",
        from = "Column::SiteId",
        to = "super::location_site::Column::Id"
    )]
    Site,
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventory,
}

impl Related<super::location_site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Site.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
