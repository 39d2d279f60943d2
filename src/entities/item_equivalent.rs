use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One stored row per equivalence pair. Rows are kept in canonical order
/// (`item_id < equivalent_item_id`), so the reverse duplicate of an existing
/// pair cannot be inserted without tripping the unique index.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_equivalents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_id: i32,
    pub equivalent_item_id: i32,
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
        belongs_to = "super::item::Entity",
        from = "Column::EquivalentItemId",
        to = "super::item::Column::Id"
    )]
    EquivalentItem,
}

impl ActiveModelBehavior for ActiveModel {}
