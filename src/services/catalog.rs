use crate::{
    db::DbPool,
    entities::{
        inflow,
        inventory,
        item::{self, Entity as Item},
        item_equivalent::{self, Entity as ItemEquivalent},
        order_item,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewItem {
    pub mpn: String,
    pub pn: Option<String>,
    pub name: String,
    pub doc: Option<String>,
    pub tec_pub: Option<String>,
    pub aircraft_doc: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateItem {
    pub pn: Option<String>,
    pub name: Option<String>,
    pub doc: Option<String>,
    pub tec_pub: Option<String>,
    pub aircraft_doc: Option<String>,
}

/// Catalog of parts and their equivalence pairs.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, new_item), fields(mpn = %new_item.mpn))]
    pub async fn create_item(
        &self,
        actor: Option<Uuid>,
        new_item: NewItem,
    ) -> Result<item::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = Item::find()
            .filter(item::Column::Mpn.eq(new_item.mpn.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "an item with MPN {} already exists",
                new_item.mpn
            )));
        }

        let now = Utc::now();
        let created = item::ActiveModel {
            mpn: Set(new_item.mpn),
            pn: Set(new_item.pn),
            name: Set(new_item.name),
            doc: Set(new_item.doc),
            tec_pub: Set(new_item.tec_pub),
            aircraft_doc: Set(new_item.aircraft_doc),
            created_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ItemCreated {
                item_id: created.id,
                mpn: created.mpn.clone(),
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(created)
    }

    pub async fn update_item(
        &self,
        id: i32,
        update: UpdateItem,
    ) -> Result<item::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = self.get_item(id).await?;

        let mut active: item::ActiveModel = existing.into();
        if let Some(pn) = update.pn {
            active.pn = Set(Some(pn));
        }
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(doc) = update.doc {
            active.doc = Set(Some(doc));
        }
        if let Some(tec_pub) = update.tec_pub {
            active.tec_pub = Set(Some(tec_pub));
        }
        if let Some(aircraft_doc) = update.aircraft_doc {
            active.aircraft_doc = Set(Some(aircraft_doc));
        }
        active.updated_at = Set(Utc::now());

        active.update(db).await.map_err(ServiceError::db_error)
    }

    pub async fn get_item(&self, id: i32) -> Result<item::Model, ServiceError> {
        Item::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", id)))
    }

    pub async fn find_by_mpn(&self, mpn: &str) -> Result<Option<item::Model>, ServiceError> {
        Item::find()
            .filter(item::Column::Mpn.eq(mpn))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn list_items(
        &self,
        search: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<item::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = Item::find();
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(item::Column::Mpn.contains(search))
                    .add(item::Column::Pn.contains(search))
                    .add(item::Column::Name.contains(search)),
            );
        }

        let paginator = query
            .order_by_desc(item::Column::CreatedAt)
            .paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((items, total))
    }

    /// Deletes a catalog item, refusing while anything still references it.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: i32) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = self.get_item(id).await?;

        let inventory_refs = inventory::Entity::find()
            .filter(inventory::Column::ItemId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let inflow_refs = inflow::Entity::find()
            .filter(inflow::Column::ItemId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let order_refs = order_item::Entity::find()
            .filter(order_item::Column::ItemId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let equivalence_refs = ItemEquivalent::find()
            .filter(
                Condition::any()
                    .add(item_equivalent::Column::ItemId.eq(id))
                    .add(item_equivalent::Column::EquivalentItemId.eq(id)),
            )
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if inventory_refs + inflow_refs + order_refs + equivalence_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "item {} is still referenced by inventory, movements, orders or equivalences",
                existing.mpn
            )));
        }

        Item::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(item_id = id, "catalog item deleted");
        Ok(())
    }

    /// Links two items as equivalents.
    ///
    /// Pairs are stored once, lower id first, so the reverse duplicate check
    /// collapses into a single canonical lookup.
    #[instrument(skip(self))]
    pub async fn link_equivalents(
        &self,
        item_id: i32,
        equivalent_item_id: i32,
    ) -> Result<item_equivalent::Model, ServiceError> {
        if item_id == equivalent_item_id {
            return Err(ServiceError::Validation(
                "an item cannot be equivalent to itself".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let (low, high) = canonical_pair(item_id, equivalent_item_id);

        // Both ends must exist before linking.
        self.get_item(low).await?;
        self.get_item(high).await?;

        let existing = ItemEquivalent::find()
            .filter(item_equivalent::Column::ItemId.eq(low))
            .filter(item_equivalent::Column::EquivalentItemId.eq(high))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "this equivalence already exists".to_string(),
            ));
        }

        let created = item_equivalent::ActiveModel {
            item_id: Set(low),
            equivalent_item_id: Set(high),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::EquivalenceLinked {
                item_id: low,
                equivalent_item_id: high,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(created)
    }

    /// All equivalents of an item, whichever side of the pair it sits on.
    pub async fn equivalents_of(&self, item_id: i32) -> Result<Vec<item::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        let pairs = ItemEquivalent::find()
            .filter(
                Condition::any()
                    .add(item_equivalent::Column::ItemId.eq(item_id))
                    .add(item_equivalent::Column::EquivalentItemId.eq(item_id)),
            )
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let other_ids: Vec<i32> = pairs
            .iter()
            .map(|pair| {
                if pair.item_id == item_id {
                    pair.equivalent_item_id
                } else {
                    pair.item_id
                }
            })
            .collect();

        if other_ids.is_empty() {
            return Ok(Vec::new());
        }

        Item::find()
            .filter(item::Column::Id.is_in(other_ids))
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn unlink_equivalents(
        &self,
        item_id: i32,
        equivalent_item_id: i32,
    ) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let (low, high) = canonical_pair(item_id, equivalent_item_id);

        let result = ItemEquivalent::delete_many()
            .filter(item_equivalent::Column::ItemId.eq(low))
            .filter(item_equivalent::Column::EquivalentItemId.eq(high))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "equivalence does not exist".to_string(),
            ));
        }
        Ok(())
    }
}

fn canonical_pair(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_orders_by_id() {
        assert_eq!(canonical_pair(3, 7), (3, 7));
        assert_eq!(canonical_pair(7, 3), (3, 7));
        assert_eq!(canonical_pair(5, 5), (5, 5));
    }
}
