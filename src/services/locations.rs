use crate::{
    db::DbPool,
    entities::{
        inventory,
        location::{self, Entity as Location},
        location_site::{self, Entity as LocationSite, SiteKind},
        outflow,
    },
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct NewSite {
    pub site: String,
    pub sub_site: Option<String>,
    pub kind: SiteKind,
}

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub site_id: i32,
    pub section: Option<String>,
    pub shelf: Option<i32>,
    pub case_no: Option<i32>,
    pub item_number: Option<i32>,
}

/// Registry of sites and the storage coordinates inside them. Locations act
/// both as storage positions and as outflow claimants.
#[derive(Clone)]
pub struct LocationService {
    db_pool: Arc<DbPool>,
}

impl LocationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub async fn create_site(&self, new_site: NewSite) -> Result<location_site::Model, ServiceError> {
        location_site::ActiveModel {
            site: Set(new_site.site),
            sub_site: Set(new_site.sub_site),
            kind: Set(new_site.kind.to_string()),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn list_sites(&self) -> Result<Vec<location_site::Model>, ServiceError> {
        LocationSite::find()
            .order_by_asc(location_site::Column::Site)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self, new_location), fields(site_id = new_location.site_id))]
    pub async fn create_location(
        &self,
        new_location: NewLocation,
    ) -> Result<location::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        LocationSite::find_by_id(new_location.site_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("site {} not found", new_location.site_id))
            })?;

        let existing = Location::find()
            .filter(location::Column::SiteId.eq(new_location.site_id))
            .filter(opt_eq(location::Column::Section, new_location.section.clone()))
            .filter(opt_eq(location::Column::Shelf, new_location.shelf))
            .filter(opt_eq(location::Column::CaseNo, new_location.case_no))
            .filter(opt_eq(location::Column::ItemNumber, new_location.item_number))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "a location with these coordinates already exists".to_string(),
            ));
        }

        location::ActiveModel {
            site_id: Set(new_location.site_id),
            section: Set(new_location.section),
            shelf: Set(new_location.shelf),
            case_no: Set(new_location.case_no),
            item_number: Set(new_location.item_number),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn get_location(&self, id: i32) -> Result<location::Model, ServiceError> {
        Location::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("location {} not found", id)))
    }

    pub async fn list_locations(
        &self,
        site_id: Option<i32>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<location::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = Location::find();
        if let Some(site_id) = site_id {
            query = query.filter(location::Column::SiteId.eq(site_id));
        }

        let paginator = query
            .order_by_asc(location::Column::Section)
            .paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let locations = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((locations, total))
    }

    /// Deletes a location unless stock or movement history still points at it.
    pub async fn delete_location(&self, id: i32) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_location(id).await?;

        let stock_refs = inventory::Entity::find()
            .filter(inventory::Column::LocationId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let outflow_refs = outflow::Entity::find()
            .filter(outflow::Column::ClaimantId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if stock_refs + outflow_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "location {} is still referenced by inventory or outflows",
                id
            )));
        }

        Location::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }
}

/// Null-aware equality for the composite coordinate lookup: a missing
/// coordinate matches only rows where the column is null.
fn opt_eq<C, V>(column: C, value: Option<V>) -> Condition
where
    C: ColumnTrait,
    V: Into<sea_orm::Value>,
{
    match value {
        Some(v) => Condition::all().add(column.eq(v)),
        None => Condition::all().add(column.is_null()),
    }
}
