use crate::{
    db::DbPool,
    entities::{
        inflow,
        inventory::{self, Entity as Inventory, Kanban},
        item::{self, Entity as Item},
        location::Entity as Location,
        outflow,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// How an intake request resolved against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockIntakeOutcome {
    /// A serialized unit was registered for the first time.
    NewUnit,
    /// The serial number already existed; only its location moved.
    /// Callers should surface this as a re-insertion warning.
    Relocated,
    /// Quantity was added to an existing bulk bucket.
    Restocked,
    /// A new bulk bucket was created.
    NewBucket,
}

#[derive(Debug, Clone)]
pub struct ReceiveStockRequest {
    pub item_id: i32,
    pub serial_number: Option<String>,
    pub location_id: Option<i32>,
    pub quantity: i32,
    pub minimum_quantity: Option<i32>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub kanban: Option<Kanban>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IssueStockRequest {
    pub quantity: i32,
    pub claimant_id: i32,
    pub reason: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StockReceipt {
    pub inventory: inventory::Model,
    pub inflow: inflow::Model,
    pub outcome: StockIntakeOutcome,
}

#[derive(Debug, Clone)]
pub struct StockIssue {
    pub inventory: inventory::Model,
    pub outflow: outflow::Model,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryFilters {
    pub search: Option<String>,
    pub item_id: Option<i32>,
    pub below_minimum: bool,
    pub expired: bool,
}

/// Service owning all quantity accounting on the inventory ledger.
///
/// Inventory rows are mutated here and nowhere else (orders only reference
/// them). Every mutating operation validates first, then runs the row update
/// and the movement append in one transaction.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Takes stock in, resolving or creating the target inventory row.
    ///
    /// Serialized intake: an existing (item, serial) row is only relocated,
    /// never re-quantified, and the outcome tells the caller it was a
    /// re-insertion. A new serialized row is always created with
    /// quantity = minimum_quantity = 1, whatever quantity was supplied.
    /// Bulk intake adds to the item's no-serial bucket or creates it.
    #[instrument(skip(self, request), fields(item_id = request.item_id, quantity = request.quantity))]
    pub async fn receive_stock(
        &self,
        actor: Option<Uuid>,
        request: ReceiveStockRequest,
    ) -> Result<StockReceipt, ServiceError> {
        if request.quantity <= 0 {
            return Err(ServiceError::Validation(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let req = request.clone();
        let receipt = db
            .transaction::<_, StockReceipt, ServiceError>(move |txn| {
                Box::pin(async move {
                    let item = Item::find_by_id(req.item_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("item {} not found", req.item_id))
                        })?;

                    let serial = normalize_serial(req.serial_number.as_deref());
                    let kanban = req.kanban.unwrap_or_default();

                    let (row, outcome) = match serial {
                        Some(serial_number) => {
                            let existing = Inventory::find()
                                .filter(inventory::Column::ItemId.eq(item.id))
                                .filter(inventory::Column::SerialNumber.eq(serial_number.clone()))
                                .one(txn)
                                .await
                                .map_err(ServiceError::db_error)?;

                            match existing {
                                Some(unit) => {
                                    // Re-insertion of a known unit: only the
                                    // location moves, the quantity stays 1.
                                    let mut active: inventory::ActiveModel = unit.into();
                                    active.location_id = Set(req.location_id);
                                    let updated =
                                        active.update(txn).await.map_err(ServiceError::db_error)?;
                                    (updated, StockIntakeOutcome::Relocated)
                                }
                                None => {
                                    let created = inventory::ActiveModel {
                                        item_id: Set(item.id),
                                        serial_number: Set(Some(serial_number)),
                                        kanban: Set(kanban.to_string()),
                                        location_id: Set(req.location_id),
                                        quantity: Set(1),
                                        minimum_quantity: Set(Some(1)),
                                        expiration_date: Set(req.expiration_date),
                                        ..Default::default()
                                    }
                                    .insert(txn)
                                    .await
                                    .map_err(ServiceError::db_error)?;
                                    (created, StockIntakeOutcome::NewUnit)
                                }
                            }
                        }
                        None => {
                            let existing = Inventory::find()
                                .filter(inventory::Column::ItemId.eq(item.id))
                                .filter(inventory::Column::SerialNumber.is_null())
                                .one(txn)
                                .await
                                .map_err(ServiceError::db_error)?;

                            match existing {
                                Some(bucket) => {
                                    let new_quantity = bucket.quantity + req.quantity;
                                    let mut active: inventory::ActiveModel = bucket.into();
                                    active.quantity = Set(new_quantity);
                                    let updated =
                                        active.update(txn).await.map_err(ServiceError::db_error)?;
                                    (updated, StockIntakeOutcome::Restocked)
                                }
                                None => {
                                    let created = inventory::ActiveModel {
                                        item_id: Set(item.id),
                                        serial_number: Set(None),
                                        kanban: Set(kanban.to_string()),
                                        location_id: Set(req.location_id),
                                        quantity: Set(req.quantity),
                                        minimum_quantity: Set(req.minimum_quantity),
                                        expiration_date: Set(req.expiration_date),
                                        ..Default::default()
                                    }
                                    .insert(txn)
                                    .await
                                    .map_err(ServiceError::db_error)?;
                                    (created, StockIntakeOutcome::NewBucket)
                                }
                            }
                        }
                    };

                    // The movement record always carries the caller-supplied
                    // quantity, not the resulting total.
                    let movement =
                        append_inflow(txn, row.item_id, req.quantity, req.description, actor)
                            .await?;

                    Ok(StockReceipt {
                        inventory: row,
                        inflow: movement,
                        outcome,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        if receipt.outcome == StockIntakeOutcome::Relocated {
            warn!(
                inventory_id = receipt.inventory.id,
                serial_number = ?receipt.inventory.serial_number,
                "serial number already registered, unit relocated instead of re-created"
            );
        }

        self.event_sender
            .send(Event::StockReceived {
                inventory_id: receipt.inventory.id,
                item_id: receipt.inventory.item_id,
                quantity: request.quantity,
                outcome: receipt.outcome,
                actor,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(receipt)
    }

    /// Adds quantity to an already-known inventory row by id.
    ///
    /// This narrow path skips the serial-number resolution entirely; it is
    /// the "add stock to this exact row" operation.
    #[instrument(skip(self))]
    pub async fn restock(
        &self,
        actor: Option<Uuid>,
        inventory_id: i32,
        quantity: i32,
        description: Option<String>,
    ) -> Result<StockReceipt, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::Validation(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let receipt = db
            .transaction::<_, StockReceipt, ServiceError>(move |txn| {
                Box::pin(async move {
                    let row = Inventory::find_by_id(inventory_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "inventory row {} not found",
                                inventory_id
                            ))
                        })?;

                    let new_quantity = row.quantity + quantity;
                    let mut active: inventory::ActiveModel = row.into();
                    active.quantity = Set(new_quantity);
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    let movement =
                        append_inflow(txn, updated.item_id, quantity, description, actor).await?;

                    Ok(StockReceipt {
                        inventory: updated,
                        inflow: movement,
                        outcome: StockIntakeOutcome::Restocked,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender
            .send(Event::StockReceived {
                inventory_id: receipt.inventory.id,
                item_id: receipt.inventory.item_id,
                quantity,
                outcome: receipt.outcome,
                actor,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(receipt)
    }

    /// Issues stock from an inventory row to a claimant location.
    ///
    /// A serialized unit is transferred, not consumed: the requested quantity
    /// must be exactly 1 and the row's location is reassigned to the
    /// claimant. A bulk row is decremented and kept, even at zero. Either
    /// way exactly one outflow record is appended on success, and a
    /// rejection leaves the row and the log untouched.
    #[instrument(skip(self, request), fields(quantity = request.quantity))]
    pub async fn issue_stock(
        &self,
        actor: Option<Uuid>,
        inventory_id: i32,
        request: IssueStockRequest,
    ) -> Result<StockIssue, ServiceError> {
        if request.quantity <= 0 {
            return Err(ServiceError::Validation(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let req = request.clone();
        let issue = db
            .transaction::<_, StockIssue, ServiceError>(move |txn| {
                Box::pin(async move {
                    let row = Inventory::find_by_id(inventory_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "inventory row {} not found",
                                inventory_id
                            ))
                        })?;

                    let claimant = Location::find_by_id(req.claimant_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "claimant location {} not found",
                                req.claimant_id
                            ))
                        })?;

                    let updated = if row.is_serialized() {
                        if req.quantity != 1 {
                            return Err(ServiceError::Validation(format!(
                                "serialized unit {} can only be issued one at a time",
                                row.serial_number.as_deref().unwrap_or_default()
                            )));
                        }
                        // Transfer: the unit moves to the claimant, the
                        // quantity invariant (=1) is untouched.
                        let mut active: inventory::ActiveModel = row.into();
                        active.location_id = Set(Some(claimant.id));
                        active.update(txn).await.map_err(ServiceError::db_error)?
                    } else {
                        if row.quantity < req.quantity {
                            return Err(ServiceError::InsufficientStock(format!(
                                "available: {}, requested: {}",
                                row.quantity, req.quantity
                            )));
                        }
                        let new_quantity = row.quantity - req.quantity;
                        let mut active: inventory::ActiveModel = row.into();
                        active.quantity = Set(new_quantity);
                        active.update(txn).await.map_err(ServiceError::db_error)?
                    };

                    let quantity_out = if updated.is_serialized() {
                        1
                    } else {
                        req.quantity
                    };
                    let now = Utc::now();
                    let movement = outflow::ActiveModel {
                        inventory_id: Set(updated.id),
                        quantity: Set(quantity_out),
                        claimant_id: Set(claimant.id),
                        reason: Set(req.reason),
                        description: Set(req.description),
                        created_by: Set(actor),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    Ok(StockIssue {
                        inventory: updated,
                        outflow: movement,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(
            inventory_id = issue.inventory.id,
            quantity = issue.outflow.quantity,
            claimant_id = issue.outflow.claimant_id,
            "stock issued"
        );

        self.event_sender
            .send(Event::StockIssued {
                inventory_id: issue.inventory.id,
                quantity: issue.outflow.quantity,
                claimant_id: issue.outflow.claimant_id,
                serialized: issue.inventory.is_serialized(),
                actor,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(issue)
    }

    pub async fn get_inventory(&self, id: i32) -> Result<inventory::Model, ServiceError> {
        Inventory::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("inventory row {} not found", id)))
    }

    /// Lists ledger rows with their catalog items, ordered by location.
    #[instrument(skip(self))]
    pub async fn list_inventory(
        &self,
        filters: InventoryFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<(inventory::Model, Option<item::Model>)>, u64), ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = Inventory::find().find_also_related(Item);

        if let Some(item_id) = filters.item_id {
            query = query.filter(inventory::Column::ItemId.eq(item_id));
        }
        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(item::Column::Mpn.contains(search))
                    .add(item::Column::Pn.contains(search))
                    .add(item::Column::Name.contains(search))
                    .add(inventory::Column::SerialNumber.contains(search)),
            );
        }
        if filters.below_minimum {
            query = query
                .filter(inventory::Column::MinimumQuantity.is_not_null())
                .filter(
                    Expr::col((Inventory, inventory::Column::Quantity)).lte(Expr::col((
                        Inventory,
                        inventory::Column::MinimumQuantity,
                    ))),
                );
        }
        if filters.expired {
            query = query.filter(inventory::Column::ExpirationDate.lt(Utc::now()));
        }

        let paginator = query
            .order_by_asc(inventory::Column::LocationId)
            .paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rows, total))
    }

    /// Movement history for one inventory row (outflows only; inflows are
    /// tracked per item, not per row).
    pub async fn list_outflows(
        &self,
        inventory_id: i32,
    ) -> Result<Vec<outflow::Model>, ServiceError> {
        outflow::Entity::find()
            .filter(outflow::Column::InventoryId.eq(inventory_id))
            .order_by_desc(outflow::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}

fn normalize_serial(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

async fn append_inflow(
    txn: &sea_orm::DatabaseTransaction,
    item_id: i32,
    quantity: i32,
    description: Option<String>,
    actor: Option<Uuid>,
) -> Result<inflow::Model, ServiceError> {
    let now = Utc::now();
    inflow::ActiveModel {
        item_id: Set(item_id),
        quantity: Set(quantity),
        description: Set(description),
        created_by: Set(actor),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(ServiceError::db_error)
}

fn unwrap_txn_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::Database(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_normalization_drops_blank_input() {
        assert_eq!(normalize_serial(None), None);
        assert_eq!(normalize_serial(Some("")), None);
        assert_eq!(normalize_serial(Some("   ")), None);
        assert_eq!(normalize_serial(Some(" SN1 ")), Some("SN1".to_string()));
    }
}
