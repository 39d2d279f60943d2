use crate::{
    db::DbPool,
    entities::{
        aircraft::Entity as Aircraft,
        inventory::{self, Entity as Inventory},
        item::{self, Entity as Item},
        maintenance_order::{self, Entity as MaintenanceOrder, OrderStatus, OrderType, Requester},
        order_item::{self, Entity as OrderItem, ServiceType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct CreateOrder {
    pub order_date: Option<NaiveDate>,
    pub requester: Option<Requester>,
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub order_date: Option<NaiveDate>,
    pub requester: Option<Requester>,
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewOrderItem {
    pub inventory_id: Option<i32>,
    pub item_id: Option<i32>,
    pub aircraft_id: Option<i32>,
    pub aircraft_destination_id: Option<i32>,
    pub operator: Option<String>,
    pub service_type: Option<ServiceType>,
    pub quantity: i32,
    pub dpe: Option<String>,
    pub eglog: Option<String>,
    pub log: bool,
    pub gmm: Option<String>,
    pub bms: Option<String>,
    pub hb_destination: Option<String>,
    pub contract_old: bool,
    pub reason: Option<String>,
    pub troubleshooting: Option<String>,
    pub failure_description: Option<String>,
    pub observation: Option<String>,
    pub notes: Option<String>,
    pub tsn_item: Option<Decimal>,
    pub tso_item: Option<Decimal>,
}

/// Attendance metadata recorded once a line item gets supplied.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrderItem {
    pub quantity: Option<i32>,
    pub quantity_supplied: Option<i32>,
    pub service_type: Option<ServiceType>,
    pub sn_attended: Option<String>,
    pub expiration_date_attended: Option<NaiveDate>,
    pub nf_answer: Option<String>,
    pub attended_date: Option<NaiveDate>,
    pub collected: Option<bool>,
    pub observation: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct OrderStats {
    pub total_orders: u64,
    pub open_orders: u64,
    pub closed_orders: u64,
    pub rms_orders: u64,
    pub fsm_orders: u64,
}

/// Maintenance requisitions and their line items.
///
/// Orders are numbered sequentially within their year at creation time and
/// never renumbered. Line items point into the catalog or the ledger for
/// traceability only; nothing here touches inventory quantities.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an order with the next free number for the current year.
    ///
    /// The number is `max(order_number) + 1` over the creation year, or 1
    /// for the year's first order. Lookup and insert share a transaction,
    /// which narrows but does not close the window where two concurrent
    /// creations pick the same number; the unique (number, year) index turns
    /// that collision into an error instead of a duplicate.
    #[instrument(skip(self, create))]
    pub async fn create_order(
        &self,
        actor: Option<Uuid>,
        create: CreateOrder,
    ) -> Result<maintenance_order::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let order = db
            .transaction::<_, maintenance_order::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let year = Utc::now().year();
                    let last = MaintenanceOrder::find()
                        .filter(maintenance_order::Column::OrderYear.eq(year))
                        .order_by_desc(maintenance_order::Column::OrderNumber)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    let order_number = last.map(|o| o.order_number + 1).unwrap_or(1);

                    let now = Utc::now();
                    maintenance_order::ActiveModel {
                        order_number: Set(order_number),
                        order_year: Set(year),
                        order_date: Set(create.order_date),
                        requester: Set(create.requester.map(|r| r.to_string())),
                        order_type: Set(create.order_type.map(|t| t.to_string())),
                        status: Set(create.status.map(|s| s.to_string())),
                        notes: Set(create.notes),
                        created_by: Set(actor),
                        updated_by: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(
            order_id = order.id,
            order_number = order.order_number,
            order_year = order.order_year,
            "maintenance order created"
        );

        self.event_sender
            .send(Event::OrderCreated {
                order_id: order.id,
                order_number: order.order_number,
                order_year: order.order_year,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(order)
    }

    pub async fn get_order(
        &self,
        id: i32,
    ) -> Result<(maintenance_order::Model, Vec<order_item::Model>), ServiceError> {
        let db = self.db_pool.as_ref();

        let order = MaintenanceOrder::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", id)))?;

        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(id))
            .order_by_desc(order_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((order, items))
    }

    pub async fn list_orders(
        &self,
        filters: OrderFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<maintenance_order::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = MaintenanceOrder::find();
        if let Some(status) = filters.status {
            query = query.filter(maintenance_order::Column::Status.eq(status.to_string()));
        }
        if let Some(order_type) = filters.order_type {
            query = query.filter(maintenance_order::Column::OrderType.eq(order_type.to_string()));
        }
        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let mut condition = Condition::any()
                .add(maintenance_order::Column::Notes.contains(search))
                .add(maintenance_order::Column::Requester.contains(search));
            if let Ok(number) = search.parse::<i32>() {
                condition = condition
                    .add(maintenance_order::Column::OrderNumber.eq(number))
                    .add(maintenance_order::Column::OrderYear.eq(number));
            }
            query = query.filter(condition);
        }

        let paginator = query
            .order_by_desc(maintenance_order::Column::OrderDate)
            .paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((orders, total))
    }

    /// Headline counts shown next to the order list.
    pub async fn order_stats(&self) -> Result<OrderStats, ServiceError> {
        let db = self.db_pool.as_ref();

        let total_orders = MaintenanceOrder::find()
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let open_orders = MaintenanceOrder::find()
            .filter(maintenance_order::Column::Status.eq(OrderStatus::Open.to_string()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let closed_orders = MaintenanceOrder::find()
            .filter(maintenance_order::Column::Status.eq(OrderStatus::Closed.to_string()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let rms_orders = MaintenanceOrder::find()
            .filter(maintenance_order::Column::OrderType.eq(OrderType::Rms.to_string()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let fsm_orders = MaintenanceOrder::find()
            .filter(maintenance_order::Column::OrderType.eq(OrderType::Fsm.to_string()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(OrderStats {
            total_orders,
            open_orders,
            closed_orders,
            rms_orders,
            fsm_orders,
        })
    }

    pub async fn update_order(
        &self,
        actor: Option<Uuid>,
        id: i32,
        update: UpdateOrder,
    ) -> Result<maintenance_order::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let (existing, _) = self.get_order(id).await?;

        let mut active: maintenance_order::ActiveModel = existing.into();
        if let Some(order_date) = update.order_date {
            active.order_date = Set(Some(order_date));
        }
        if let Some(requester) = update.requester {
            active.requester = Set(Some(requester.to_string()));
        }
        if let Some(order_type) = update.order_type {
            active.order_type = Set(Some(order_type.to_string()));
        }
        if let Some(status) = update.status {
            active.status = Set(Some(status.to_string()));
        }
        if let Some(notes) = update.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_by = Set(actor);
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::OrderUpdated { order_id: id })
            .await
            .map_err(ServiceError::Event)?;

        Ok(updated)
    }

    pub async fn delete_order(&self, id: i32) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_order(id).await?;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                OrderItem::delete_many()
                    .filter(order_item::Column::OrderId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                MaintenanceOrder::delete_by_id(id)
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                Ok(())
            })
        })
        .await
        .map_err(unwrap_txn_err)?;

        info!(order_id = id, "maintenance order deleted");
        Ok(())
    }

    /// Adds a line item. Exactly one of the inventory/catalog references
    /// must be present; the line never touches stock quantities.
    #[instrument(skip(self, new_item), fields(order_id))]
    pub async fn add_order_item(
        &self,
        actor: Option<Uuid>,
        order_id: i32,
        new_item: NewOrderItem,
    ) -> Result<order_item::Model, ServiceError> {
        match (new_item.inventory_id, new_item.item_id) {
            (Some(_), Some(_)) => {
                return Err(ServiceError::Validation(
                    "an order line references either stock or the catalog, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(ServiceError::Validation(
                    "an order line must reference a stock row or a catalog item".to_string(),
                ))
            }
            _ => {}
        }
        if new_item.quantity < 1 {
            return Err(ServiceError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let (order, _) = self.get_order(order_id).await?;

        if let Some(inventory_id) = new_item.inventory_id {
            Inventory::find_by_id(inventory_id)
                .one(db)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("inventory row {} not found", inventory_id))
                })?;
        }
        if let Some(item_id) = new_item.item_id {
            Item::find_by_id(item_id)
                .one(db)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", item_id)))?;
        }

        let now = Utc::now();
        let created = order_item::ActiveModel {
            order_id: Set(order.id),
            inventory_id: Set(new_item.inventory_id),
            item_id: Set(new_item.item_id),
            aircraft_id: Set(new_item.aircraft_id),
            aircraft_destination_id: Set(new_item.aircraft_destination_id),
            operator: Set(new_item.operator),
            service_type: Set(new_item.service_type.map(|t| t.to_string())),
            quantity: Set(new_item.quantity),
            quantity_supplied: Set(None),
            dpe: Set(new_item.dpe),
            eglog: Set(new_item.eglog),
            log: Set(new_item.log),
            sn_attended: Set(None),
            expiration_date_attended: Set(None),
            nf_answer: Set(None),
            attended_date: Set(None),
            collected: Set(false),
            gmm: Set(new_item.gmm),
            bms: Set(new_item.bms),
            hb_destination: Set(new_item.hb_destination),
            contract_old: Set(new_item.contract_old),
            reason: Set(new_item.reason),
            troubleshooting: Set(new_item.troubleshooting),
            failure_description: Set(new_item.failure_description),
            observation: Set(new_item.observation),
            notes: Set(new_item.notes),
            tsn_item: Set(new_item.tsn_item),
            tso_item: Set(new_item.tso_item),
            created_by: Set(actor),
            updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::OrderItemAdded {
                order_id: order.id,
                order_item_id: created.id,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(created)
    }

    pub async fn update_order_item(
        &self,
        actor: Option<Uuid>,
        order_item_id: i32,
        update: UpdateOrderItem,
    ) -> Result<order_item::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = OrderItem::find_by_id(order_item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("order item {} not found", order_item_id))
            })?;

        if let Some(quantity) = update.quantity {
            if quantity < 1 {
                return Err(ServiceError::Validation(
                    "quantity must be at least 1".to_string(),
                ));
            }
        }

        let mut active: order_item::ActiveModel = existing.into();
        if let Some(quantity) = update.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(quantity_supplied) = update.quantity_supplied {
            active.quantity_supplied = Set(Some(quantity_supplied));
        }
        if let Some(service_type) = update.service_type {
            active.service_type = Set(Some(service_type.to_string()));
        }
        if let Some(sn_attended) = update.sn_attended {
            active.sn_attended = Set(Some(sn_attended));
        }
        if let Some(expiration) = update.expiration_date_attended {
            active.expiration_date_attended = Set(Some(expiration));
        }
        if let Some(nf_answer) = update.nf_answer {
            active.nf_answer = Set(Some(nf_answer));
        }
        if let Some(attended_date) = update.attended_date {
            active.attended_date = Set(Some(attended_date));
        }
        if let Some(collected) = update.collected {
            active.collected = Set(collected);
        }
        if let Some(observation) = update.observation {
            active.observation = Set(Some(observation));
        }
        if let Some(notes) = update.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_by = Set(actor);
        active.updated_at = Set(Utc::now());

        active.update(db).await.map_err(ServiceError::db_error)
    }

    pub async fn delete_order_item(&self, order_item_id: i32) -> Result<(), ServiceError> {
        let result = OrderItem::delete_by_id(order_item_id)
            .exec(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "order item {} not found",
                order_item_id
            )));
        }
        Ok(())
    }

    /// Renders an order's line items in the legacy requisition sheet layout.
    pub async fn export_order_csv(&self, order_id: i32) -> Result<Vec<u8>, ServiceError> {
        let db = self.db_pool.as_ref();
        let (order, items) = self.get_order(order_id).await?;

        // Resolve referenced rows up front to keep the render loop flat.
        let inventory_ids: Vec<i32> = items.iter().filter_map(|i| i.inventory_id).collect();
        let inventories: HashMap<i32, inventory::Model> = Inventory::find()
            .filter(inventory::Column::Id.is_in(inventory_ids))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut item_ids: Vec<i32> = items.iter().filter_map(|i| i.item_id).collect();
        item_ids.extend(inventories.values().map(|inv| inv.item_id));
        let catalog: HashMap<i32, item::Model> = Item::find()
            .filter(item::Column::Id.is_in(item_ids))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let aircraft_ids: Vec<i32> = items.iter().filter_map(|i| i.aircraft_id).collect();
        let aircraft: HashMap<i32, String> = Aircraft::find()
            .filter(crate::entities::aircraft::Column::Id.is_in(aircraft_ids))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|m| (m.id, m.numeral))
            .collect();

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "requester",
                "aircraft",
                "service_type",
                "order_type",
                "mpn",
                "name",
                "quantity",
                "doc_reference",
                "reason",
                "observation",
                "failure_description",
            ])
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        for line in &items {
            let part = line
                .item_id
                .and_then(|id| catalog.get(&id))
                .or_else(|| {
                    line.inventory_id
                        .and_then(|id| inventories.get(&id))
                        .and_then(|inv| catalog.get(&inv.item_id))
                });
            let (mpn, name, doc_reference) = match part {
                Some(part) => (
                    part.mpn.clone(),
                    part.name.clone(),
                    format!(
                        "{} {}",
                        part.doc.as_deref().unwrap_or_default(),
                        part.tec_pub.as_deref().unwrap_or_default()
                    )
                    .trim()
                    .to_string(),
                ),
                None => (String::new(), String::new(), String::new()),
            };

            let quantity = line.quantity.to_string();
            writer
                .write_record([
                    order.requester.as_deref().unwrap_or_default(),
                    line.aircraft_id
                        .and_then(|id| aircraft.get(&id))
                        .map(String::as_str)
                        .unwrap_or_default(),
                    line.service_type.as_deref().unwrap_or_default(),
                    order.order_type.as_deref().unwrap_or_default(),
                    mpn.as_str(),
                    name.as_str(),
                    quantity.as_str(),
                    doc_reference.as_str(),
                    line.reason.as_deref().unwrap_or_default(),
                    line.observation.as_deref().unwrap_or_default(),
                    line.failure_description.as_deref().unwrap_or_default(),
                ])
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

fn unwrap_txn_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::Database(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}
