use crate::{
    db::DbPool,
    entities::{
        inflow::{self, Entity as Inflow},
        inventory::{self, Entity as Inventory},
        maintenance_order::{self, Entity as MaintenanceOrder, OrderStatus},
        outflow::{self, Entity as Outflow},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryMetrics {
    pub total_rows: u64,
    pub expired: u64,
    pub at_or_below_minimum: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderMetrics {
    pub total_orders: u64,
    pub open_orders: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovementTotals {
    pub total_inflows: i64,
    pub total_outflows: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyMovementPoint {
    pub date: NaiveDate,
    pub inflow_quantity: i64,
    pub outflow_quantity: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub inventory: InventoryMetrics,
    pub orders: OrderMetrics,
    pub movements: MovementTotals,
    pub daily_movements: Vec<DailyMovementPoint>,
}

#[derive(FromQueryResult)]
struct QuantitySum {
    total: Option<i64>,
}

/// Read-only dashboard counters over the ledger, the movement log and the
/// order book.
#[derive(Clone)]
pub struct MetricsService {
    db_pool: Arc<DbPool>,
}

impl MetricsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub async fn dashboard(
        &self,
        month: Option<(i32, u32)>,
    ) -> Result<DashboardMetrics, ServiceError> {
        Ok(DashboardMetrics {
            inventory: self.inventory_metrics().await?,
            orders: self.order_metrics().await?,
            movements: self.movement_totals(month).await?,
            daily_movements: self.daily_movements(7).await?,
        })
    }

    pub async fn inventory_metrics(&self) -> Result<InventoryMetrics, ServiceError> {
        let db = self.db_pool.as_ref();

        let total_rows = Inventory::find()
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let expired = Inventory::find()
            .filter(inventory::Column::ExpirationDate.lt(Utc::now()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let at_or_below_minimum = Inventory::find()
            .filter(inventory::Column::MinimumQuantity.is_not_null())
            .filter(
                Expr::col((Inventory, inventory::Column::Quantity)).lte(Expr::col((
                    Inventory,
                    inventory::Column::MinimumQuantity,
                ))),
            )
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(InventoryMetrics {
            total_rows,
            expired,
            at_or_below_minimum,
        })
    }

    pub async fn order_metrics(&self) -> Result<OrderMetrics, ServiceError> {
        let db = self.db_pool.as_ref();

        let total_orders = MaintenanceOrder::find()
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        // Partially supplied orders still count as open.
        let open_orders = MaintenanceOrder::find()
            .filter(
                maintenance_order::Column::Status.is_in([
                    OrderStatus::Open.to_string(),
                    OrderStatus::OpenPartial.to_string(),
                ]),
            )
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(OrderMetrics {
            total_orders,
            open_orders,
        })
    }

    /// Quantity totals over the movement log, optionally narrowed to one
    /// calendar month.
    pub async fn movement_totals(
        &self,
        month: Option<(i32, u32)>,
    ) -> Result<MovementTotals, ServiceError> {
        let range = match month {
            Some((year, month)) => Some(month_range(year, month)?),
            None => None,
        };

        let total_inflows = self.sum_inflows(range).await?;
        let total_outflows = self.sum_outflows(range).await?;

        Ok(MovementTotals {
            total_inflows,
            total_outflows,
        })
    }

    /// Per-day quantity totals for the trailing `days` days, oldest first.
    pub async fn daily_movements(
        &self,
        days: i64,
    ) -> Result<Vec<DailyMovementPoint>, ServiceError> {
        let today = Utc::now().date_naive();
        let mut points = Vec::with_capacity(days as usize);

        for offset in (0..days).rev() {
            let day = today - Duration::days(offset);
            let range = day_range(day)?;
            points.push(DailyMovementPoint {
                date: day,
                inflow_quantity: self.sum_inflows(Some(range)).await?,
                outflow_quantity: self.sum_outflows(Some(range)).await?,
            });
        }

        Ok(points)
    }

    async fn sum_inflows(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<i64, ServiceError> {
        let mut query = Inflow::find()
            .select_only()
            .column_as(inflow::Column::Quantity.sum(), "total");
        if let Some((start, end)) = range {
            query = query
                .filter(inflow::Column::CreatedAt.gte(start))
                .filter(inflow::Column::CreatedAt.lt(end));
        }
        let row = query
            .into_model::<QuantitySum>()
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        Ok(row.and_then(|r| r.total).unwrap_or(0))
    }

    async fn sum_outflows(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<i64, ServiceError> {
        let mut query = Outflow::find()
            .select_only()
            .column_as(outflow::Column::Quantity.sum(), "total");
        if let Some((start, end)) = range {
            query = query
                .filter(outflow::Column::CreatedAt.gte(start))
                .filter(outflow::Column::CreatedAt.lt(end));
        }
        let row = query
            .into_model::<QuantitySum>()
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        Ok(row.and_then(|r| r.total).unwrap_or(0))
    }
}

fn month_range(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ServiceError::Validation(format!("invalid month {}-{}", year, month)))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| ServiceError::Validation(format!("invalid month {}-{}", year, month)))?;
    Ok((to_utc_midnight(start), to_utc_midnight(end)))
}

fn day_range(day: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let next = day
        .succ_opt()
        .ok_or_else(|| ServiceError::Internal("date overflow".to_string()))?;
    Ok((to_utc_midnight(day), to_utc_midnight(next)))
}

fn to_utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_range_rolls_over_december() {
        let (start, end) = month_range(2024, 12).unwrap();
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn month_range_rejects_invalid_month() {
        assert!(month_range(2024, 13).is_err());
    }
}
