use aerostock_api::{
    entities::maintenance_order::{self, Entity as MaintenanceOrder, OrderStatus, OrderType},
    events::EventSender,
    migrator::Migrator,
    services::orders::{CreateOrder, NewOrderItem, OrderService},
};
use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::mpsc;

async fn setup(name: &str) -> (OrderService, DatabaseConnection, mpsc::Receiver<aerostock_api::events::Event>) {
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", name);
    let mut options = ConnectOptions::new(url);
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open test database");
    Migrator::up(&db, None).await.expect("failed to migrate");

    let (tx, rx) = mpsc::channel(100);
    let service = OrderService::new(Arc::new(db.clone()), EventSender::new(tx));
    (service, db, rx)
}

#[tokio::test]
async fn order_numbers_are_sequential_within_the_year() {
    let (service, db, _rx) = setup("orders_sequential").await;

    for expected in 1..=4 {
        let order = service
            .create_order(None, CreateOrder::default())
            .await
            .expect("order creation failed");
        assert_eq!(order.order_number, expected);
        assert_eq!(order.order_year, Utc::now().year());
    }

    let numbers: Vec<i32> = MaintenanceOrder::find()
        .order_by_asc(maintenance_order::Column::OrderNumber)
        .all(&db)
        .await
        .expect("listing failed")
        .into_iter()
        .map(|o| o.order_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn numbering_ignores_other_years() {
    let (service, db, _rx) = setup("orders_year_reset").await;
    let now = Utc::now();

    // A backlog of last year's orders must not leak into this year's
    // sequence.
    for number in [5, 6, 7] {
        maintenance_order::ActiveModel {
            order_number: Set(number),
            order_year: Set(now.year() - 1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("failed to seed previous-year order");
    }

    let order = service
        .create_order(None, CreateOrder::default())
        .await
        .expect("order creation failed");
    assert_eq!(order.order_number, 1);
    assert_eq!(order.order_year, now.year());

    let previous_year_max = MaintenanceOrder::find()
        .filter(maintenance_order::Column::OrderYear.eq(now.year() - 1))
        .order_by_desc(maintenance_order::Column::OrderNumber)
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("seeded orders missing");
    assert_eq!(previous_year_max.order_number, 7);
}

#[tokio::test]
async fn order_numbers_never_change_after_creation() {
    let (service, _db, _rx) = setup("orders_stable").await;

    let first = service
        .create_order(None, CreateOrder::default())
        .await
        .expect("order creation failed");
    let _second = service
        .create_order(None, CreateOrder::default())
        .await
        .expect("order creation failed");

    let updated = service
        .update_order(
            None,
            first.id,
            aerostock_api::services::orders::UpdateOrder {
                status: Some(OrderStatus::Closed),
                order_type: Some(OrderType::Rms),
                ..Default::default()
            },
        )
        .await
        .expect("update failed");

    assert_eq!(updated.order_number, first.order_number);
    assert_eq!(updated.order_year, first.order_year);
    assert_eq!(updated.status.as_deref(), Some("CLOSE"));
}

#[tokio::test]
async fn order_lines_reference_exactly_one_target() {
    let (service, _db, _rx) = setup("orders_line_rule").await;

    let order = service
        .create_order(None, CreateOrder::default())
        .await
        .expect("order creation failed");

    let err = service
        .add_order_item(
            None,
            order.id,
            NewOrderItem {
                quantity: 1,
                ..Default::default()
            },
        )
        .await
        .expect_err("line without references should fail");
    assert!(matches!(
        err,
        aerostock_api::errors::ServiceError::Validation(_)
    ));

    let err = service
        .add_order_item(
            None,
            order.id,
            NewOrderItem {
                inventory_id: Some(1),
                item_id: Some(1),
                quantity: 1,
                ..Default::default()
            },
        )
        .await
        .expect_err("line with both references should fail");
    assert!(matches!(
        err,
        aerostock_api::errors::ServiceError::Validation(_)
    ));
}
