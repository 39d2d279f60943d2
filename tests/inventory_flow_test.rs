use aerostock_api::{
    entities::{
        inflow::{self, Entity as Inflow},
        item,
        location,
        location_site::{self, SiteKind},
        outflow::{self, Entity as Outflow},
    },
    errors::ServiceError,
    events::EventSender,
    migrator::Migrator,
    services::inventory::{
        InventoryService, IssueStockRequest, ReceiveStockRequest, StockIntakeOutcome,
    },
};
use assert_matches::assert_matches;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::mpsc;

async fn setup(name: &str) -> (InventoryService, DatabaseConnection, mpsc::Receiver<aerostock_api::events::Event>) {
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", name);
    let mut options = ConnectOptions::new(url);
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open test database");
    Migrator::up(&db, None).await.expect("failed to migrate");

    let (tx, rx) = mpsc::channel(100);
    let service = InventoryService::new(Arc::new(db.clone()), EventSender::new(tx));
    (service, db, rx)
}

async fn seed_item(db: &DatabaseConnection, mpn: &str) -> item::Model {
    let now = Utc::now();
    item::ActiveModel {
        mpn: Set(mpn.to_string()),
        name: Set(format!("part {}", mpn)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to seed item")
}

async fn seed_location(db: &DatabaseConnection, section: &str) -> location::Model {
    let site = location_site::ActiveModel {
        site: Set("1bavex".to_string()),
        sub_site: Set(Some(section.to_string())),
        kind: Set(SiteKind::Internal.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to seed site");

    location::ActiveModel {
        site_id: Set(site.id),
        section: Set(Some(section.to_string())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to seed location")
}

async fn outflow_count(db: &DatabaseConnection, inventory_id: i32) -> u64 {
    Outflow::find()
        .filter(outflow::Column::InventoryId.eq(inventory_id))
        .count(db)
        .await
        .expect("failed to count outflows")
}

async fn inflow_count(db: &DatabaseConnection, item_id: i32) -> u64 {
    Inflow::find()
        .filter(inflow::Column::ItemId.eq(item_id))
        .count(db)
        .await
        .expect("failed to count inflows")
}

#[tokio::test]
async fn outflow_then_inflow_restores_bulk_quantity() {
    let (service, db, _rx) = setup("inv_restore").await;
    let part = seed_item(&db, "MPN-RESTORE").await;
    let shelf = seed_location(&db, "A1").await;
    let bench = seed_location(&db, "A2").await;

    let receipt = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: None,
                location_id: Some(shelf.id),
                quantity: 5,
                minimum_quantity: Some(2),
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect("intake failed");
    assert_eq!(receipt.outcome, StockIntakeOutcome::NewBucket);
    assert_eq!(receipt.inventory.quantity, 5);

    let issue = service
        .issue_stock(
            None,
            receipt.inventory.id,
            IssueStockRequest {
                quantity: 3,
                claimant_id: bench.id,
                reason: Some("maintenance".to_string()),
                description: None,
            },
        )
        .await
        .expect("issue failed");
    assert_eq!(issue.inventory.quantity, 2);
    assert_eq!(issue.outflow.quantity, 3);

    let restocked = service
        .restock(None, receipt.inventory.id, 3, None)
        .await
        .expect("restock failed");
    assert_eq!(restocked.inventory.quantity, 5);
}

#[tokio::test]
async fn insufficient_stock_leaves_no_trace() {
    let (service, db, _rx) = setup("inv_insufficient").await;
    let part = seed_item(&db, "MPN-SCARCE").await;
    let shelf = seed_location(&db, "B1").await;
    let bench = seed_location(&db, "B2").await;

    let receipt = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: None,
                location_id: Some(shelf.id),
                quantity: 5,
                minimum_quantity: None,
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect("intake failed");

    // First draw succeeds and leaves 2.
    service
        .issue_stock(
            None,
            receipt.inventory.id,
            IssueStockRequest {
                quantity: 3,
                claimant_id: bench.id,
                reason: None,
                description: None,
            },
        )
        .await
        .expect("first issue failed");

    // Second draw asks for more than remains: rejected, nothing mutated,
    // nothing logged.
    let err = service
        .issue_stock(
            None,
            receipt.inventory.id,
            IssueStockRequest {
                quantity: 3,
                claimant_id: bench.id,
                reason: None,
                description: None,
            },
        )
        .await
        .expect_err("second issue should fail");
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let row = service
        .get_inventory(receipt.inventory.id)
        .await
        .expect("row lookup failed");
    assert_eq!(row.quantity, 2);
    assert_eq!(outflow_count(&db, row.id).await, 1);
}

#[tokio::test]
async fn serialized_intake_creates_single_unit_and_relocates_on_reinsertion() {
    let (service, db, _rx) = setup("inv_serial_intake").await;
    let part = seed_item(&db, "MPN-SERIAL").await;
    let shelf = seed_location(&db, "C1").await;
    let other_shelf = seed_location(&db, "C2").await;

    // Whatever quantity the caller supplies, a new serialized unit is
    // registered as exactly one piece.
    let receipt = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: Some("SN1".to_string()),
                location_id: Some(shelf.id),
                quantity: 7,
                minimum_quantity: Some(4),
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect("intake failed");
    assert_eq!(receipt.outcome, StockIntakeOutcome::NewUnit);
    assert_eq!(receipt.inventory.quantity, 1);
    assert_eq!(receipt.inventory.minimum_quantity, Some(1));
    // The movement still records what the caller declared.
    assert_eq!(receipt.inflow.quantity, 7);

    // Re-inserting the same serial only moves it.
    let reinserted = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: Some("SN1".to_string()),
                location_id: Some(other_shelf.id),
                quantity: 1,
                minimum_quantity: None,
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect("re-insertion failed");
    assert_eq!(reinserted.outcome, StockIntakeOutcome::Relocated);
    assert_eq!(reinserted.inventory.id, receipt.inventory.id);
    assert_eq!(reinserted.inventory.location_id, Some(other_shelf.id));
    assert_eq!(reinserted.inventory.quantity, 1);
    assert_eq!(inflow_count(&db, part.id).await, 2);
}

#[tokio::test]
async fn serialized_issue_transfers_the_unit() {
    let (service, db, _rx) = setup("inv_serial_issue").await;
    let part = seed_item(&db, "MPN-TRANSFER").await;
    let shelf = seed_location(&db, "D1").await;
    let hangar = seed_location(&db, "D2").await;

    let receipt = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: Some("SN-77".to_string()),
                location_id: Some(shelf.id),
                quantity: 1,
                minimum_quantity: None,
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect("intake failed");

    // Anything other than exactly one is rejected up front.
    let err = service
        .issue_stock(
            None,
            receipt.inventory.id,
            IssueStockRequest {
                quantity: 2,
                claimant_id: hangar.id,
                reason: None,
                description: None,
            },
        )
        .await
        .expect_err("issuing two of a serialized unit should fail");
    assert_matches!(err, ServiceError::Validation(_));
    assert_eq!(outflow_count(&db, receipt.inventory.id).await, 0);

    let issue = service
        .issue_stock(
            None,
            receipt.inventory.id,
            IssueStockRequest {
                quantity: 1,
                claimant_id: hangar.id,
                reason: Some("installed".to_string()),
                description: None,
            },
        )
        .await
        .expect("issue failed");

    // Transferred, not consumed: quantity invariant intact, location moved.
    assert_eq!(issue.inventory.quantity, 1);
    assert_eq!(issue.inventory.minimum_quantity, Some(1));
    assert_eq!(issue.inventory.location_id, Some(hangar.id));
    assert_eq!(issue.outflow.quantity, 1);
    assert_eq!(outflow_count(&db, receipt.inventory.id).await, 1);
}

#[tokio::test]
async fn bulk_intake_accumulates_into_the_existing_bucket() {
    let (service, db, _rx) = setup("inv_bucket").await;
    let part = seed_item(&db, "MPN-BULK").await;
    let shelf = seed_location(&db, "E1").await;

    let first = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: None,
                location_id: Some(shelf.id),
                quantity: 5,
                minimum_quantity: Some(1),
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect("first intake failed");

    let second = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: None,
                location_id: Some(shelf.id),
                quantity: 5,
                minimum_quantity: None,
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect("second intake failed");

    assert_eq!(second.outcome, StockIntakeOutcome::Restocked);
    assert_eq!(second.inventory.id, first.inventory.id);
    assert_eq!(second.inventory.quantity, 10);
    // Each movement carries its own delta, never the running total.
    assert_eq!(second.inflow.quantity, 5);
    assert_eq!(inflow_count(&db, part.id).await, 2);
}

#[tokio::test]
async fn non_positive_quantities_are_rejected_before_any_mutation() {
    let (service, db, _rx) = setup("inv_nonpositive").await;
    let part = seed_item(&db, "MPN-ZERO").await;
    let shelf = seed_location(&db, "F1").await;

    let err = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: None,
                location_id: Some(shelf.id),
                quantity: 0,
                minimum_quantity: None,
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect_err("zero intake should fail");
    assert_matches!(err, ServiceError::Validation(_));
    assert_eq!(inflow_count(&db, part.id).await, 0);

    let err = service
        .restock(None, 1, -3, None)
        .await
        .expect_err("negative restock should fail");
    assert_matches!(err, ServiceError::Validation(_));
}

#[tokio::test]
async fn issue_requires_existing_claimant() {
    let (service, db, _rx) = setup("inv_claimant").await;
    let part = seed_item(&db, "MPN-CLAIM").await;
    let shelf = seed_location(&db, "G1").await;

    let receipt = service
        .receive_stock(
            None,
            ReceiveStockRequest {
                item_id: part.id,
                serial_number: None,
                location_id: Some(shelf.id),
                quantity: 4,
                minimum_quantity: None,
                expiration_date: None,
                kanban: None,
                description: None,
            },
        )
        .await
        .expect("intake failed");

    let err = service
        .issue_stock(
            None,
            receipt.inventory.id,
            IssueStockRequest {
                quantity: 1,
                claimant_id: 9999,
                reason: None,
                description: None,
            },
        )
        .await
        .expect_err("unknown claimant should fail");
    assert_matches!(err, ServiceError::NotFound(_));

    let row = service
        .get_inventory(receipt.inventory.id)
        .await
        .expect("row lookup failed");
    assert_eq!(row.quantity, 4);
    assert_eq!(outflow_count(&db, row.id).await, 0);
}
