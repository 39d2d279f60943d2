use aerostock_api::{
    entities::{
        inventory::{self, Entity as Inventory},
        item::{self, Entity as Item},
        location::Entity as Location,
        maintenance_order::{self, Entity as MaintenanceOrder},
        order_item::{self, Entity as OrderItem},
    },
    import::{import_engine_shelf, import_requisitions},
    migrator::Migrator,
};
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter,
};
use sea_orm_migration::MigratorTrait;

async fn setup(name: &str) -> DatabaseConnection {
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", name);
    let mut options = ConnectOptions::new(url);
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open test database");
    Migrator::up(&db, None).await.expect("failed to migrate");
    db
}

/// Builds a requisition-sheet CSV out of 32-column records.
fn requisition_csv(rows: &[Vec<&str>]) -> Vec<u8> {
    let header: Vec<String> = (1..=32).map(|i| format!("col{}", i)).collect();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header).expect("header write failed");
    for row in rows {
        assert_eq!(row.len(), 32, "requisition fixture rows must have 32 cells");
        writer.write_record(row).expect("row write failed");
    }
    writer.into_inner().expect("csv flush failed")
}

fn requisition_row<'a>(overrides: &[(usize, &'a str)]) -> Vec<&'a str> {
    let mut row = vec![""; 32];
    for (index, value) in overrides {
        row[*index] = value;
    }
    row
}

#[tokio::test]
async fn requisition_import_groups_rows_into_orders() {
    let db = setup("import_requisitions").await;

    let rows = vec![
        requisition_row(&[
            (0, "1"),
            (1, "2024-03-15"),
            (2, "1º BAvEx"),
            (3, "OP-77"),
            (4, "EB5003"),
            (5, "AOG"),
            (6, "RMS"),
            (7, "MPN-100"),
            (8, "FUEL PUMP"),
            (9, "2"),
            (10, "IPC 28-21-51"),
            (11, "vazamento"),
            (15, "120,5"),
            (16, "30"),
            (17, "SN-9"),
            (20, "5001"),
            (24, "sim"),
            (27, "ATENDIDO PARCIALMENTE"),
            (31, "urgente"),
        ]),
        requisition_row(&[
            (0, "1"),
            (1, "2024-03-15"),
            (2, "1º BAvEx"),
            (4, "KANARIS"),
            (5, "PROG"),
            (6, "RMS"),
            (7, "MPN-200"),
            (8, "FILTER"),
            (9, "1"),
            (10, "ECMM 71-00"),
            (27, "ATENDIDO"),
        ]),
        // Unparseable date: the row is skipped, the batch continues.
        requisition_row(&[(0, "2"), (1, "someday"), (7, "MPN-300")]),
    ];

    let report = import_requisitions(&db, None, requisition_csv(&rows).as_slice())
        .await
        .expect("import failed");

    assert_eq!(report.created_orders, 1);
    assert_eq!(report.updated_orders, 1);
    assert_eq!(report.created_items, 2);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.row_errors, 0);

    let order = MaintenanceOrder::find()
        .filter(maintenance_order::Column::OrderNumber.eq(1))
        .filter(maintenance_order::Column::OrderYear.eq(2024))
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("order missing");
    assert_eq!(order.requester.as_deref(), Some("1BAVEX"));
    assert_eq!(order.order_type.as_deref(), Some("RMS"));
    // The second row's status classification wins.
    assert_eq!(order.status.as_deref(), Some("CLOSE"));

    let lines = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(&db)
        .await
        .expect("lines lookup failed");
    assert_eq!(lines.len(), 2);

    let pump = Item::find()
        .filter(item::Column::Mpn.eq("MPN-100"))
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("item missing");
    assert_eq!(pump.name, "FUEL PUMP");
    assert_eq!(pump.doc.as_deref(), Some("IPC"));
    assert_eq!(pump.tec_pub.as_deref(), Some("28-21-51"));

    let filter = Item::find()
        .filter(item::Column::Mpn.eq("MPN-200"))
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("item missing");
    assert_eq!(filter.doc.as_deref(), Some("ECMM"));

    // The skipped row must not have created a catalog entry.
    let ghost = Item::find()
        .filter(item::Column::Mpn.eq("MPN-300"))
        .one(&db)
        .await
        .expect("lookup failed");
    assert!(ghost.is_none());
}

#[tokio::test]
async fn requisition_import_is_rerunnable_without_duplicating_orders() {
    let db = setup("import_requisitions_rerun").await;

    let rows = vec![requisition_row(&[
        (0, "3"),
        (1, "2024-05-02"),
        (6, "FSM"),
        (7, "MPN-900"),
        (9, "1"),
    ])];
    let csv = requisition_csv(&rows);

    let first = import_requisitions(&db, None, csv.as_slice())
        .await
        .expect("first import failed");
    assert_eq!(first.created_orders, 1);

    let second = import_requisitions(&db, None, csv.as_slice())
        .await
        .expect("second import failed");
    assert_eq!(second.created_orders, 0);

    let orders = MaintenanceOrder::find()
        .count(&db)
        .await
        .expect("count failed");
    assert_eq!(orders, 1);
    // Lines accumulate per run; only the order header is deduplicated.
    let lines = OrderItem::find().count(&db).await.expect("count failed");
    assert_eq!(lines, 2);
}

fn shelf_csv(rows: &[Vec<&str>]) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["case", "item", "mpn", "name", "qty", "chapter", "figure", "ref", "min"])
        .expect("header write failed");
    for row in rows {
        writer.write_record(row).expect("row write failed");
    }
    writer.into_inner().expect("csv flush failed")
}

#[tokio::test]
async fn engine_shelf_import_creates_stock_on_the_kanban_section() {
    let db = setup("import_shelf").await;

    let rows = vec![
        vec!["1", "4", "MPN-E1", "O-RING", "12", "72", "10", "3", "6"],
        vec!["1", "5", "MPN-E2", "", "3,0", "", "", "", "1"],
        // No MPN: skipped.
        vec!["2", "1", "", "NAMELESS", "9", "", "", "", ""],
    ];

    let report = import_engine_shelf(&db, None, shelf_csv(&rows).as_slice())
        .await
        .expect("import failed");

    assert_eq!(report.created_items, 2);
    assert_eq!(report.created_inventory, 2);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.row_errors, 0);

    let o_ring = Item::find()
        .filter(item::Column::Mpn.eq("MPN-E1"))
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("item missing");
    assert_eq!(o_ring.doc.as_deref(), Some("IETP"));
    assert_eq!(o_ring.tec_pub.as_deref(), Some("72-10-3"));

    // Name falls back to the MPN when the cell is blank.
    let anon = Item::find()
        .filter(item::Column::Mpn.eq("MPN-E2"))
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("item missing");
    assert_eq!(anon.name, "MPN-E2");
    assert!(anon.doc.is_none());

    let stock = Inventory::find()
        .filter(inventory::Column::ItemId.eq(o_ring.id))
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("inventory missing");
    assert_eq!(stock.quantity, 12);
    assert_eq!(stock.minimum_quantity, Some(6));
    assert_eq!(stock.kanban, "ENGINE");

    let coordinate = Location::find_by_id(stock.location_id.expect("location missing"))
        .one(&db)
        .await
        .expect("lookup failed")
        .expect("location row missing");
    assert_eq!(coordinate.section.as_deref(), Some("KANBAN MOTOR"));
    assert_eq!(coordinate.case_no, Some(1));
    assert_eq!(coordinate.item_number, Some(4));

    // Re-running on the same sheet reuses items and coordinates but stacks
    // inventory rows, mirroring the legacy behavior.
    let second = import_engine_shelf(&db, None, shelf_csv(&rows).as_slice())
        .await
        .expect("second import failed");
    assert_eq!(second.created_items, 0);
    assert_eq!(second.created_inventory, 2);

    let locations = Location::find().count(&db).await.expect("count failed");
    assert_eq!(locations, 2);
}
