use aerostock_api::{
    entities::{inventory, item_equivalent::Entity as ItemEquivalent},
    errors::ServiceError,
    events::EventSender,
    migrator::Migrator,
    services::catalog::{CatalogService, NewItem},
};
use assert_matches::assert_matches;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Set,
};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::mpsc;

async fn setup(name: &str) -> (CatalogService, DatabaseConnection, mpsc::Receiver<aerostock_api::events::Event>) {
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", name);
    let mut options = ConnectOptions::new(url);
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open test database");
    Migrator::up(&db, None).await.expect("failed to migrate");

    let (tx, rx) = mpsc::channel(100);
    let service = CatalogService::new(Arc::new(db.clone()), EventSender::new(tx));
    (service, db, rx)
}

fn new_item(mpn: &str) -> NewItem {
    NewItem {
        mpn: mpn.to_string(),
        pn: None,
        name: format!("part {}", mpn),
        doc: None,
        tec_pub: None,
        aircraft_doc: None,
    }
}

#[tokio::test]
async fn duplicate_mpn_is_rejected() {
    let (service, _db, _rx) = setup("catalog_mpn").await;

    service
        .create_item(None, new_item("MPN-A"))
        .await
        .expect("creation failed");
    let err = service
        .create_item(None, new_item("MPN-A"))
        .await
        .expect_err("duplicate MPN should fail");
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn equivalence_pairs_are_canonical_and_symmetric() {
    let (service, db, _rx) = setup("catalog_equiv").await;

    let a = service
        .create_item(None, new_item("MPN-A"))
        .await
        .expect("creation failed");
    let b = service
        .create_item(None, new_item("MPN-B"))
        .await
        .expect("creation failed");

    // Linked in "reverse" argument order on purpose: storage is canonical.
    let pair = service
        .link_equivalents(b.id, a.id)
        .await
        .expect("link failed");
    assert!(pair.item_id < pair.equivalent_item_id);

    // The reverse duplicate collapses onto the same canonical row.
    let err = service
        .link_equivalents(a.id, b.id)
        .await
        .expect_err("reverse duplicate should fail");
    assert_matches!(err, ServiceError::Conflict(_));

    let rows = ItemEquivalent::find().count(&db).await.expect("count failed");
    assert_eq!(rows, 1);

    // Both sides see each other.
    let of_a = service.equivalents_of(a.id).await.expect("lookup failed");
    assert_eq!(of_a.len(), 1);
    assert_eq!(of_a[0].id, b.id);
    let of_b = service.equivalents_of(b.id).await.expect("lookup failed");
    assert_eq!(of_b.len(), 1);
    assert_eq!(of_b[0].id, a.id);
}

#[tokio::test]
async fn self_equivalence_is_rejected() {
    let (service, _db, _rx) = setup("catalog_self").await;

    let a = service
        .create_item(None, new_item("MPN-SELF"))
        .await
        .expect("creation failed");
    let err = service
        .link_equivalents(a.id, a.id)
        .await
        .expect_err("self equivalence should fail");
    assert_matches!(err, ServiceError::Validation(_));
}

#[tokio::test]
async fn unlinking_accepts_either_direction() {
    let (service, db, _rx) = setup("catalog_unlink").await;

    let a = service
        .create_item(None, new_item("MPN-A"))
        .await
        .expect("creation failed");
    let b = service
        .create_item(None, new_item("MPN-B"))
        .await
        .expect("creation failed");
    service
        .link_equivalents(a.id, b.id)
        .await
        .expect("link failed");

    service
        .unlink_equivalents(b.id, a.id)
        .await
        .expect("unlink failed");
    let rows = ItemEquivalent::find().count(&db).await.expect("count failed");
    assert_eq!(rows, 0);

    let err = service
        .unlink_equivalents(a.id, b.id)
        .await
        .expect_err("second unlink should fail");
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn referenced_items_cannot_be_deleted() {
    let (service, db, _rx) = setup("catalog_delete").await;

    let a = service
        .create_item(None, new_item("MPN-HELD"))
        .await
        .expect("creation failed");
    inventory::ActiveModel {
        item_id: Set(a.id),
        kanban: Set("NOT".to_string()),
        quantity: Set(3),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("failed to seed inventory");

    let err = service
        .delete_item(a.id)
        .await
        .expect_err("delete of referenced item should fail");
    assert_matches!(err, ServiceError::Conflict(_));

    // An unreferenced item goes away cleanly.
    let b = service
        .create_item(None, new_item("MPN-FREE"))
        .await
        .expect("creation failed");
    service.delete_item(b.id).await.expect("delete failed");
    let err = service.get_item(b.id).await.expect_err("item should be gone");
    assert_matches!(err, ServiceError::NotFound(_));
}
