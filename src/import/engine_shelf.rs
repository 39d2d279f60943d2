use crate::{
    entities::{
        inventory::{self, Kanban},
        item::{self, Entity as Item},
        location::{self, Entity as Location},
        location_site::{self, Entity as LocationSite, SiteKind},
    },
    errors::ServiceError,
    import::parse,
};
use chrono::Utc;
use csv::StringRecord;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{info, warn};
use uuid::Uuid;

// Fixed column layout of the engine kanban shelf sheet (0-based).
const COL_CASE: usize = 0;
const COL_ITEM_LOC: usize = 1;
const COL_MPN: usize = 2;
const COL_NAME: usize = 3;
const COL_QUANTITY: usize = 4;
const COL_CHAPTER: usize = 5;
const COL_FIGURE: usize = 6;
const COL_ITEM_REF: usize = 7;
const COL_MIN_QUANTITY: usize = 8;

const SHELF_SITE: &str = "1bavex";
const SHELF_SUB_SITE: &str = "spu";
const SHELF_SECTION: &str = "KANBAN MOTOR";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineShelfReport {
    pub created_items: u64,
    pub created_inventory: u64,
    pub skipped_rows: u64,
    pub row_errors: u64,
}

/// Imports a CSV export of the engine kanban shelf sheet: one inventory row
/// per line, all placed on the fixed kanban section of the supply site.
pub async fn import_engine_shelf<R: std::io::Read>(
    db: &DatabaseConnection,
    actor: Option<Uuid>,
    reader: R,
) -> Result<EngineShelfReport, ServiceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut report = EngineShelfReport::default();
    let site_id = resolve_site(db).await?;

    for (index, record) in csv_reader.records().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "unreadable row");
                report.row_errors += 1;
                continue;
            }
        };

        match import_row(db, actor, site_id, &record, &mut report).await {
            Ok(true) => {}
            Ok(false) => {
                report.skipped_rows += 1;
            }
            Err(e) => {
                warn!(line, error = %e, "row failed");
                report.row_errors += 1;
            }
        }
    }

    info!(
        created_items = report.created_items,
        created_inventory = report.created_inventory,
        skipped_rows = report.skipped_rows,
        row_errors = report.row_errors,
        "engine shelf import finished"
    );
    Ok(report)
}

async fn import_row(
    db: &DatabaseConnection,
    actor: Option<Uuid>,
    site_id: i32,
    record: &StringRecord,
    report: &mut EngineShelfReport,
) -> Result<bool, ServiceError> {
    let Some(mpn) = parse::clean_text(cell(record, COL_MPN)) else {
        return Ok(false);
    };

    let name = parse::clean_text(cell(record, COL_NAME)).unwrap_or_else(|| mpn.clone());
    let quantity = parse::to_int(cell(record, COL_QUANTITY)).unwrap_or(1);
    let minimum_quantity = parse::to_int(cell(record, COL_MIN_QUANTITY));
    let case_no = parse::to_int(cell(record, COL_CASE));
    let item_number = parse::to_int(cell(record, COL_ITEM_LOC));

    // A complete chapter/figure/item triple yields an IETP reference;
    // anything less leaves the item undocumented.
    let chapter = parse::clean_text(cell(record, COL_CHAPTER));
    let figure = parse::clean_text(cell(record, COL_FIGURE));
    let item_ref = parse::clean_text(cell(record, COL_ITEM_REF));
    let (doc, tec_pub) = match (chapter, figure, item_ref) {
        (Some(chapter), Some(figure), Some(item_ref)) => (
            Some("IETP".to_string()),
            Some(format!("{}-{}-{}", chapter, figure, item_ref)),
        ),
        _ => (None, None),
    };

    let item_id = upsert_item(db, actor, &mpn, &name, doc, tec_pub, report).await?;
    let location_id = resolve_location(db, site_id, case_no, item_number).await?;

    inventory::ActiveModel {
        item_id: Set(item_id),
        serial_number: Set(None),
        kanban: Set(Kanban::Engine.to_string()),
        location_id: Set(Some(location_id)),
        quantity: Set(quantity),
        minimum_quantity: Set(minimum_quantity),
        expiration_date: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::db_error)?;
    report.created_inventory += 1;

    Ok(true)
}

fn cell<'a>(record: &'a StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

async fn resolve_site(db: &DatabaseConnection) -> Result<i32, ServiceError> {
    let existing = LocationSite::find()
        .filter(location_site::Column::Site.eq(SHELF_SITE))
        .filter(location_site::Column::SubSite.eq(SHELF_SUB_SITE))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;
    if let Some(site) = existing {
        return Ok(site.id);
    }

    let created = location_site::ActiveModel {
        site: Set(SHELF_SITE.to_string()),
        sub_site: Set(Some(SHELF_SUB_SITE.to_string())),
        kind: Set(SiteKind::Internal.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::db_error)?;
    Ok(created.id)
}

async fn resolve_location(
    db: &DatabaseConnection,
    site_id: i32,
    case_no: Option<i32>,
    item_number: Option<i32>,
) -> Result<i32, ServiceError> {
    let mut query = Location::find()
        .filter(location::Column::SiteId.eq(site_id))
        .filter(location::Column::Section.eq(SHELF_SECTION))
        .filter(location::Column::Shelf.is_null());
    query = match case_no {
        Some(case_no) => query.filter(location::Column::CaseNo.eq(case_no)),
        None => query.filter(location::Column::CaseNo.is_null()),
    };
    query = match item_number {
        Some(item_number) => query.filter(location::Column::ItemNumber.eq(item_number)),
        None => query.filter(location::Column::ItemNumber.is_null()),
    };

    if let Some(found) = query.one(db).await.map_err(ServiceError::db_error)? {
        return Ok(found.id);
    }

    let created = location::ActiveModel {
        site_id: Set(site_id),
        section: Set(Some(SHELF_SECTION.to_string())),
        shelf: Set(None),
        case_no: Set(case_no),
        item_number: Set(item_number),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::db_error)?;
    Ok(created.id)
}

async fn upsert_item(
    db: &DatabaseConnection,
    actor: Option<Uuid>,
    mpn: &str,
    name: &str,
    doc: Option<String>,
    tec_pub: Option<String>,
    report: &mut EngineShelfReport,
) -> Result<i32, ServiceError> {
    let existing = Item::find()
        .filter(item::Column::Mpn.eq(mpn))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;

    let Some(found) = existing else {
        let now = Utc::now();
        let created = item::ActiveModel {
            mpn: Set(mpn.to_string()),
            pn: Set(None),
            name: Set(name.to_string()),
            doc: Set(doc),
            tec_pub: Set(tec_pub),
            aircraft_doc: Set(None),
            created_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;
        report.created_items += 1;
        return Ok(created.id);
    };

    // The shelf sheet is authoritative for the IETP reference, including
    // clearing it when the triple is incomplete.
    if found.doc != doc || found.tec_pub != tec_pub {
        let mut active: item::ActiveModel = found.clone().into();
        active.doc = Set(doc);
        active.tec_pub = Set(tec_pub);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;
        return Ok(updated.id);
    }

    Ok(found.id)
}
