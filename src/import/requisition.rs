use crate::{
    entities::{
        aircraft::{self, Entity as Aircraft},
        item::{self, Entity as Item},
        maintenance_order::{self, Entity as MaintenanceOrder},
        order_item,
    },
    errors::ServiceError,
    import::parse,
};
use chrono::{Datelike, Utc};
use csv::StringRecord;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{info, warn};
use uuid::Uuid;

// Fixed column layout of the legacy requisition sheet (0-based).
const COL_ORDER_NUMBER: usize = 0;
const COL_ORDER_DATE: usize = 1;
const COL_REQUESTER: usize = 2;
const COL_OPERATOR: usize = 3;
const COL_AIRCRAFT: usize = 4;
const COL_SERVICE_TYPE: usize = 5;
const COL_ORDER_TYPE: usize = 6;
const COL_MPN: usize = 7;
const COL_NAME: usize = 8;
const COL_QUANTITY: usize = 9;
const COL_DOC_REF: usize = 10;
const COL_REASON: usize = 11;
const COL_OBSERVATION: usize = 12;
const COL_FAILURE_DESCRIPTION: usize = 13;
const COL_TROUBLESHOOTING: usize = 14;
const COL_TSN: usize = 15;
const COL_TSO: usize = 16;
const COL_SN: usize = 17;
const COL_EXPIRATION: usize = 19;
const COL_DEST_AIRCRAFT: usize = 20;
const COL_DPE: usize = 23;
const COL_LOG: usize = 24;
const COL_GMM: usize = 25;
const COL_COLLECTED: usize = 26;
const COL_STATUS: usize = 27;
const COL_NF: usize = 28;
const COL_ATTENDED_DATE: usize = 29;
const COL_CONTRACT_OLD: usize = 30;
const COL_NOTES: usize = 31;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequisitionReport {
    pub created_orders: u64,
    pub updated_orders: u64,
    pub created_items: u64,
    pub skipped_rows: u64,
    pub row_errors: u64,
}

/// Imports a CSV export of the legacy requisition sheet.
///
/// One order line is created per data row; orders themselves are matched by
/// (number, year) and created on first sight. Rows with an unparseable order
/// number or date are skipped and counted, never fatal.
pub async fn import_requisitions<R: std::io::Read>(
    db: &DatabaseConnection,
    actor: Option<Uuid>,
    reader: R,
) -> Result<RequisitionReport, ServiceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut report = RequisitionReport::default();

    for (index, record) in csv_reader.records().enumerate() {
        // Header is line 1, so data starts at line 2.
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "unreadable row");
                report.row_errors += 1;
                continue;
            }
        };

        match import_row(db, actor, &record, &mut report).await {
            Ok(RowOutcome::Imported) => {}
            Ok(RowOutcome::Skipped(reason)) => {
                warn!(line, reason, "row skipped");
                report.skipped_rows += 1;
            }
            Err(e) => {
                warn!(line, error = %e, "row failed");
                report.row_errors += 1;
            }
        }

        if line % 100 == 0 {
            info!(line, "import progress");
        }
    }

    info!(
        created_orders = report.created_orders,
        updated_orders = report.updated_orders,
        created_items = report.created_items,
        skipped_rows = report.skipped_rows,
        row_errors = report.row_errors,
        "requisition import finished"
    );
    Ok(report)
}

enum RowOutcome {
    Imported,
    Skipped(&'static str),
}

async fn import_row(
    db: &DatabaseConnection,
    actor: Option<Uuid>,
    record: &StringRecord,
    report: &mut RequisitionReport,
) -> Result<RowOutcome, ServiceError> {
    let Some(order_number) = parse::to_int(cell(record, COL_ORDER_NUMBER)) else {
        return Ok(RowOutcome::Skipped("invalid order number"));
    };
    let Some(order_date) = parse::to_date(cell(record, COL_ORDER_DATE)) else {
        return Ok(RowOutcome::Skipped("invalid order date"));
    };

    let requester = parse::parse_requester(cell(record, COL_REQUESTER));
    let order_type = parse::parse_order_type(cell(record, COL_ORDER_TYPE));
    let status = parse::parse_status(cell(record, COL_STATUS));
    let notes = parse::clean_text(cell(record, COL_NOTES));
    let (doc, tec_pub) = parse::parse_doc_ref(cell(record, COL_DOC_REF));

    let aircraft_id = resolve_aircraft(db, cell(record, COL_AIRCRAFT)).await?;
    let dest_aircraft_id = resolve_aircraft(db, cell(record, COL_DEST_AIRCRAFT)).await?;

    let order = upsert_order(
        db,
        actor,
        order_number,
        order_date.year(),
        order_date,
        requester,
        order_type,
        status,
        notes.clone(),
        report,
    )
    .await?;

    let item_id = match parse::clean_text(cell(record, COL_MPN)) {
        Some(mpn) => Some(
            upsert_item(
                db,
                actor,
                &mpn,
                parse::clean_text(cell(record, COL_NAME)),
                doc,
                tec_pub,
            )
            .await?,
        ),
        None => None,
    };

    let now = Utc::now();
    order_item::ActiveModel {
        order_id: Set(order.id),
        inventory_id: Set(None),
        item_id: Set(item_id),
        aircraft_id: Set(aircraft_id),
        aircraft_destination_id: Set(dest_aircraft_id),
        operator: Set(parse::clean_text(cell(record, COL_OPERATOR))),
        service_type: Set(parse::clean_text(cell(record, COL_SERVICE_TYPE))),
        quantity: Set(parse::to_int(cell(record, COL_QUANTITY)).unwrap_or(1)),
        quantity_supplied: Set(None),
        dpe: Set(parse::clean_text(cell(record, COL_DPE))),
        eglog: Set(None),
        log: Set(parse::parse_bool(cell(record, COL_LOG))),
        sn_attended: Set(parse::clean_text(cell(record, COL_SN))),
        expiration_date_attended: Set(parse::to_date(cell(record, COL_EXPIRATION))),
        nf_answer: Set(parse::clean_text(cell(record, COL_NF))),
        attended_date: Set(parse::to_date(cell(record, COL_ATTENDED_DATE))),
        collected: Set(parse::parse_bool(cell(record, COL_COLLECTED))),
        gmm: Set(parse::clean_text(cell(record, COL_GMM))),
        bms: Set(None),
        hb_destination: Set(None),
        contract_old: Set(parse::parse_bool(cell(record, COL_CONTRACT_OLD))),
        reason: Set(parse::clean_text(cell(record, COL_REASON))),
        troubleshooting: Set(parse::clean_text(cell(record, COL_TROUBLESHOOTING))),
        failure_description: Set(parse::clean_text(cell(record, COL_FAILURE_DESCRIPTION))),
        observation: Set(parse::clean_text(cell(record, COL_OBSERVATION))),
        notes: Set(notes),
        tsn_item: Set(parse::to_decimal(cell(record, COL_TSN))),
        tso_item: Set(parse::to_decimal(cell(record, COL_TSO))),
        created_by: Set(actor),
        updated_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::db_error)?;
    report.created_items += 1;

    Ok(RowOutcome::Imported)
}

fn cell<'a>(record: &'a StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

async fn resolve_aircraft(
    db: &DatabaseConnection,
    raw: &str,
) -> Result<Option<i32>, ServiceError> {
    let Some(numeral) = parse::aircraft_numeral(raw) else {
        return Ok(None);
    };

    let existing = Aircraft::find()
        .filter(aircraft::Column::Numeral.eq(numeral.clone()))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;
    if let Some(found) = existing {
        return Ok(Some(found.id));
    }

    let created = aircraft::ActiveModel {
        numeral: Set(numeral),
        tsn: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::db_error)?;
    Ok(Some(created.id))
}

#[allow(clippy::too_many_arguments)]
async fn upsert_order(
    db: &DatabaseConnection,
    actor: Option<Uuid>,
    order_number: i32,
    order_year: i32,
    order_date: chrono::NaiveDate,
    requester: Option<maintenance_order::Requester>,
    order_type: Option<maintenance_order::OrderType>,
    status: maintenance_order::OrderStatus,
    notes: Option<String>,
    report: &mut RequisitionReport,
) -> Result<maintenance_order::Model, ServiceError> {
    let existing = MaintenanceOrder::find()
        .filter(maintenance_order::Column::OrderNumber.eq(order_number))
        .filter(maintenance_order::Column::OrderYear.eq(order_year))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;

    let Some(order) = existing else {
        let now = Utc::now();
        let created = maintenance_order::ActiveModel {
            order_number: Set(order_number),
            order_year: Set(order_year),
            order_date: Set(Some(order_date)),
            requester: Set(requester.map(|r| r.to_string())),
            order_type: Set(order_type.map(|t| t.to_string())),
            status: Set(Some(status.to_string())),
            notes: Set(notes),
            created_by: Set(actor),
            updated_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;
        report.created_orders += 1;
        return Ok(created);
    };

    // Fill blanks and track status drift; never clobber populated fields
    // with sheet noise.
    let mut changed = false;
    let mut active: maintenance_order::ActiveModel = order.clone().into();

    if let (Some(requester), None) = (requester, order.requester.as_ref()) {
        active.requester = Set(Some(requester.to_string()));
        changed = true;
    }
    if let (Some(order_type), None) = (order_type, order.order_type.as_ref()) {
        active.order_type = Set(Some(order_type.to_string()));
        changed = true;
    }
    if order.status.as_deref() != Some(status.as_ref()) {
        active.status = Set(Some(status.to_string()));
        changed = true;
    }
    if let Some(new_notes) = notes {
        let existing_notes = order.notes.clone().unwrap_or_default();
        if !existing_notes.contains(&new_notes) {
            active.notes = Set(Some(format!("{}\n{}", existing_notes, new_notes)));
            changed = true;
        }
    }

    if changed {
        active.updated_by = Set(actor);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;
        report.updated_orders += 1;
        Ok(updated)
    } else {
        Ok(order)
    }
}

async fn upsert_item(
    db: &DatabaseConnection,
    actor: Option<Uuid>,
    mpn: &str,
    name: Option<String>,
    doc: Option<String>,
    tec_pub: Option<String>,
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
            name: Set(name.unwrap_or_else(|| mpn.to_string())),
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
        return Ok(created.id);
    };

    let mut changed = false;
    let mut active: item::ActiveModel = found.clone().into();
    if let Some(doc) = doc {
        if found.doc.as_deref() != Some(&doc) {
            active.doc = Set(Some(doc));
            changed = true;
        }
    }
    if let Some(tec_pub) = tec_pub {
        if found.tec_pub.as_deref() != Some(&tec_pub) {
            active.tec_pub = Set(Some(tec_pub));
            changed = true;
        }
    }

    if changed {
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;
        Ok(updated.id)
    } else {
        Ok(found.id)
    }
}
