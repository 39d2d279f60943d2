use crate::{
    entities::{inventory::Kanban, item, outflow},
    errors::ServiceError,
    handlers::common::{ListResponse, PaginationParams},
    handlers::Actor,
    services::inventory::{
        InventoryFilters, IssueStockRequest, ReceiveStockRequest, StockIntakeOutcome,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveStockBody {
    pub item_id: i32,
    pub serial_number: Option<String>,
    pub location_id: Option<i32>,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub minimum_quantity: Option<i32>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub kanban: Option<Kanban>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RestockBody {
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IssueStockBody {
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub claimant_id: i32,
    pub reason: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StockReceiptResponse {
    pub inventory: crate::entities::inventory::Model,
    pub inflow: crate::entities::inflow::Model,
    pub outcome: StockIntakeOutcome,
    /// Present when the serial number already existed and the unit was
    /// relocated instead of re-created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StockIssueResponse {
    pub inventory: crate::entities::inventory::Model,
    pub outflow: outflow::Model,
}

#[derive(Debug, Serialize)]
pub struct InventoryRow {
    #[serde(flatten)]
    pub inventory: crate::entities::inventory::Model,
    pub item: Option<item::Model>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct InventoryQuery {
    pub search: Option<String>,
    pub item_id: Option<i32>,
    #[serde(default)]
    pub below_minimum: bool,
    #[serde(default)]
    pub expired: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(receive_stock))
        .route("/:id", get(get_inventory))
        .route("/:id/restock", post(restock))
        .route("/:id/issue", post(issue_stock))
        .route("/:id/outflows", get(list_outflows))
}

pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (rows, total) = state
        .inventory_service()
        .list_inventory(
            InventoryFilters {
                search: query.search,
                item_id: query.item_id,
                below_minimum: query.below_minimum,
                expired: query.expired,
            },
            pagination.page(),
            pagination.limit(),
        )
        .await?;

    let rows: Vec<InventoryRow> = rows
        .into_iter()
        .map(|(inventory, item)| InventoryRow { inventory, item })
        .collect();
    Ok(Json(ListResponse::new(rows, total, &pagination)))
}

/// Take stock in: resolve or create the target ledger row and log an inflow.
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = ReceiveStockBody,
    responses(
        (status = 201, description = "Stock received and inflow logged"),
        (status = 400, description = "Non-positive quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn receive_stock(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<ReceiveStockBody>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let receipt = state
        .inventory_service()
        .receive_stock(
            actor.0,
            ReceiveStockRequest {
                item_id: payload.item_id,
                serial_number: payload.serial_number,
                location_id: payload.location_id,
                quantity: payload.quantity,
                minimum_quantity: payload.minimum_quantity,
                expiration_date: payload.expiration_date,
                kanban: payload.kanban,
                description: payload.description,
            },
        )
        .await?;

    let warning = (receipt.outcome == StockIntakeOutcome::Relocated).then(|| {
        format!(
            "serial number {} already registered; the unit was relocated, not re-created",
            receipt.inventory.serial_number.as_deref().unwrap_or_default()
        )
    });

    Ok((
        StatusCode::CREATED,
        Json(StockReceiptResponse {
            inventory: receipt.inventory,
            inflow: receipt.inflow,
            outcome: receipt.outcome,
            warning,
        }),
    ))
}

pub async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<crate::entities::inventory::Model>, ServiceError> {
    Ok(Json(state.inventory_service().get_inventory(id).await?))
}

/// Add stock to an already-known ledger row.
pub async fn restock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    actor: Actor,
    Json(payload): Json<RestockBody>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let receipt = state
        .inventory_service()
        .restock(actor.0, id, payload.quantity, payload.description)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(StockReceiptResponse {
            inventory: receipt.inventory,
            inflow: receipt.inflow,
            outcome: receipt.outcome,
            warning: None,
        }),
    ))
}

/// Issue stock to a claimant location and log an outflow.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/{id}/issue",
    request_body = IssueStockBody,
    params(("id" = i32, Path, description = "Inventory row id")),
    responses(
        (status = 201, description = "Stock issued and outflow logged"),
        (status = 400, description = "Invalid quantity for a serialized unit", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown inventory row or claimant", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn issue_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    actor: Actor,
    Json(payload): Json<IssueStockBody>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let issue = state
        .inventory_service()
        .issue_stock(
            actor.0,
            id,
            IssueStockRequest {
                quantity: payload.quantity,
                claimant_id: payload.claimant_id,
                reason: payload.reason,
                description: payload.description,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(StockIssueResponse {
            inventory: issue.inventory,
            outflow: issue.outflow,
        }),
    ))
}

pub async fn list_outflows(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<outflow::Model>>, ServiceError> {
    Ok(Json(state.inventory_service().list_outflows(id).await?))
}
