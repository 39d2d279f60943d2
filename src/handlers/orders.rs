use crate::{
    entities::{
        maintenance_order::{self, OrderStatus, OrderType, Requester},
        order_item::{self, ServiceType},
    },
    errors::ServiceError,
    handlers::common::{ListResponse, PaginationParams},
    handlers::Actor,
    services::orders::{
        CreateOrder, NewOrderItem, OrderFilters, OrderStats, UpdateOrder, UpdateOrderItem,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub order_date: Option<NaiveDate>,
    pub requester: Option<Requester>,
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub order_date: Option<NaiveDate>,
    pub requester: Option<Requester>,
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderItemRequest {
    pub inventory_id: Option<i32>,
    pub item_id: Option<i32>,
    pub aircraft_id: Option<i32>,
    pub aircraft_destination_id: Option<i32>,
    pub operator: Option<String>,
    pub service_type: Option<ServiceType>,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub dpe: Option<String>,
    pub eglog: Option<String>,
    #[serde(default)]
    pub log: bool,
    pub gmm: Option<String>,
    pub bms: Option<String>,
    pub hb_destination: Option<String>,
    #[serde(default)]
    pub contract_old: bool,
    pub reason: Option<String>,
    pub troubleshooting: Option<String>,
    pub failure_description: Option<String>,
    pub observation: Option<String>,
    pub notes: Option<String>,
    pub tsn_item: Option<Decimal>,
    pub tso_item: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderItemRequest {
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

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: maintenance_order::Model,
    pub items: Vec<order_item::Model>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/stats", get(order_stats))
        .route(
            "/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/:id/items", post(add_order_item))
        .route("/:id/export", get(export_order))
        .route(
            "/items/:item_id",
            put(update_order_item).delete(delete_order_item),
        )
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (orders, total) = state
        .order_service()
        .list_orders(
            OrderFilters {
                status: query.status,
                order_type: query.order_type,
                search: query.search,
            },
            pagination.page(),
            pagination.limit(),
        )
        .await?;
    Ok(Json(ListResponse::new(orders, total, &pagination)))
}

pub async fn order_stats(State(state): State<AppState>) -> Result<Json<OrderStats>, ServiceError> {
    Ok(Json(state.order_service().order_stats().await?))
}

/// Open a new maintenance order; its number is assigned server-side,
/// sequential within the current year.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created with the next number for the year"),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .order_service()
        .create_order(
            actor.0,
            CreateOrder {
                order_date: payload.order_date,
                requester: payload.requester,
                order_type: payload.order_type,
                status: payload.status,
                notes: payload.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderDetailResponse>, ServiceError> {
    let (order, items) = state.order_service().get_order(id).await?;
    Ok(Json(OrderDetailResponse { order, items }))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    actor: Actor,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<maintenance_order::Model>, ServiceError> {
    let updated = state
        .order_service()
        .update_order(
            actor.0,
            id,
            UpdateOrder {
                order_date: payload.order_date,
                requester: payload.requester,
                order_type: payload.order_type,
                status: payload.status,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(updated))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.order_service().delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_order_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    actor: Actor,
    Json(payload): Json<CreateOrderItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let created = state
        .order_service()
        .add_order_item(
            actor.0,
            id,
            NewOrderItem {
                inventory_id: payload.inventory_id,
                item_id: payload.item_id,
                aircraft_id: payload.aircraft_id,
                aircraft_destination_id: payload.aircraft_destination_id,
                operator: payload.operator,
                service_type: payload.service_type,
                quantity: payload.quantity,
                dpe: payload.dpe,
                eglog: payload.eglog,
                log: payload.log,
                gmm: payload.gmm,
                bms: payload.bms,
                hb_destination: payload.hb_destination,
                contract_old: payload.contract_old,
                reason: payload.reason,
                troubleshooting: payload.troubleshooting,
                failure_description: payload.failure_description,
                observation: payload.observation,
                notes: payload.notes,
                tsn_item: payload.tsn_item,
                tso_item: payload.tso_item,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_order_item(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
    actor: Actor,
    Json(payload): Json<UpdateOrderItemRequest>,
) -> Result<Json<order_item::Model>, ServiceError> {
    let updated = state
        .order_service()
        .update_order_item(
            actor.0,
            item_id,
            UpdateOrderItem {
                quantity: payload.quantity,
                quantity_supplied: payload.quantity_supplied,
                service_type: payload.service_type,
                sn_attended: payload.sn_attended,
                expiration_date_attended: payload.expiration_date_attended,
                nf_answer: payload.nf_answer,
                attended_date: payload.attended_date,
                collected: payload.collected,
                observation: payload.observation,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(updated))
}

pub async fn delete_order_item(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.order_service().delete_order_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download an order's line items in the legacy requisition sheet layout.
pub async fn export_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let csv = state.order_service().export_order_csv(id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"order-{}.csv\"", id),
            ),
        ],
        csv,
    ))
}
