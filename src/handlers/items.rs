use crate::{
    entities::item,
    errors::ServiceError,
    handlers::common::{ListResponse, PaginationParams},
    handlers::Actor,
    services::catalog::{NewItem, UpdateItem},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub mpn: String,
    pub pn: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub doc: Option<String>,
    pub tec_pub: Option<String>,
    pub aircraft_doc: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub pn: Option<String>,
    pub name: Option<String>,
    pub doc: Option<String>,
    pub tec_pub: Option<String>,
    pub aircraft_doc: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkEquivalentRequest {
    pub equivalent_item_id: i32,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ItemFilters {
    pub search: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route(
            "/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/:id/equivalents", get(list_equivalents).post(link_equivalent))
        .route("/:id/equivalents/:other_id", axum::routing::delete(unlink_equivalent))
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(filters): Query<ItemFilters>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .catalog_service()
        .list_items(filters.search.as_deref(), pagination.page(), pagination.limit())
        .await?;
    Ok(Json(ListResponse::new(items, total, &pagination)))
}

/// Register a new catalog item.
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created"),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "MPN already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn create_item(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let created = state
        .catalog_service()
        .create_item(
            actor.0,
            NewItem {
                mpn: payload.mpn,
                pn: payload.pn,
                name: payload.name,
                doc: payload.doc,
                tec_pub: payload.tec_pub,
                aircraft_doc: payload.aircraft_doc,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<item::Model>, ServiceError> {
    Ok(Json(state.catalog_service().get_item(id).await?))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<item::Model>, ServiceError> {
    let updated = state
        .catalog_service()
        .update_item(
            id,
            UpdateItem {
                pn: payload.pn,
                name: payload.name,
                doc: payload.doc,
                tec_pub: payload.tec_pub,
                aircraft_doc: payload.aircraft_doc,
            },
        )
        .await?;
    Ok(Json(updated))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.catalog_service().delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_equivalents(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<item::Model>>, ServiceError> {
    Ok(Json(state.catalog_service().equivalents_of(id).await?))
}

pub async fn link_equivalent(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<LinkEquivalentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .catalog_service()
        .link_equivalents(id, payload.equivalent_item_id)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn unlink_equivalent(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .catalog_service()
        .unlink_equivalents(id, other_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
