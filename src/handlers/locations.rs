use crate::{
    entities::{location, location_site, location_site::SiteKind},
    errors::ServiceError,
    handlers::common::{ListResponse, PaginationParams},
    services::locations::{NewLocation, NewSite},
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
pub struct CreateSiteRequest {
    #[validate(length(min = 1, max = 255))]
    pub site: String,
    pub sub_site: Option<String>,
    pub kind: SiteKind,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLocationRequest {
    pub site_id: i32,
    pub section: Option<String>,
    pub shelf: Option<i32>,
    pub case_no: Option<i32>,
    pub item_number: Option<i32>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LocationFilters {
    pub site_id: Option<i32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/:id", get(get_location).delete(delete_location))
        .route("/sites", get(list_sites).post(create_site))
}

pub async fn list_sites(
    State(state): State<AppState>,
) -> Result<Json<Vec<location_site::Model>>, ServiceError> {
    Ok(Json(state.location_service().list_sites().await?))
}

pub async fn create_site(
    State(state): State<AppState>,
    Json(payload): Json<CreateSiteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let created = state
        .location_service()
        .create_site(NewSite {
            site: payload.site,
            sub_site: payload.sub_site,
            kind: payload.kind,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_locations(
    State(state): State<AppState>,
    Query(filters): Query<LocationFilters>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (locations, total) = state
        .location_service()
        .list_locations(filters.site_id, pagination.page(), pagination.limit())
        .await?;
    Ok(Json(ListResponse::new(locations, total, &pagination)))
}

pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .location_service()
        .create_location(NewLocation {
            site_id: payload.site_id,
            section: payload.section,
            shelf: payload.shelf,
            case_no: payload.case_no,
            item_number: payload.item_number,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<location::Model>, ServiceError> {
    Ok(Json(state.location_service().get_location(id).await?))
}

pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.location_service().delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
