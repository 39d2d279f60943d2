use crate::{errors::ServiceError, services::metrics::DashboardMetrics, AppState};
use axum::{
    extract::{Json, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MetricsQuery {
    /// Narrow movement totals to one calendar month; both must be given.
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<DashboardMetrics>, ServiceError> {
    let month = match (query.year, query.month) {
        (Some(year), Some(month)) => Some((year, month)),
        (None, None) => None,
        _ => {
            return Err(ServiceError::Validation(
                "year and month must be provided together".to_string(),
            ))
        }
    };
    Ok(Json(state.metrics_service().dashboard(month).await?))
}
