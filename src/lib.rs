//! AeroStock API Library
//!
//! Aircraft-parts inventory ledger, stock movement log and maintenance
//! order tracking.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod import;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa_swagger_ui::SwaggerUi;

use services::{
    catalog::CatalogService, inventory::InventoryService, locations::LocationService,
    metrics::MetricsService, orders::OrderService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: AppServices,
}

#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub inventory: InventoryService,
    pub locations: LocationService,
    pub orders: OrderService,
    pub metrics: MetricsService,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = AppServices {
            catalog: CatalogService::new(db.clone(), event_sender.clone()),
            inventory: InventoryService::new(db.clone(), event_sender.clone()),
            locations: LocationService::new(db.clone()),
            orders: OrderService::new(db.clone(), event_sender.clone()),
            metrics: MetricsService::new(db.clone()),
        };
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }

    pub fn catalog_service(&self) -> &CatalogService {
        &self.services.catalog
    }

    pub fn inventory_service(&self) -> &InventoryService {
        &self.services.inventory
    }

    pub fn location_service(&self) -> &LocationService {
        &self.services.locations
    }

    pub fn order_service(&self) -> &OrderService {
        &self.services.orders
    }

    pub fn metrics_service(&self) -> &MetricsService {
        &self.services.metrics
    }
}

/// Builds the application router with every API route mounted.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/items", handlers::items::router())
        .nest("/api/v1/locations", handlers::locations::router())
        .nest("/api/v1/inventory", handlers::inventory::router())
        .nest("/api/v1/orders", handlers::orders::router())
        .nest("/api/v1/metrics", handlers::metrics::router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::api_doc()))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = state.db.ping().await.is_ok();
    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": if db_ok { "up" } else { "down" },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
