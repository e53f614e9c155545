//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for the plan store
//! - CSV export of a plan report
//! - Error mapping to JSON responses

pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::{Method, header};
use planpago_core::plan::PlanService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Plan store service.
    pub plans: Arc<PlanService>,
}

impl AppState {
    /// Creates state around a plan service.
    #[must_use]
    pub fn new(plans: PlanService) -> Self {
        Self {
            plans: Arc::new(plans),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .with_state(state)
}
