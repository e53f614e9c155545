//! Plan store routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use planpago_core::plan::{NewPlan, PlanError, PlanPatch};
use planpago_core::report::ReportService;
use planpago_shared::AppError;
use planpago_shared::types::PlanId;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::AppState;

/// Creates the plan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route(
            "/plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/plans/{id}/export", get(export_plan))
        .route("/plans/{id}/excel", get(export_plan))
}

/// Query parameters for listing plans.
#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    /// Case-insensitive filter over name, document and labels.
    pub search: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/plans` - Create a plan and its schedule.
async fn create_plan(
    State(state): State<AppState>,
    payload: Result<Json<NewPlan>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return rejected_body(&rejection),
    };

    match state.plans.create_plan(input).await {
        Ok(plan) => {
            info!(plan_id = %plan.id, cuotas = plan.cuotas, "Plan created");
            (StatusCode::CREATED, Json(plan)).into_response()
        }
        Err(e) => plan_error_response(e),
    }
}

/// GET `/plans` - List plans, optionally filtered by `search`.
async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<ListPlansQuery>,
) -> Response {
    match state.plans.list_plans(query.search.as_deref()).await {
        Ok(plans) => (StatusCode::OK, Json(plans)).into_response(),
        Err(e) => plan_error_response(e),
    }
}

/// GET `/plans/{id}` - Fetch one plan.
async fn get_plan(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found(&id);
    };

    match state.plans.get_plan(id).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => plan_error_response(e),
    }
}

/// PUT `/plans/{id}` - Merge a partial update.
async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PlanPatch>, JsonRejection>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found(&id);
    };
    let patch = match payload {
        Ok(Json(patch)) => patch,
        Err(rejection) => return rejected_body(&rejection),
    };

    let touched = patch.touched_fields();
    match state.plans.update_plan(id, patch).await {
        Ok(plan) => {
            info!(plan_id = %id, fields = ?touched, "Plan updated");
            (StatusCode::OK, Json(plan)).into_response()
        }
        Err(e) => plan_error_response(e),
    }
}

/// DELETE `/plans/{id}` - Remove a plan. Unknown ids succeed.
async fn delete_plan(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match state.plans.delete_plan(id).await {
        Ok(()) => {
            info!(plan_id = %id, "Plan deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => plan_error_response(e),
    }
}

/// GET `/plans/{id}/export` (also `/plans/{id}/excel`) - Download the plan
/// report as CSV.
async fn export_plan(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found(&id);
    };

    let plan = match state.plans.get_plan(id).await {
        Ok(plan) => plan,
        Err(e) => return plan_error_response(e),
    };

    match ReportService::export_csv(&plan) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", ReportService::file_name(&plan)),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(plan_id = %id, error = %e, "Failed to render plan export");
            error_response(&AppError::Internal(e.to_string()))
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_id(raw: &str) -> Option<PlanId> {
    raw.parse().ok()
}

fn not_found(raw: &str) -> Response {
    error_response(&AppError::NotFound(format!("Plan {raw}")))
}

/// Malformed or mistyped request bodies are validation errors.
fn rejected_body(rejection: &JsonRejection) -> Response {
    let app_error = AppError::Validation(rejection.body_text());
    warn!(error = %app_error, "Rejected request body");
    error_response(&app_error)
}

/// Maps plan errors to HTTP responses.
fn plan_error_response(e: PlanError) -> Response {
    let app_error = AppError::from(e);
    match &app_error {
        AppError::Storage(_) | AppError::Internal(_) => {
            error!(error = %app_error, "Plan store failure");
        }
        AppError::Validation(_) => warn!(error = %app_error, "Rejected plan request"),
        AppError::NotFound(_) => {}
    }
    error_response(&app_error)
}

fn error_response(e: &AppError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}
