//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CreateScheduleRequest, CreateScheduleResponse, HealthResponse, ItemCompletionResponse,
    ScheduleListResponse, ScheduleWithItems, UpdateItemCompletionRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{ScheduleId, ScheduleItemId};
use crate::db::services as db_services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

/// GET /v1/schedules
///
/// List all stored schedules, newest first.
pub async fn list_schedules(State(state): State<AppState>) -> HandlerResult<ScheduleListResponse> {
    let schedules = db_services::list_schedules(state.repository.as_ref()).await?;
    let total = schedules.len();

    Ok(Json(ScheduleListResponse { schedules, total }))
}

/// POST /v1/schedules
///
/// Persist a schedule assembled from a validated draft. The schedule row and
/// all items are written in one transaction.
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<CreateScheduleResponse>), AppError> {
    let schedule = db_services::create_schedule(state.repository.as_ref(), request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateScheduleResponse { schedule }),
    ))
}

/// GET /v1/schedules/{schedule_id}
///
/// Fetch one schedule with its items, each enriched with its lesson.
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<i64>,
) -> HandlerResult<ScheduleWithItems> {
    let schedule =
        db_services::get_schedule_with_items(state.repository.as_ref(), ScheduleId::new(schedule_id))
            .await?;

    Ok(Json(schedule))
}

/// DELETE /v1/schedules/{schedule_id}
///
/// Delete a schedule and all of its items.
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_schedule(state.repository.as_ref(), ScheduleId::new(schedule_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /v1/schedules/{schedule_id}/items/{item_id}
///
/// Toggle the completion state of one schedule item.
pub async fn set_item_completion(
    State(state): State<AppState>,
    Path((schedule_id, item_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateItemCompletionRequest>,
) -> HandlerResult<ItemCompletionResponse> {
    let item = db_services::set_item_completed(
        state.repository.as_ref(),
        ScheduleId::new(schedule_id),
        ScheduleItemId::new(item_id),
        request.completed,
    )
    .await?;

    Ok(Json(ItemCompletionResponse { item }))
}
