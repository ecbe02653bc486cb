use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use crate::controllers::schedule_controller::ScheduleController;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::schedule_dto::{
    CreateScheduleRequest, ScheduleListQuery, ScheduleStatusSummary, UpdateScheduleRequest,
};
use crate::models::Schedule;
use crate::services::query::Page;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_schedule_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/status-summary", get(schedule_status_summary))
        .route(
            "/:id",
            get(get_schedule)
                .put(update_schedule)
                .patch(update_schedule)
                .delete(delete_schedule),
        )
        .route("/:id/reactivate", post(reactivate_schedule))
}

async fn list_schedules(
    State(state): State<AppState>,
    Query(params): Query<ScheduleListQuery>,
) -> Result<Json<Page<Schedule>>, AppError> {
    let controller = ScheduleController::new(state.store.clone());
    let response = controller.list(params).await?;
    Ok(Json(response))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Schedule>, AppError> {
    let controller = ScheduleController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_schedule(
    State(state): State<AppState>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Schedule>>), AppError> {
    let controller = ScheduleController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateScheduleRequest>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    let controller = ScheduleController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, AppError> {
    let controller = ScheduleController::new(state.store.clone());
    let response = controller.delete(id, params).await?;
    Ok(Json(response))
}

async fn reactivate_schedule(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    let controller = ScheduleController::new(state.store.clone());
    let response = controller.reactivate(id).await?;
    Ok(Json(response))
}

async fn schedule_status_summary(
    State(state): State<AppState>,
) -> Result<Json<ScheduleStatusSummary>, AppError> {
    let controller = ScheduleController::new(state.store.clone());
    let response = controller.status_summary().await?;
    Ok(Json(response))
}
