use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use crate::controllers::staff_controller::StaffController;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::staff_dto::{CreateStaffRequest, StaffListQuery, StaffSummary, UpdateStaffRequest};
use crate::models::Staff;
use crate::services::query::Page;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_staff_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route("/summary", get(staff_summary))
        .route("/assigned-to/:destination_id", get(staff_assigned_to))
        .route(
            "/:id",
            get(get_staff)
                .put(update_staff)
                .patch(update_staff)
                .delete(delete_staff),
        )
        .route("/:id/reactivate", post(reactivate_staff))
}

async fn list_staff(
    State(state): State<AppState>,
    Query(params): Query<StaffListQuery>,
) -> Result<Json<Page<Staff>>, AppError> {
    let controller = StaffController::new(state.store.clone());
    let response = controller.list(params).await?;
    Ok(Json(response))
}

async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Staff>, AppError> {
    let controller = StaffController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_staff(
    State(state): State<AppState>,
    Json(request): Json<CreateStaffRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Staff>>), AppError> {
    let controller = StaffController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateStaffRequest>,
) -> Result<Json<ApiResponse<Staff>>, AppError> {
    let controller = StaffController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, AppError> {
    let controller = StaffController::new(state.store.clone());
    let response = controller.delete(id, params).await?;
    Ok(Json(response))
}

async fn reactivate_staff(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Staff>>, AppError> {
    let controller = StaffController::new(state.store.clone());
    let response = controller.reactivate(id).await?;
    Ok(Json(response))
}

async fn staff_summary(State(state): State<AppState>) -> Result<Json<StaffSummary>, AppError> {
    let controller = StaffController::new(state.store.clone());
    let response = controller.summary().await?;
    Ok(Json(response))
}

async fn staff_assigned_to(
    State(state): State<AppState>,
    Path(destination_id): Path<u64>,
) -> Result<Json<Vec<Staff>>, AppError> {
    let controller = StaffController::new(state.store.clone());
    let response = controller.assigned_to(destination_id).await?;
    Ok(Json(response))
}
