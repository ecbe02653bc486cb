use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use crate::controllers::destination_controller::DestinationController;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::destination_dto::{
    CreateDestinationRequest, DestinationListQuery, UpdateDestinationRequest,
};
use crate::models::Destination;
use crate::services::query::Page;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_destination_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_destinations).post(create_destination))
        .route(
            "/:id",
            get(get_destination)
                .put(update_destination)
                .patch(update_destination)
                .delete(delete_destination),
        )
        .route("/:id/reactivate", post(reactivate_destination))
}

async fn list_destinations(
    State(state): State<AppState>,
    Query(params): Query<DestinationListQuery>,
) -> Result<Json<Page<Destination>>, AppError> {
    let controller = DestinationController::new(state.store.clone());
    let response = controller.list(params).await?;
    Ok(Json(response))
}

async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Destination>, AppError> {
    let controller = DestinationController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_destination(
    State(state): State<AppState>,
    Json(request): Json<CreateDestinationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Destination>>), AppError> {
    let controller = DestinationController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateDestinationRequest>,
) -> Result<Json<ApiResponse<Destination>>, AppError> {
    let controller = DestinationController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, AppError> {
    let controller = DestinationController::new(state.store.clone());
    let response = controller.delete(id, params).await?;
    Ok(Json(response))
}

async fn reactivate_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Destination>>, AppError> {
    let controller = DestinationController::new(state.store.clone());
    let response = controller.reactivate(id).await?;
    Ok(Json(response))
}
