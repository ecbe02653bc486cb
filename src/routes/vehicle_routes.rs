use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::vehicle_dto::{
    BulkVehicleRequest, CreateVehicleRequest, UpdateVehicleRequest, VehicleListQuery,
};
use crate::models::Vehicle;
use crate::services::query::Page;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/bulk", post(bulk_create_vehicles))
        .route(
            "/:id",
            get(get_vehicle)
                .put(update_vehicle)
                .patch(update_vehicle)
                .delete(delete_vehicle),
        )
        .route("/:id/reactivate", post(reactivate_vehicle))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<VehicleListQuery>,
) -> Result<Json<Page<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.list(params).await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vehicle>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn bulk_create_vehicles(
    State(state): State<AppState>,
    Json(request): Json<BulkVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Vehicle>>>), AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.bulk_create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.delete(id, params).await?;
    Ok(Json(response))
}

async fn reactivate_vehicle(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.reactivate(id).await?;
    Ok(Json(response))
}
