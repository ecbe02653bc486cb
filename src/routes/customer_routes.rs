use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use crate::controllers::customer_controller::CustomerController;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::customer_dto::{
    CreateCustomerRequest, CustomerBookingsResponse, CustomerListQuery, UpdateCustomerRequest,
};
use crate::models::Customer;
use crate::services::cascade::CascadeReport;
use crate::services::query::Page;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_customer_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer)
                .put(update_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
        .route("/:id/reactivate", post(reactivate_customer))
        .route("/:id/cascade-delete", post(cascade_delete_customer))
        .route("/:id/bookings", get(customer_bookings))
}

async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerListQuery>,
) -> Result<Json<Page<Customer>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.list(params).await?;
    Ok(Json(response))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Customer>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Customer>>), AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.delete(id, params).await?;
    Ok(Json(response))
}

async fn reactivate_customer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.reactivate(id).await?;
    Ok(Json(response))
}

async fn cascade_delete_customer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<CascadeReport>>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let report = controller.cascade_delete(id).await?;
    Ok(Json(ApiResponse::success_with_message(
        report,
        "Customer and related records deleted".to_string(),
    )))
}

async fn customer_bookings(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<CustomerBookingsResponse>, AppError> {
    let controller = CustomerController::new(state.store.clone());
    let response = controller.bookings(id).await?;
    Ok(Json(response))
}
