use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingListQuery, BookingStats, BookingStatusRequest, BookingSummary, CreateBookingRequest,
    UpdateBookingRequest,
};
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::models::Booking;
use crate::services::query::Page;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/stats", get(booking_stats))
        .route(
            "/:id",
            get(get_booking)
                .put(update_booking)
                .patch(update_booking)
                .delete(delete_booking),
        )
        .route("/:id/reactivate", post(reactivate_booking))
        .route("/:id/status", patch(update_booking_status))
        .route("/:id/summary", get(booking_summary))
}

async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<BookingListQuery>,
) -> Result<Json<Page<Booking>>, AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.list(params).await?;
    Ok(Json(response))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Booking>, AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<BookingStatusRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.update_status(id, request).await?;
    Ok(Json(response))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.delete(id, params).await?;
    Ok(Json(response))
}

async fn reactivate_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.reactivate(id).await?;
    Ok(Json(response))
}

async fn booking_stats(State(state): State<AppState>) -> Result<Json<BookingStats>, AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.stats().await?;
    Ok(Json(response))
}

async fn booking_summary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<BookingSummary>, AppError> {
    let controller = BookingController::new(state.store.clone());
    let response = controller.summary(id).await?;
    Ok(Json(response))
}
