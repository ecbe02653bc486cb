use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use crate::controllers::payment_controller::PaymentController;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::payment_dto::{
    BookingPaymentsQuery, CreatePaymentRequest, PaymentListQuery, PaymentStatusRequest,
    PaymentSummary, PaymentSummaryQuery, RefundRequest, RefundResponse, UpdatePaymentRequest,
};
use crate::models::Payment;
use crate::services::query::Page;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError};

pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(create_payment))
        .route("/summary", get(payment_summary))
        .route("/booking/:booking_id", get(payments_by_booking))
        .route(
            "/:id",
            get(get_payment)
                .put(update_payment)
                .patch(update_payment)
                .delete(delete_payment),
        )
        .route("/:id/reactivate", post(reactivate_payment))
        .route("/:id/status", patch(update_payment_status))
        .route("/:id/confirm", patch(confirm_payment))
        .route("/:id/refund", post(refund_payment))
}

async fn list_payments(
    State(state): State<AppState>,
    Query(params): Query<PaymentListQuery>,
) -> Result<Json<Page<Payment>>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.list(params).await?;
    Ok(Json(response))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Payment>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<PaymentStatusRequest>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.update_status(id, request).await?;
    Ok(Json(response))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.confirm(id).await?;
    Ok(Json(response))
}

// El cuerpo es opcional: sin él se reembolsa todo lo pendiente
async fn refund_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<RefundResponse>>), AppError> {
    let request: RefundRequest = if body.is_empty() {
        RefundRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| bad_request_error(&format!("Invalid refund body: {}", e)))?
    };
    let controller = PaymentController::new(state.store.clone());
    let response = controller.refund(id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.delete(id, params).await?;
    Ok(Json(response))
}

async fn reactivate_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.reactivate(id).await?;
    Ok(Json(response))
}

async fn payments_by_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<u64>,
    Query(params): Query<BookingPaymentsQuery>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.by_booking(booking_id, params).await?;
    Ok(Json(response))
}

async fn payment_summary(
    State(state): State<AppState>,
    Query(params): Query<PaymentSummaryQuery>,
) -> Result<Json<PaymentSummary>, AppError> {
    let controller = PaymentController::new(state.store.clone());
    let response = controller.summary(params).await?;
    Ok(Json(response))
}
