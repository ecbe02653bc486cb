use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::Value;
use crate::controllers::feedback_controller::FeedbackController;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams, FieldsParams};
use crate::dto::feedback_dto::{
    AdminNoteRequest, CreateFeedbackRequest, FeedbackImportRequest, FeedbackListQuery,
    FeedbackSummary, FeedbackSummaryQuery, PurgeQuery, PurgeResponse, UpdateFeedbackRequest,
};
use crate::models::Feedback;
use crate::services::query::Page;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_feedback_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_feedback).post(create_feedback))
        .route("/summary", get(feedback_summary))
        .route("/import", post(import_feedback))
        .route("/purge", delete(purge_feedback))
        .route(
            "/:id",
            get(get_feedback)
                .put(update_feedback)
                .patch(update_feedback)
                .delete(delete_feedback),
        )
        .route("/:id/reactivate", post(reactivate_feedback))
        .route("/:id/notes", post(add_feedback_note))
}

async fn list_feedback(
    State(state): State<AppState>,
    Query(params): Query<FeedbackListQuery>,
) -> Result<Json<Page<Value>>, AppError> {
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.list(params).await?;
    Ok(Json(response))
}

async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<FieldsParams>,
) -> Result<Json<Value>, AppError> {
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.get_by_id(id, params.fields.as_deref()).await?;
    Ok(Json(response))
}

async fn create_feedback(
    State(state): State<AppState>,
    Json(request): Json<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Feedback>>), AppError> {
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_feedback(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateFeedbackRequest>,
) -> Result<Json<ApiResponse<Feedback>>, AppError> {
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn add_feedback_note(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<AdminNoteRequest>,
) -> Result<Json<ApiResponse<Feedback>>, AppError> {
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.add_note(id, request).await?;
    Ok(Json(response))
}

async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteOutcome>>, AppError> {
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.delete(id, params).await?;
    Ok(Json(response))
}

async fn reactivate_feedback(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Feedback>>, AppError> {
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.reactivate(id).await?;
    Ok(Json(response))
}

async fn feedback_summary(
    State(state): State<AppState>,
    Query(params): Query<FeedbackSummaryQuery>,
) -> Result<Json<FeedbackSummary>, AppError> {
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.summary(params).await?;
    Ok(Json(response))
}

async fn import_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FeedbackImportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Feedback>>>), AppError> {
    state.require_admin(&headers)?;
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.import(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn purge_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PurgeQuery>,
) -> Result<Json<PurgeResponse>, AppError> {
    state.require_admin(&headers)?;
    let controller = FeedbackController::new(state.store.clone());
    let response = controller.purge(params).await?;
    Ok(Json(response))
}
