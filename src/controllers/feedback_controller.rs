use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use validator::Validate;

use crate::database::JsonStore;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::feedback_dto::{
    AdminNoteRequest, CreateFeedbackRequest, FeedbackCounts, FeedbackImportRequest,
    FeedbackListQuery, FeedbackSummary, FeedbackSummaryQuery, PurgeQuery, PurgeResponse,
    UpdateFeedbackRequest,
};
use crate::models::{
    AdminNote, Booking, Customer, Feedback, FeedbackStatus, FeedbackType, RecordMeta,
};
use crate::repositories::{BookingRepository, CustomerRepository, FeedbackRepository};
use crate::services::cascade::CascadeService;
use crate::services::lifecycle::{self, Transition};
use crate::services::query::{
    self, project_fields, split_csv, FilterOperator, ListParams, ListQuery, Page, SortOrder,
    Sorting,
};
use crate::services::validator::{
    check_booking_owner, require_reference, round_cents, Violations,
};
use crate::utils::errors::{bad_request_error, AppError};

const SORTING: Sorting = Sorting::new(&["id", "type", "feedback_status", "created_at", "updated_at"])
    .by_default("created_at", SortOrder::Desc);

const ALL_TYPES: [FeedbackType; 2] = [FeedbackType::Complaint, FeedbackType::Suggestion];
const ALL_STATUSES: [FeedbackStatus; 3] = [
    FeedbackStatus::Open,
    FeedbackStatus::Pending,
    FeedbackStatus::Resolved,
];

pub struct FeedbackController {
    store: Arc<JsonStore>,
    repository: FeedbackRepository,
}

impl FeedbackController {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            repository: FeedbackRepository::new(store.clone()),
            store,
        }
    }

    /// Listado con proyección opcional de campos (`fields=message,type`)
    pub async fn list(&self, params: FeedbackListQuery) -> Result<Page<Value>, AppError> {
        let query = ListQuery::from_params(
            ListParams {
                limit: params.limit,
                offset: params.offset,
                include_inactive: params.include_inactive,
                sort_by: params.sort_by.as_deref(),
                sort_order: params.sort_order.as_deref(),
            },
            &SORTING,
        )?
        .filter_opt(
            "type",
            "type",
            FilterOperator::Eq,
            params.feedback_type.map(serde_json::to_value).transpose()?,
        )
        .filter_opt(
            "feedback_status",
            "feedback_status",
            FilterOperator::Eq,
            params.feedback_status.map(serde_json::to_value).transpose()?,
        )
        .filter_opt("customer_id", "customer_id", FilterOperator::Eq, params.customer_id)
        .filter_opt(
            "created_after",
            "created_at",
            FilterOperator::Gte,
            params.created_after.map(|t| t.to_rfc3339()),
        )
        .filter_opt(
            "created_before",
            "created_at",
            FilterOperator::Lte,
            params.created_before.map(|t| t.to_rfc3339()),
        );

        let feedback = self.repository.load().await?;
        let page = query::run(feedback, &query)?;
        project_page(page, &split_csv(params.fields.as_deref()))
    }

    pub async fn get_by_id(&self, id: u64, fields: Option<&str>) -> Result<Value, AppError> {
        let feedback = self.repository.get(id).await?;
        let row = serde_json::to_value(feedback)?;
        let fields = split_csv(fields);
        if fields.is_empty() {
            Ok(row)
        } else {
            Ok(project_fields(row, &fields))
        }
    }

    pub async fn create(
        &self,
        request: CreateFeedbackRequest,
    ) -> Result<ApiResponse<Feedback>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let customers = CustomerRepository::new(self.store.clone()).load().await?;
        let bookings = BookingRepository::new(self.store.clone()).load().await?;
        check_references(&request, &customers, &bookings, &mut violations);
        violations.into_result()?;

        let feedback = self
            .repository
            .insert(build_feedback(request, FeedbackStatus::Open))
            .await?;

        Ok(ApiResponse::success_with_message(
            feedback,
            "Feedback created successfully".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: u64,
        request: UpdateFeedbackRequest,
    ) -> Result<ApiResponse<Feedback>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let mut feedback = self.repository.get(id).await?;
        lifecycle::ensure_mutable(&feedback)?;

        if let Some(booking_id) = request.related_booking_id {
            let bookings = BookingRepository::new(self.store.clone()).load().await?;
            if let Some(booking) =
                require_reference::<Booking>(&bookings, booking_id, "related_booking_id", &mut violations)
            {
                check_booking_owner(&booking, feedback.customer_id, &mut violations);
            }
            feedback.related_booking_id = Some(booking_id);
        }
        violations.into_result()?;

        if let Some(feedback_type) = request.feedback_type {
            feedback.feedback_type = feedback_type;
        }
        if let Some(message) = request.message {
            feedback.message = message.trim().to_string();
        }
        if let Some(status) = request.feedback_status {
            feedback.feedback_status = status;
        }
        feedback.meta.touch();

        let feedback = self.repository.replace(feedback).await?;
        Ok(ApiResponse::success_with_message(
            feedback,
            "Feedback updated successfully".to_string(),
        ))
    }

    /// Las notas sólo se añaden al final
    pub async fn add_note(
        &self,
        id: u64,
        request: AdminNoteRequest,
    ) -> Result<ApiResponse<Feedback>, AppError> {
        request.validate()?;

        let _guard = self.store.write_guard().await;
        let mut feedback = self.repository.get(id).await?;
        lifecycle::ensure_mutable(&feedback)?;

        let now = Utc::now();
        feedback.admin_notes.push(AdminNote {
            text: request.text.trim().to_string(),
            author: request.author.trim().to_string(),
            timestamp: now,
        });
        feedback.meta.updated_at = now;

        let feedback = self.repository.replace(feedback).await?;
        tracing::info!("📝 Nota añadida al feedback {}", id);
        Ok(ApiResponse::success_with_message(
            feedback,
            "Admin note added".to_string(),
        ))
    }

    pub async fn delete(
        &self,
        id: u64,
        params: DeleteParams,
    ) -> Result<ApiResponse<DeleteOutcome>, AppError> {
        let _guard = self.store.write_guard().await;

        if params.is_hard() {
            let cascade = CascadeService::new(self.store.clone())
                .delete_leaf::<Feedback>(id)
                .await?;
            return Ok(ApiResponse::success_with_message(
                DeleteOutcome::Hard { id, cascade },
                "Feedback permanently deleted".to_string(),
            ));
        }

        let (feedback, transition) = self.repository.soft_delete(id).await?;
        Ok(ApiResponse::success_with_message(
            DeleteOutcome::Soft {
                id,
                status: feedback.meta.status,
                changed: transition == Transition::Applied,
            },
            "Feedback deactivated".to_string(),
        ))
    }

    pub async fn reactivate(&self, id: u64) -> Result<ApiResponse<Feedback>, AppError> {
        let _guard = self.store.write_guard().await;
        let feedback = self.repository.reactivate(id).await?;
        Ok(ApiResponse::success_with_message(
            feedback,
            "Feedback reactivated".to_string(),
        ))
    }

    pub async fn summary(&self, params: FeedbackSummaryQuery) -> Result<FeedbackSummary, AppError> {
        if let (Some(after), Some(before)) = (params.created_after, params.created_before) {
            if after > before {
                return Err(bad_request_error(
                    "created_after cannot be later than created_before",
                ));
            }
        }

        let include_inactive = params.include_inactive.unwrap_or(false);
        let feedback: Vec<Feedback> = self
            .repository
            .load()
            .await?
            .into_iter()
            .filter(|f| include_inactive || f.meta.is_active())
            .filter(|f| params.customer_id.map_or(true, |c| f.customer_id == c))
            .filter(|f| params.created_after.map_or(true, |t| f.meta.created_at >= t))
            .filter(|f| params.created_before.map_or(true, |t| f.meta.created_at <= t))
            .collect();

        Ok(summarize(&feedback, params.include_trends.unwrap_or(false)))
    }

    /// Importación masiva de administración: todo el lote o nada
    pub async fn import(
        &self,
        request: FeedbackImportRequest,
    ) -> Result<ApiResponse<Vec<Feedback>>, AppError> {
        let mut violations = Violations::new();
        if request.items.is_empty() {
            violations.add("items", "length", "items must not be empty");
        }

        let _guard = self.store.write_guard().await;
        let customers = CustomerRepository::new(self.store.clone()).load().await?;
        let bookings = BookingRepository::new(self.store.clone()).load().await?;

        for (index, item) in request.items.iter().enumerate() {
            let mut item_violations = Violations::new();
            item_violations.extend(item.validate());
            check_references(item, &customers, &bookings, &mut item_violations);

            if let Err(AppError::Validation(errors)) = item_violations.into_result() {
                for (field, list) in errors.field_errors() {
                    for error in list {
                        let detail = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| error.code.to_string());
                        violations.add("items", "item", format!("items[{}].{}: {}", index, field, detail));
                    }
                }
            }
        }
        violations.into_result()?;

        let batch = request
            .items
            .into_iter()
            .map(|item| {
                let status = item.feedback_status.unwrap_or_default();
                build_feedback(item, status)
            })
            .collect();
        let imported = self.repository.insert_many(batch).await?;

        tracing::info!("📥 Importados {} registros de feedback", imported.len());
        let message = format!("{} feedback records imported", imported.len());
        Ok(ApiResponse::success_with_message(imported, message))
    }

    /// Eliminar definitivamente el feedback inactivo
    pub async fn purge(&self, params: PurgeQuery) -> Result<PurgeResponse, AppError> {
        let _guard = self.store.write_guard().await;
        let feedback = self.repository.load().await?;

        let (purged, remaining): (Vec<Feedback>, Vec<Feedback>) =
            feedback.into_iter().partition(|f| {
                !f.meta.is_active()
                    && params.deleted_before.map_or(true, |cutoff| {
                        f.meta.deactivated_at.is_some_and(|at| at < cutoff)
                    })
            });

        if !purged.is_empty() {
            self.repository.save(&remaining).await?;
        }

        let purged_ids: Vec<u64> = purged.iter().map(|f| f.id).collect();
        tracing::info!("🧹 Purga de feedback: {} eliminados", purged_ids.len());

        Ok(PurgeResponse {
            purged_count: purged_ids.len(),
            remaining_count: remaining.len(),
            purged_ids,
        })
    }
}

fn check_references(
    request: &CreateFeedbackRequest,
    customers: &[Customer],
    bookings: &[Booking],
    violations: &mut Violations,
) {
    require_reference::<Customer>(customers, request.customer_id, "customer_id", violations);
    if let Some(booking_id) = request.related_booking_id {
        if let Some(booking) =
            require_reference::<Booking>(bookings, booking_id, "related_booking_id", violations)
        {
            check_booking_owner(&booking, request.customer_id, violations);
        }
    }
}

fn build_feedback(request: CreateFeedbackRequest, status: FeedbackStatus) -> Feedback {
    Feedback {
        id: 0,
        customer_id: request.customer_id,
        feedback_type: request.feedback_type,
        message: request.message.trim().to_string(),
        related_booking_id: request.related_booking_id,
        feedback_status: status,
        admin_notes: Vec::new(),
        meta: RecordMeta::new(),
    }
}

fn project_page(page: Page<Feedback>, fields: &[String]) -> Result<Page<Value>, AppError> {
    let items = page
        .items
        .into_iter()
        .map(|f| {
            let row = serde_json::to_value(f)?;
            Ok(if fields.is_empty() {
                row
            } else {
                project_fields(row, fields)
            })
        })
        .collect::<Result<Vec<Value>, AppError>>()?;

    Ok(Page {
        items,
        metadata: page.metadata,
    })
}

fn type_key(feedback_type: FeedbackType) -> &'static str {
    match feedback_type {
        FeedbackType::Complaint => "complaint",
        FeedbackType::Suggestion => "suggestion",
    }
}

fn status_key(status: FeedbackStatus) -> &'static str {
    match status {
        FeedbackStatus::Open => "open",
        FeedbackStatus::Pending => "pending",
        FeedbackStatus::Resolved => "resolved",
    }
}

fn count(feedback: &[&Feedback]) -> FeedbackCounts {
    let mut counts = FeedbackCounts {
        total: feedback.len(),
        by_type: ALL_TYPES.iter().map(|t| (type_key(*t).to_string(), 0)).collect(),
        by_status: ALL_STATUSES.iter().map(|s| (status_key(*s).to_string(), 0)).collect(),
    };

    for item in feedback {
        *counts.by_type.entry(type_key(item.feedback_type).to_string()).or_default() += 1;
        *counts.by_status.entry(status_key(item.feedback_status).to_string()).or_default() += 1;
    }
    counts
}

fn summarize(feedback: &[Feedback], include_trends: bool) -> FeedbackSummary {
    let all: Vec<&Feedback> = feedback.iter().collect();
    let counts = count(&all);

    let resolved = counts.by_status.get("resolved").copied().unwrap_or(0);
    let resolution_rate = (resolved > 0)
        .then(|| round_cents(resolved as f64 * 100.0 / counts.total as f64));

    let monthly_trends = include_trends.then(|| {
        let mut months: BTreeMap<String, Vec<&Feedback>> = BTreeMap::new();
        for item in feedback {
            months
                .entry(item.meta.created_at.format("%Y-%m").to_string())
                .or_default()
                .push(item);
        }
        months
            .into_iter()
            .map(|(month, items)| (month, count(&items)))
            .collect()
    });

    FeedbackSummary {
        counts,
        resolution_rate,
        monthly_trends,
    }
}
