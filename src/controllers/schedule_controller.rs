use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::database::JsonStore;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::schedule_dto::{
    CreateScheduleRequest, ScheduleListQuery, ScheduleStatusSummary, UpdateScheduleRequest,
};
use crate::models::{Destination, RecordMeta, RecordStatus, Schedule, SchedulePhase, Vehicle};
use crate::repositories::{DestinationRepository, ScheduleRepository, VehicleRepository};
use crate::services::cascade::CascadeService;
use crate::services::lifecycle::{self, Transition};
use crate::services::query::{self, FilterOperator, ListParams, ListQuery, Page, Sorting};
use crate::services::validator::{check_schedule, ensure_no_overlap, require_reference, Violations};
use crate::utils::errors::AppError;

const SORTING: Sorting = Sorting::new(&["id", "starts_at", "ends_at", "capacity", "created_at"]);

pub struct ScheduleController {
    store: Arc<JsonStore>,
    repository: ScheduleRepository,
}

impl ScheduleController {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            repository: ScheduleRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, params: ScheduleListQuery) -> Result<Page<Schedule>, AppError> {
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
        .filter_opt("vehicle_id", "vehicle_id", FilterOperator::Eq, params.vehicle_id)
        .filter_opt("destination_id", "destination_id", FilterOperator::Eq, params.destination_id)
        .filter_opt(
            "starts_after",
            "starts_at",
            FilterOperator::Gte,
            params.starts_after.map(|t| t.to_rfc3339()),
        )
        .filter_opt(
            "starts_before",
            "starts_at",
            FilterOperator::Lte,
            params.starts_before.map(|t| t.to_rfc3339()),
        );

        let schedules = self.repository.load().await?;
        query::run(schedules, &query)
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Schedule, AppError> {
        self.repository.get(id).await
    }

    pub async fn create(
        &self,
        request: CreateScheduleRequest,
    ) -> Result<ApiResponse<Schedule>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let vehicle = self.resolve_vehicle(request.vehicle_id, &mut violations).await?;
        self.resolve_destination(request.destination_id, &mut violations).await?;

        let capacity = match (request.capacity, &vehicle) {
            (Some(capacity), _) => capacity,
            (None, Some(vehicle)) => vehicle.capacity,
            (None, None) => {
                violations.add("capacity", "required", "capacity is required when no vehicle is given");
                0
            }
        };

        let schedule = Schedule {
            id: 0,
            destination_id: request.destination_id,
            vehicle_id: request.vehicle_id,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            capacity,
            meta: RecordMeta::new(),
        };
        check_schedule(&schedule, vehicle.as_ref(), &mut violations);
        violations.into_result()?;

        let schedules = self.repository.load().await?;
        ensure_no_overlap(&schedules, &schedule)?;

        let schedule = self.repository.insert(schedule).await?;
        Ok(ApiResponse::success_with_message(
            schedule,
            "Schedule created successfully".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: u64,
        request: UpdateScheduleRequest,
    ) -> Result<ApiResponse<Schedule>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let mut schedule = self.repository.get(id).await?;

        if let Some(vehicle_id) = request.vehicle_id {
            schedule.vehicle_id = Some(vehicle_id);
        }
        if let Some(destination_id) = request.destination_id {
            self.resolve_destination(Some(destination_id), &mut violations).await?;
            schedule.destination_id = Some(destination_id);
        }
        if let Some(starts_at) = request.starts_at {
            schedule.starts_at = starts_at;
        }
        if let Some(ends_at) = request.ends_at {
            schedule.ends_at = ends_at;
        }
        if let Some(capacity) = request.capacity {
            schedule.capacity = capacity;
        }

        let vehicle = self.resolve_vehicle(schedule.vehicle_id, &mut violations).await?;
        check_schedule(&schedule, vehicle.as_ref(), &mut violations);
        violations.into_result()?;

        if schedule.meta.is_active() {
            let schedules = self.repository.load().await?;
            ensure_no_overlap(&schedules, &schedule)?;
        }
        schedule.meta.touch();

        let schedule = self.repository.replace(schedule).await?;
        Ok(ApiResponse::success_with_message(
            schedule,
            "Schedule updated successfully".to_string(),
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
                .delete_leaf::<Schedule>(id)
                .await?;
            return Ok(ApiResponse::success_with_message(
                DeleteOutcome::Hard { id, cascade },
                "Schedule permanently deleted".to_string(),
            ));
        }

        let (schedule, transition) = self.repository.soft_delete(id).await?;
        Ok(ApiResponse::success_with_message(
            DeleteOutcome::Soft {
                id,
                status: schedule.meta.status,
                changed: transition == Transition::Applied,
            },
            "Schedule deactivated".to_string(),
        ))
    }

    /// Reactivar vuelve a comprobar solapes: mientras estuvo inactivo otro
    /// horario pudo ocupar su ventana
    pub async fn reactivate(&self, id: u64) -> Result<ApiResponse<Schedule>, AppError> {
        let _guard = self.store.write_guard().await;
        let mut schedule = self.repository.get(id).await?;
        lifecycle::reactivate(&mut schedule)?;

        let schedules = self.repository.load().await?;
        ensure_no_overlap(&schedules, &schedule)?;

        let schedule = self.repository.replace(schedule).await?;
        tracing::info!("♻️  Schedule {} reactivado", id);
        Ok(ApiResponse::success_with_message(
            schedule,
            "Schedule reactivated".to_string(),
        ))
    }

    pub async fn status_summary(&self) -> Result<ScheduleStatusSummary, AppError> {
        let schedules = self.repository.load().await?;
        let now = Utc::now();

        let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
        status_counts.insert("active".to_string(), 0);
        status_counts.insert("inactive".to_string(), 0);

        let mut phase_counts: BTreeMap<String, usize> = BTreeMap::new();
        for phase in ["upcoming", "ongoing", "finished"] {
            phase_counts.insert(phase.to_string(), 0);
        }

        for schedule in &schedules {
            let status = match schedule.meta.status {
                RecordStatus::Active => "active",
                RecordStatus::Inactive => "inactive",
            };
            *status_counts.entry(status.to_string()).or_default() += 1;

            if schedule.meta.is_active() {
                let phase = match schedule.phase_at(now) {
                    SchedulePhase::Upcoming => "upcoming",
                    SchedulePhase::Ongoing => "ongoing",
                    SchedulePhase::Finished => "finished",
                };
                *phase_counts.entry(phase.to_string()).or_default() += 1;
            }
        }

        Ok(ScheduleStatusSummary {
            status_counts,
            phase_counts,
            total: schedules.len(),
        })
    }

    async fn resolve_vehicle(
        &self,
        vehicle_id: Option<u64>,
        violations: &mut Violations,
    ) -> Result<Option<Vehicle>, AppError> {
        let Some(vehicle_id) = vehicle_id else {
            return Ok(None);
        };
        let vehicles = VehicleRepository::new(self.store.clone()).load().await?;
        Ok(require_reference::<Vehicle>(&vehicles, vehicle_id, "vehicle_id", violations))
    }

    async fn resolve_destination(
        &self,
        destination_id: Option<u64>,
        violations: &mut Violations,
    ) -> Result<(), AppError> {
        let Some(destination_id) = destination_id else {
            return Ok(());
        };
        let destinations = DestinationRepository::new(self.store.clone()).load().await?;
        require_reference::<Destination>(&destinations, destination_id, "destination_id", violations);
        Ok(())
    }
}
