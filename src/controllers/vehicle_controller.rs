use std::collections::HashSet;
use std::sync::Arc;

use validator::Validate;

use crate::database::JsonStore;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::vehicle_dto::{
    BulkVehicleRequest, CreateVehicleRequest, UpdateVehicleRequest, VehicleListQuery,
};
use crate::models::{Destination, RecordMeta, Vehicle};
use crate::repositories::{DestinationRepository, ScheduleRepository, VehicleRepository};
use crate::services::cascade::CascadeService;
use crate::services::lifecycle::Transition;
use crate::services::query::{self, FilterOperator, ListParams, ListQuery, Page, Sorting};
use crate::services::validator::{check_vehicle_schedules, require_reference, Violations};
use crate::utils::errors::{conflict_error, AppError};
use crate::utils::validation::normalize_license_plate;

const SORTING: Sorting = Sorting::new(&["id", "type", "capacity", "license_plate", "created_at"]);

pub struct VehicleController {
    store: Arc<JsonStore>,
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            repository: VehicleRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, params: VehicleListQuery) -> Result<Page<Vehicle>, AppError> {
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
        .filter_opt("type", "type", FilterOperator::Like, params.vehicle_type)
        .filter_opt("min_capacity", "capacity", FilterOperator::Gte, params.min_capacity)
        .filter_opt(
            "destination_id",
            "destination_ids",
            FilterOperator::Contains,
            params.destination_id,
        )
        .filter_opt(
            "license_plate",
            "license_plate",
            FilterOperator::Like,
            params.license_plate.as_deref().map(normalize_license_plate),
        );

        let vehicles = self.repository.load().await?;
        query::run(vehicles, &query)
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Vehicle, AppError> {
        self.repository.get(id).await
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let destinations = DestinationRepository::new(self.store.clone()).load().await?;
        check_destinations(&destinations, &request.destination_ids, &mut violations);
        violations.into_result()?;

        let license_plate = request.license_plate.as_deref().map(normalize_license_plate);
        if let Some(plate) = &license_plate {
            if self.repository.license_plate_exists(plate, None).await? {
                return Err(conflict_error("Vehicle", "license_plate", plate));
            }
        }

        let vehicle = self
            .repository
            .insert(build_vehicle(request, license_plate))
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle created successfully".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: u64,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let mut vehicle = self.repository.get(id).await?;

        if let Some(destination_ids) = request.destination_ids {
            let destinations = DestinationRepository::new(self.store.clone()).load().await?;
            check_destinations(&destinations, &destination_ids, &mut violations);
            vehicle.destination_ids = dedup(destination_ids);
        }
        if let Some(capacity) = request.capacity {
            vehicle.capacity = capacity;
        }
        let schedules = ScheduleRepository::new(self.store.clone()).load().await?;
        check_vehicle_schedules(&vehicle, &schedules, &mut violations);
        violations.into_result()?;

        if let Some(plate) = request.license_plate {
            let plate = normalize_license_plate(&plate);
            if self.repository.license_plate_exists(&plate, Some(id)).await? {
                return Err(conflict_error("Vehicle", "license_plate", &plate));
            }
            vehicle.license_plate = Some(plate);
        }
        if let Some(vehicle_type) = request.vehicle_type {
            vehicle.vehicle_type = vehicle_type.trim().to_string();
        }
        vehicle.meta.touch();

        let vehicle = self.repository.replace(vehicle).await?;
        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle updated successfully".to_string(),
        ))
    }

    /// Alta masiva: se valida el lote completo antes de escribir nada
    pub async fn bulk_create(
        &self,
        request: BulkVehicleRequest,
    ) -> Result<ApiResponse<Vec<Vehicle>>, AppError> {
        let mut violations = Violations::new();
        if request.vehicles.is_empty() {
            violations.add("vehicles", "length", "vehicles must not be empty");
        }

        let _guard = self.store.write_guard().await;
        let destinations = DestinationRepository::new(self.store.clone()).load().await?;

        for (index, item) in request.vehicles.iter().enumerate() {
            if let Err(errors) = item.validate() {
                for (field, list) in errors.field_errors() {
                    for error in list {
                        let detail = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| error.code.to_string());
                        violations.add(
                            "vehicles",
                            "item",
                            format!("vehicles[{}].{}: {}", index, field, detail),
                        );
                    }
                }
            }
            for destination_id in &item.destination_ids {
                if !destinations.iter().any(|d| d.id == *destination_id) {
                    violations.add(
                        "vehicles",
                        "reference",
                        format!(
                            "vehicles[{}].destination_ids: Destination with id '{}' does not exist",
                            index, destination_id
                        ),
                    );
                }
            }
        }
        violations.into_result()?;

        let existing = self.repository.load().await?;
        let mut seen: HashSet<String> = existing
            .iter()
            .filter_map(|v| v.license_plate.as_deref().map(normalize_license_plate))
            .collect();

        let mut batch = Vec::with_capacity(request.vehicles.len());
        for item in request.vehicles {
            let license_plate = item.license_plate.as_deref().map(normalize_license_plate);
            if let Some(plate) = &license_plate {
                if !seen.insert(plate.clone()) {
                    return Err(conflict_error("Vehicle", "license_plate", plate));
                }
            }
            batch.push(build_vehicle(item, license_plate));
        }

        let vehicles = self.repository.insert_many(batch).await?;
        tracing::info!("🚐 Alta masiva de {} vehículos", vehicles.len());

        let message = format!("{} vehicles created", vehicles.len());
        Ok(ApiResponse::success_with_message(vehicles, message))
    }

    /// El borrado definitivo desvincula los horarios del vehículo
    pub async fn delete(
        &self,
        id: u64,
        params: DeleteParams,
    ) -> Result<ApiResponse<DeleteOutcome>, AppError> {
        let _guard = self.store.write_guard().await;

        if params.is_hard() {
            let cascade = CascadeService::new(self.store.clone()).delete_vehicle(id).await?;
            return Ok(ApiResponse::success_with_message(
                DeleteOutcome::Hard { id, cascade },
                "Vehicle permanently deleted".to_string(),
            ));
        }

        let (vehicle, transition) = self.repository.soft_delete(id).await?;
        Ok(ApiResponse::success_with_message(
            DeleteOutcome::Soft {
                id,
                status: vehicle.meta.status,
                changed: transition == Transition::Applied,
            },
            "Vehicle deactivated".to_string(),
        ))
    }

    pub async fn reactivate(&self, id: u64) -> Result<ApiResponse<Vehicle>, AppError> {
        let _guard = self.store.write_guard().await;
        let vehicle = self.repository.reactivate(id).await?;
        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle reactivated".to_string(),
        ))
    }
}

fn check_destinations(destinations: &[Destination], ids: &[u64], violations: &mut Violations) {
    for id in ids {
        require_reference::<Destination>(destinations, *id, "destination_ids", violations);
    }
}

fn dedup(mut ids: Vec<u64>) -> Vec<u64> {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}

fn build_vehicle(request: CreateVehicleRequest, license_plate: Option<String>) -> Vehicle {
    Vehicle {
        id: 0,
        vehicle_type: request.vehicle_type.trim().to_string(),
        license_plate,
        capacity: request.capacity,
        destination_ids: dedup(request.destination_ids),
        meta: RecordMeta::new(),
    }
}
