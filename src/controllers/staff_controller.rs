use std::collections::BTreeMap;
use std::sync::Arc;

use validator::Validate;

use crate::database::JsonStore;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::staff_dto::{
    CreateStaffRequest, RoleSummary, StaffListQuery, StaffSummary, UpdateStaffRequest,
};
use crate::models::{Destination, RecordMeta, Staff};
use crate::repositories::{DestinationRepository, StaffRepository};
use crate::services::cascade::CascadeService;
use crate::services::lifecycle::Transition;
use crate::services::query::{self, FilterOperator, ListParams, ListQuery, Page, Sorting};
use crate::services::validator::{
    check_staff_assignment, ensure_unique, require_reference, Violations,
};
use crate::utils::errors::AppError;

const SORTING: Sorting = Sorting::new(&["id", "name", "role", "contact_email", "created_at"]);

pub struct StaffController {
    store: Arc<JsonStore>,
    repository: StaffRepository,
}

impl StaffController {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            repository: StaffRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, params: StaffListQuery) -> Result<Page<Staff>, AppError> {
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
        .filter_opt("name", "name", FilterOperator::Like, params.name)
        .filter_opt("role", "role", FilterOperator::Like, params.role)
        .filter_opt(
            "destination_id",
            "destination_ids",
            FilterOperator::Contains,
            params.destination_id,
        );

        let staff = self.repository.load().await?;
        query::run(staff, &query)
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Staff, AppError> {
        self.repository.get(id).await
    }

    pub async fn create(&self, request: CreateStaffRequest) -> Result<ApiResponse<Staff>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let destinations = DestinationRepository::new(self.store.clone()).load().await?;
        for destination_id in &request.destination_ids {
            require_reference::<Destination>(&destinations, *destination_id, "destination_ids", &mut violations);
        }
        check_staff_assignment(&request.role, &request.destination_ids, &mut violations);
        violations.into_result()?;

        let contact_email = request.contact_email.trim().to_string();
        let staff = self.repository.load().await?;
        ensure_unique(&staff, None, "contact_email", &contact_email, |s| {
            Some(s.contact_email.as_str())
        })?;

        let member = self
            .repository
            .insert(Staff {
                id: 0,
                name: request.name.trim().to_string(),
                role: request.role.trim().to_string(),
                contact_email,
                destination_ids: request.destination_ids,
                meta: RecordMeta::new(),
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            member,
            "Staff member created successfully".to_string(),
        ))
    }

    /// La regla de guía se comprueba sobre el resultado final (rol y destinos)
    pub async fn update(
        &self,
        id: u64,
        request: UpdateStaffRequest,
    ) -> Result<ApiResponse<Staff>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let mut member = self.repository.get(id).await?;

        if let Some(destination_ids) = request.destination_ids {
            let destinations = DestinationRepository::new(self.store.clone()).load().await?;
            for destination_id in &destination_ids {
                require_reference::<Destination>(&destinations, *destination_id, "destination_ids", &mut violations);
            }
            member.destination_ids = destination_ids;
        }
        if let Some(role) = request.role {
            member.role = role.trim().to_string();
        }
        check_staff_assignment(&member.role, &member.destination_ids, &mut violations);
        violations.into_result()?;

        if let Some(contact_email) = request.contact_email {
            let contact_email = contact_email.trim().to_string();
            let staff = self.repository.load().await?;
            ensure_unique(&staff, Some(id), "contact_email", &contact_email, |s| {
                Some(s.contact_email.as_str())
            })?;
            member.contact_email = contact_email;
        }
        if let Some(name) = request.name {
            member.name = name.trim().to_string();
        }
        member.meta.touch();

        let member = self.repository.replace(member).await?;
        Ok(ApiResponse::success_with_message(
            member,
            "Staff member updated successfully".to_string(),
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
                .delete_leaf::<Staff>(id)
                .await?;
            return Ok(ApiResponse::success_with_message(
                DeleteOutcome::Hard { id, cascade },
                "Staff member permanently deleted".to_string(),
            ));
        }

        let (member, transition) = self.repository.soft_delete(id).await?;
        Ok(ApiResponse::success_with_message(
            DeleteOutcome::Soft {
                id,
                status: member.meta.status,
                changed: transition == Transition::Applied,
            },
            "Staff member deactivated".to_string(),
        ))
    }

    pub async fn reactivate(&self, id: u64) -> Result<ApiResponse<Staff>, AppError> {
        let _guard = self.store.write_guard().await;
        let member = self.repository.reactivate(id).await?;
        Ok(ApiResponse::success_with_message(
            member,
            "Staff member reactivated".to_string(),
        ))
    }

    pub async fn summary(&self) -> Result<StaffSummary, AppError> {
        let staff = self.repository.load().await?;
        Ok(summarize(&staff))
    }

    /// Personal activo asignado a un destino existente
    pub async fn assigned_to(&self, destination_id: u64) -> Result<Vec<Staff>, AppError> {
        DestinationRepository::new(self.store.clone())
            .get(destination_id)
            .await?;
        self.repository.find_assigned_to(destination_id).await
    }
}

fn summarize(staff: &[Staff]) -> StaffSummary {
    let mut by_role: BTreeMap<String, RoleSummary> = BTreeMap::new();
    let mut by_destination: BTreeMap<u64, usize> = BTreeMap::new();

    for member in staff {
        let entry = by_role.entry(member.role.to_lowercase()).or_default();
        entry.total += 1;
        if member.meta.is_active() {
            entry.active += 1;
            for destination_id in &member.destination_ids {
                *by_destination.entry(*destination_id).or_default() += 1;
            }
        } else {
            entry.inactive += 1;
        }
    }

    StaffSummary {
        total_staff: staff.len(),
        by_role,
        by_destination,
    }
}
