use std::sync::Arc;

use validator::Validate;

use crate::database::JsonStore;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::customer_dto::{
    CreateCustomerRequest, CustomerBookingsResponse, CustomerListQuery, UpdateCustomerRequest,
};
use crate::models::{Customer, RecordMeta};
use crate::repositories::{BookingRepository, CustomerRepository};
use crate::services::cascade::{CascadeReport, CascadeService};
use crate::services::lifecycle::Transition;
use crate::services::query::{self, FilterOperator, ListParams, ListQuery, Page, Sorting};
use crate::services::validator::ensure_unique;
use crate::utils::errors::AppError;

const SORTING: Sorting = Sorting::new(&["id", "name", "email", "created_at"]);

pub struct CustomerController {
    store: Arc<JsonStore>,
    repository: CustomerRepository,
}

impl CustomerController {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            repository: CustomerRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, params: CustomerListQuery) -> Result<Page<Customer>, AppError> {
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
        .filter_opt("email", "email", FilterOperator::Like, params.email);

        let customers = self.repository.load().await?;
        query::run(customers, &query)
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Customer, AppError> {
        self.repository.get(id).await
    }

    pub async fn create(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<ApiResponse<Customer>, AppError> {
        request.validate()?;

        let _guard = self.store.write_guard().await;
        let customers = self.repository.load().await?;

        let email = request.email.map(|e| e.trim().to_string());
        if let Some(email) = &email {
            ensure_unique(&customers, None, "email", email, |c| c.email.as_deref())?;
        }

        let customer = self
            .repository
            .insert(Customer {
                id: 0,
                name: request.name.trim().to_string(),
                email,
                phone: request.phone,
                meta: RecordMeta::new(),
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            customer,
            "Customer created successfully".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: u64,
        request: UpdateCustomerRequest,
    ) -> Result<ApiResponse<Customer>, AppError> {
        request.validate()?;

        let _guard = self.store.write_guard().await;
        let mut customer = self.repository.get(id).await?;

        if let Some(email) = request.email {
            let email = email.trim().to_string();
            let customers = self.repository.load().await?;
            ensure_unique(&customers, Some(id), "email", &email, |c| c.email.as_deref())?;
            customer.email = Some(email);
        }
        if let Some(name) = request.name {
            customer.name = name.trim().to_string();
        }
        if let Some(phone) = request.phone {
            customer.phone = Some(phone);
        }
        customer.meta.touch();

        let customer = self.repository.replace(customer).await?;
        Ok(ApiResponse::success_with_message(
            customer,
            "Customer updated successfully".to_string(),
        ))
    }

    pub async fn delete(
        &self,
        id: u64,
        params: DeleteParams,
    ) -> Result<ApiResponse<DeleteOutcome>, AppError> {
        if params.is_hard() {
            let cascade = self.cascade_delete(id).await?;
            return Ok(ApiResponse::success_with_message(
                DeleteOutcome::Hard { id, cascade },
                "Customer permanently deleted".to_string(),
            ));
        }

        let _guard = self.store.write_guard().await;
        let (customer, transition) = self.repository.soft_delete(id).await?;
        Ok(ApiResponse::success_with_message(
            DeleteOutcome::Soft {
                id,
                status: customer.meta.status,
                changed: transition == Transition::Applied,
            },
            "Customer deactivated".to_string(),
        ))
    }

    pub async fn reactivate(&self, id: u64) -> Result<ApiResponse<Customer>, AppError> {
        let _guard = self.store.write_guard().await;
        let customer = self.repository.reactivate(id).await?;
        Ok(ApiResponse::success_with_message(
            customer,
            "Customer reactivated".to_string(),
        ))
    }

    /// Borrado definitivo del cliente con sus reservas, pagos y feedback
    pub async fn cascade_delete(&self, id: u64) -> Result<CascadeReport, AppError> {
        let _guard = self.store.write_guard().await;
        CascadeService::new(self.store.clone()).delete_customer(id).await
    }

    pub async fn bookings(&self, id: u64) -> Result<CustomerBookingsResponse, AppError> {
        let customer = self.repository.get(id).await?;
        let bookings = BookingRepository::new(self.store.clone())
            .find_by_customer(id)
            .await?;

        Ok(CustomerBookingsResponse {
            total_bookings: bookings.len(),
            customer,
            bookings,
        })
    }
}
