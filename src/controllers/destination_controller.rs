use std::sync::Arc;

use validator::Validate;

use crate::database::JsonStore;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::destination_dto::{
    CreateDestinationRequest, DestinationListQuery, UpdateDestinationRequest,
};
use crate::models::{Destination, RecordMeta};
use crate::repositories::DestinationRepository;
use crate::services::cascade::CascadeService;
use crate::services::lifecycle::Transition;
use crate::services::query::{self, FilterOperator, ListParams, ListQuery, Page, Sorting};
use crate::services::validator::{ensure_unique, round_cents};
use crate::utils::errors::AppError;

const SORTING: Sorting = Sorting::new(&["id", "name", "country", "price", "created_at"]);

pub struct DestinationController {
    store: Arc<JsonStore>,
    repository: DestinationRepository,
}

impl DestinationController {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            repository: DestinationRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, params: DestinationListQuery) -> Result<Page<Destination>, AppError> {
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
        .filter_opt("country", "country", FilterOperator::Eq, params.country)
        .filter_opt("min_price", "price", FilterOperator::Gte, params.min_price)
        .filter_opt("max_price", "price", FilterOperator::Lte, params.max_price);

        let destinations = self.repository.load().await?;
        query::run(destinations, &query)
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Destination, AppError> {
        self.repository.get(id).await
    }

    pub async fn create(
        &self,
        request: CreateDestinationRequest,
    ) -> Result<ApiResponse<Destination>, AppError> {
        request.validate()?;

        let _guard = self.store.write_guard().await;
        let destinations = self.repository.load().await?;
        let name = request.name.trim().to_string();
        ensure_unique(&destinations, None, "name", &name, |d| Some(d.name.as_str()))?;

        let destination = self
            .repository
            .insert(Destination {
                id: 0,
                name,
                country: request.country.trim().to_string(),
                description: request.description,
                price: round_cents(request.price),
                meta: RecordMeta::new(),
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            destination,
            "Destination created successfully".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: u64,
        request: UpdateDestinationRequest,
    ) -> Result<ApiResponse<Destination>, AppError> {
        request.validate()?;

        let _guard = self.store.write_guard().await;
        let mut destination = self.repository.get(id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            let destinations = self.repository.load().await?;
            ensure_unique(&destinations, Some(id), "name", &name, |d| Some(d.name.as_str()))?;
            destination.name = name;
        }
        if let Some(country) = request.country {
            destination.country = country.trim().to_string();
        }
        if let Some(description) = request.description {
            destination.description = Some(description);
        }
        if let Some(price) = request.price {
            destination.price = round_cents(price);
        }
        destination.meta.touch();

        let destination = self.repository.replace(destination).await?;
        Ok(ApiResponse::success_with_message(
            destination,
            "Destination updated successfully".to_string(),
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
                .delete_destination(id)
                .await?;
            return Ok(ApiResponse::success_with_message(
                DeleteOutcome::Hard { id, cascade },
                "Destination permanently deleted".to_string(),
            ));
        }

        let (destination, transition) = self.repository.soft_delete(id).await?;
        Ok(ApiResponse::success_with_message(
            DeleteOutcome::Soft {
                id,
                status: destination.meta.status,
                changed: transition == Transition::Applied,
            },
            "Destination deactivated".to_string(),
        ))
    }

    pub async fn reactivate(&self, id: u64) -> Result<ApiResponse<Destination>, AppError> {
        let _guard = self.store.write_guard().await;
        let destination = self.repository.reactivate(id).await?;
        Ok(ApiResponse::success_with_message(
            destination,
            "Destination reactivated".to_string(),
        ))
    }
}
