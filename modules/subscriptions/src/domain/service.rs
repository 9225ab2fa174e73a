use std::sync::Arc;

use db::{UpdateQuery, UpdateStatement};
use modkit::{Page, PaginationPolicy};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{NewSubscription, Subscription, SubscriptionPatch, TotalFilter};
use crate::domain::error::DomainError;
use crate::domain::month_year::format_month_year;
use crate::domain::repo::SubscriptionsRepository;

/// Fully qualified table written by partial updates.
pub const SUBSCRIPTIONS_TABLE: &str = "public.subscriptions";

/// Domain service with the business rules for subscriptions.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn SubscriptionsRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl ServiceConfig {
    fn pagination(&self) -> PaginationPolicy {
        PaginationPolicy {
            default_limit: self.default_page_size,
            max_limit: self.max_page_size,
        }
    }
}

/// Render the partial update for `patch`, or `None` when it sets nothing.
///
/// Columns are declared in a fixed order so identical patches always produce
/// identical SQL.
pub fn build_update(patch: &SubscriptionPatch) -> Option<UpdateStatement> {
    UpdateQuery::new()
        .set("user_id", patch.user_id)
        .set("price", patch.price)
        .set("service_name", patch.service_name.clone())
        .set("start_date", patch.start_date)
        .set("end_date", patch.end_date)
        .build(SUBSCRIPTIONS_TABLE, "id", patch.id)
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn SubscriptionsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(
        name = "subscriptions.service.create_subscription",
        skip(self, new),
        fields(user_id = %new.user_id, service_name = %new.service_name)
    )]
    pub async fn create_subscription(
        &self,
        new: NewSubscription,
    ) -> Result<Subscription, DomainError> {
        info!("Creating subscription");

        let created = self
            .repo
            .create(new)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created subscription with id={}", created.id);
        Ok(created)
    }

    #[instrument(
        name = "subscriptions.service.get_subscription",
        skip(self),
        fields(subscription_id = %id)
    )]
    pub async fn get_subscription(&self, id: Uuid) -> Result<Subscription, DomainError> {
        debug!("Getting subscription by id");

        let found = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::not_found(id))?;

        debug!("Successfully retrieved subscription");
        Ok(found)
    }

    /// List subscriptions newest first.
    ///
    /// Missing `offset`/`limit` take defaults; the limit is clamped to the
    /// configured maximum.
    #[instrument(
        name = "subscriptions.service.list_subscriptions",
        skip(self),
        fields(offset = ?offset, limit = ?limit)
    )]
    pub async fn list_subscriptions(
        &self,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<Subscription>, DomainError> {
        let params = self
            .config
            .pagination()
            .normalize(offset, limit)
            .map_err(|e| DomainError::validation(vec![e.to_string()]))?;

        let (items, total) = self
            .repo
            .find_all(params.offset, params.limit)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!(
            "Listed {} of {} subscriptions (offset={}, limit={})",
            items.len(),
            total,
            params.offset,
            params.limit
        );
        Ok(Page::new(items, total, params))
    }

    /// Apply a partial update and return the row as stored afterwards.
    #[instrument(
        name = "subscriptions.service.update_subscription",
        skip(self, patch),
        fields(subscription_id = %patch.id)
    )]
    pub async fn update_subscription(
        &self,
        patch: SubscriptionPatch,
    ) -> Result<Subscription, DomainError> {
        info!("Updating subscription");

        let Some(stmt) = build_update(&patch) else {
            warn!("Update request sets no fields");
            return Err(DomainError::empty_update(patch.id));
        };
        self.check_date_order(&patch).await?;
        debug!(
            assignments = stmt.assignments(),
            clears = stmt.clears_any(),
            "Rendered update statement"
        );

        let updated = self
            .repo
            .update(stmt)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !updated {
            info!("No subscription matched the update");
            return Err(DomainError::not_found(patch.id));
        }

        let current = self
            .repo
            .find_by_id(patch.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::not_found(patch.id))?;

        info!("Successfully updated subscription");
        Ok(current)
    }

    /// Keep `end_date >= start_date` after the patch is applied.
    ///
    /// A date the patch leaves untouched is read from the stored row.
    async fn check_date_order(&self, patch: &SubscriptionPatch) -> Result<(), DomainError> {
        let (start, end) = match (patch.start_date, patch.end_date) {
            (_, Some(None)) | (None, None) => return Ok(()),
            (Some(start), Some(Some(end))) => (start, end),
            (Some(start), None) => match self.stored(patch.id).await?.end_date {
                Some(end) => (start, end),
                None => return Ok(()),
            },
            (None, Some(Some(end))) => (self.stored(patch.id).await?.start_date, end),
        };

        if end < start {
            warn!(%start, %end, "Update would put end_date before start_date");
            return Err(DomainError::validation(vec![format!(
                "end_date must be after start_date. Got: end_date={}, start_date={}",
                format_month_year(end),
                format_month_year(start)
            )]));
        }
        Ok(())
    }

    async fn stored(&self, id: Uuid) -> Result<Subscription, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::not_found(id))
    }

    #[instrument(
        name = "subscriptions.service.delete_subscription",
        skip(self),
        fields(subscription_id = %id)
    )]
    pub async fn delete_subscription(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting subscription");

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if !deleted {
            return Err(DomainError::not_found(id));
        }

        info!("Successfully deleted subscription");
        Ok(())
    }

    #[instrument(
        name = "subscriptions.service.total_price",
        skip(self, filter),
        fields(start = %filter.start, end = %filter.end)
    )]
    pub async fn total_price(&self, filter: TotalFilter) -> Result<i64, DomainError> {
        let total = self
            .repo
            .sum_price(&filter)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!(total, "Computed subscription price total");
        Ok(total)
    }
}
