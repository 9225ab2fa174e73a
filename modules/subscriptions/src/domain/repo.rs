use async_trait::async_trait;
use db::UpdateStatement;
use uuid::Uuid;

use crate::contract::model::{NewSubscription, Subscription, TotalFilter};

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait SubscriptionsRepository: Send + Sync {
    /// Load a subscription by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Subscription>>;
    /// One window of subscriptions, newest first, plus the total row count.
    async fn find_all(&self, offset: u64, limit: u64)
        -> anyhow::Result<(Vec<Subscription>, u64)>;
    /// Insert and return the stored row with database-assigned id and timestamps.
    async fn create(&self, new: NewSubscription) -> anyhow::Result<Subscription>;
    /// Execute a rendered partial update. Returns true if a row was updated.
    async fn update(&self, stmt: UpdateStatement) -> anyhow::Result<bool>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Sum of `price` over rows matching the filter. Zero rows sum to 0.
    async fn sum_price(&self, filter: &TotalFilter) -> anyhow::Result<i64>;
}
