//! Postgres-backed repository implementation for the domain port.
//!
//! Holds a cloneable `PgPool`; every call checks out its own connection.

use anyhow::Context;
use async_trait::async_trait;
use db::UpdateStatement;
use sqlx::PgPool;
use uuid::Uuid;

use crate::contract::model::{NewSubscription, Subscription, TotalFilter};
use crate::domain::repo::SubscriptionsRepository;
use crate::infra::storage::entity::SubscriptionRow;

const SELECT_BY_ID: &str = "SELECT id, service_name, price, user_id, start_date, end_date, \
     created_at, updated_at FROM public.subscriptions WHERE id = $1";

const SELECT_PAGE: &str = "SELECT id, service_name, price, user_id, start_date, end_date, \
     created_at, updated_at FROM public.subscriptions \
     ORDER BY created_at DESC, id OFFSET $1 LIMIT $2";

const COUNT_ALL: &str = "SELECT COUNT(*) FROM public.subscriptions";

const INSERT: &str = "INSERT INTO public.subscriptions \
     (service_name, price, user_id, start_date, end_date) VALUES ($1, $2, $3, $4, $5) \
     RETURNING id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

const DELETE_BY_ID: &str = "DELETE FROM public.subscriptions WHERE id = $1";

const SUM_PRICE: &str = "SELECT COALESCE(SUM(price), 0)::BIGINT FROM public.subscriptions \
     WHERE start_date >= $1 AND start_date <= $2 \
     AND ($3::uuid IS NULL OR user_id = $3) \
     AND ($4::text IS NULL OR service_name = $4)";

/// sqlx repository impl.
#[derive(Clone)]
pub struct PgSubscriptionsRepository {
    pool: PgPool,
}

impl PgSubscriptionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_i64(v: u64, what: &str) -> anyhow::Result<i64> {
    i64::try_from(v).with_context(|| format!("{what} out of range: {v}"))
}

#[async_trait]
impl SubscriptionsRepository for PgSubscriptionsRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Subscription>> {
        let found = sqlx::query_as::<_, SubscriptionRow>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_all(
        &self,
        offset: u64,
        limit: u64,
    ) -> anyhow::Result<(Vec<Subscription>, u64)> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(SELECT_PAGE)
            .bind(to_i64(offset, "offset")?)
            .bind(to_i64(limit, "limit")?)
            .fetch_all(&self.pool)
            .await
            .context("find_all failed")?;

        let total: i64 = sqlx::query_scalar(COUNT_ALL)
            .fetch_one(&self.pool)
            .await
            .context("count failed")?;

        Ok((
            rows.into_iter().map(Into::into).collect(),
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn create(&self, new: NewSubscription) -> anyhow::Result<Subscription> {
        let row = sqlx::query_as::<_, SubscriptionRow>(INSERT)
            .bind(new.service_name)
            .bind(new.price)
            .bind(new.user_id)
            .bind(new.start_date)
            .bind(new.end_date)
            .fetch_one(&self.pool)
            .await
            .context("insert failed")?;
        Ok(row.into())
    }

    async fn update(&self, stmt: UpdateStatement) -> anyhow::Result<bool> {
        let res = stmt
            .to_query()
            .execute(&self.pool)
            .await
            .context("update failed")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(DELETE_BY_ID)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected() > 0)
    }

    async fn sum_price(&self, filter: &TotalFilter) -> anyhow::Result<i64> {
        let total: i64 = sqlx::query_scalar(SUM_PRICE)
            .bind(filter.start)
            .bind(filter.end)
            .bind(filter.user_id)
            .bind(filter.service_name.as_deref())
            .fetch_one(&self.pool)
            .await
            .context("sum_price failed")?;
        Ok(total)
    }
}
