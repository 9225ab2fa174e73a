use chrono::{DateTime, Utc};
use modkit::Page;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::Subscription;
use crate::domain::month_year::format_month_year;

/// REST DTO for subscription representation with serde/utoipa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionDto {
    pub id: Uuid,
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    pub user_id: Uuid,
    /// Month the subscription starts, `MM-YYYY`.
    #[schema(example = "01-2025")]
    pub start_date: String,
    /// Month the subscription ends, `MM-YYYY`. Omitted when open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a new subscription.
///
/// Missing fields deserialize to empty values so they are reported by
/// validation alongside every other problem in the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateSubscriptionReq {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i64,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(example = "01-2025")]
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

/// REST DTO for updating a subscription (partial).
///
/// Absent fields are left unchanged. `end_date: null` clears the end date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubscriptionReq {
    #[serde(default)]
    #[schema(example = "123e4567-e89b-12d3-a456-426614174000")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "01-2025")]
    pub start_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, nullable, example = "12-2025")]
    pub end_date: Option<Option<String>>,
}

/// Keep an explicit `null` apart from a missing field.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// REST DTO for subscription list response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionListDto {
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
    pub subscriptions: Vec<SubscriptionDto>,
}

/// REST DTO for the price aggregate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TotalDto {
    #[schema(example = 1200)]
    pub total: i64,
}

/// Query parameters for listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSubscriptionsQuery {
    /// Rows to skip (default 0)
    pub offset: Option<i64>,
    /// Page size (default 10)
    pub limit: Option<i64>,
}

/// Query parameters for the price aggregate
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalQuery {
    /// First month of the period, `MM-YYYY`
    #[param(example = "01-2025")]
    pub start: Option<String>,
    /// Last month of the period, `MM-YYYY`
    #[param(example = "12-2025")]
    pub end: Option<String>,
    /// Only count this user's subscriptions
    pub user_id: Option<String>,
    /// Only count this service
    pub service_name: Option<String>,
}

// Conversion implementations between REST DTOs and contract models

impl From<Subscription> for SubscriptionDto {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            price: s.price,
            user_id: s.user_id,
            start_date: format_month_year(s.start_date),
            end_date: s.end_date.map(format_month_year),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<Page<Subscription>> for SubscriptionListDto {
    fn from(page: Page<Subscription>) -> Self {
        let page = page.map(SubscriptionDto::from);
        Self {
            total: page.total,
            offset: page.offset,
            limit: page.limit,
            subscriptions: page.items,
        }
    }
}
