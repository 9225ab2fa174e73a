use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A stored subscription record.
///
/// `start_date` and `end_date` are pinned to the first day of their month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a subscription. Id and timestamps come from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Partial update. `None` leaves a column unchanged.
///
/// `end_date` is tri-state: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub id: Uuid,
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
}

impl SubscriptionPatch {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.service_name.is_none()
            && self.price.is_none()
            && self.user_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Inputs of the price aggregate: subscriptions whose start month is in
/// `start..=end`, optionally narrowed to one user and one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}
