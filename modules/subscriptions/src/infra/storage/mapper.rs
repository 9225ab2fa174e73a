use crate::contract::model::Subscription;
use crate::infra::storage::entity::SubscriptionRow;

/// Convert a database row to the contract model.
impl From<SubscriptionRow> for Subscription {
    fn from(r: SubscriptionRow) -> Self {
        Self {
            id: r.id,
            service_name: r.service_name,
            price: r.price,
            user_id: r.user_id,
            start_date: r.start_date,
            end_date: r.end_date,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
