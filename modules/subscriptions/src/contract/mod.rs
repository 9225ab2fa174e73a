pub mod model;

pub use model::{NewSubscription, Subscription, SubscriptionPatch, TotalFilter};
