use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use modkit::api::problem::{Problem, ValidationError};
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

pub const API_PREFIX: &str = "/api/v1";

/// OpenAPI document for the subscriptions REST surface.
#[derive(OpenApi)]
#[openapi(
    info(title = "Subscriptions API", description = "Manage user subscriptions"),
    paths(
        handlers::create_subscription,
        handlers::update_subscription,
        handlers::get_subscription,
        handlers::delete_subscription,
        handlers::list_subscriptions,
        handlers::total_price,
    ),
    components(schemas(
        dto::SubscriptionDto,
        dto::CreateSubscriptionReq,
        dto::UpdateSubscriptionReq,
        dto::SubscriptionListDto,
        dto::TotalDto,
        Problem,
        ValidationError,
    )),
    tags((name = "subscriptions", description = "Subscription records"))
)]
pub struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let api = Router::new()
        .route(
            "/subscription",
            post(handlers::create_subscription).patch(handlers::update_subscription),
        )
        .route(
            "/subscription/{id}",
            get(handlers::get_subscription).delete(handlers::delete_subscription),
        )
        .route("/subscriptions", get(handlers::list_subscriptions))
        .route("/subscriptions/total", get(handlers::total_price));

    Ok(router
        .nest(API_PREFIX, api)
        .layer(Extension(service)))
}
