use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use modkit::api::problem::{Problem, ProblemResponse};
use modkit::XRequestId;
use tracing::info;
use uuid::Uuid;

use crate::api::rest::dto::{
    CreateSubscriptionReq, ListSubscriptionsQuery, SubscriptionDto, SubscriptionListDto,
    TotalDto, TotalQuery, UpdateSubscriptionReq,
};
use crate::api::rest::error::{invalid_id, map_domain_error, parse_error};
use crate::api::rest::mapper;
use crate::domain::service::Service;

type RequestId = Option<Extension<XRequestId>>;

fn request_id(id: &RequestId) -> Option<&str> {
    id.as_ref().map(|Extension(id)| id.as_str())
}

fn parse_path_id(raw: &str, uri: &Uri) -> Result<Uuid, ProblemResponse> {
    Uuid::parse_str(raw).map_err(|_| invalid_id(raw, uri.path()))
}

/// Create a new subscription
#[utoipa::path(
    post,
    path = "/api/v1/subscription",
    tag = "subscriptions",
    operation_id = "subscriptions.create_subscription",
    request_body = CreateSubscriptionReq,
    responses(
        (status = 201, description = "Created subscription", body = SubscriptionDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_subscription(
    Extension(svc): Extension<Arc<Service>>,
    req_id: RequestId,
    uri: Uri,
    body: Result<Json<CreateSubscriptionReq>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscriptionDto>), ProblemResponse> {
    let rid = request_id(&req_id);
    let Json(req) = body.map_err(|e| parse_error(e, uri.path()).with_request_id(rid))?;
    info!("Creating subscription: {:?}", req);

    let result = match mapper::to_new_subscription(&req) {
        Ok(new) => svc.create_subscription(new).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(created) => Ok((StatusCode::CREATED, Json(SubscriptionDto::from(created)))),
        Err(e) => Err(map_domain_error(&e, uri.path()).with_request_id(rid)),
    }
}

/// Update a subscription with partial data
#[utoipa::path(
    patch,
    path = "/api/v1/subscription",
    tag = "subscriptions",
    operation_id = "subscriptions.update_subscription",
    request_body = UpdateSubscriptionReq,
    responses(
        (status = 200, description = "Updated subscription", body = SubscriptionDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_subscription(
    Extension(svc): Extension<Arc<Service>>,
    req_id: RequestId,
    uri: Uri,
    body: Result<Json<UpdateSubscriptionReq>, JsonRejection>,
) -> Result<Json<SubscriptionDto>, ProblemResponse> {
    let rid = request_id(&req_id);
    let Json(req) = body.map_err(|e| parse_error(e, uri.path()).with_request_id(rid))?;
    info!("Updating subscription {}", req.id);

    let result = match mapper::to_patch(&req) {
        Ok(patch) => svc.update_subscription(patch).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(updated) => Ok(Json(SubscriptionDto::from(updated))),
        Err(e) => Err(map_domain_error(&e, uri.path()).with_request_id(rid)),
    }
}

/// Get a specific subscription by ID
#[utoipa::path(
    get,
    path = "/api/v1/subscription/{id}",
    tag = "subscriptions",
    operation_id = "subscriptions.get_subscription",
    params(("id" = String, Path, description = "Subscription UUID")),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_subscription(
    Extension(svc): Extension<Arc<Service>>,
    req_id: RequestId,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<Json<SubscriptionDto>, ProblemResponse> {
    let rid = request_id(&req_id);
    let id = parse_path_id(&raw_id, &uri).map_err(|p| p.with_request_id(rid))?;
    info!("Getting subscription with id: {}", id);

    match svc.get_subscription(id).await {
        Ok(found) => Ok(Json(SubscriptionDto::from(found))),
        Err(e) => Err(map_domain_error(&e, uri.path()).with_request_id(rid)),
    }
}

/// Delete a subscription by ID
#[utoipa::path(
    delete,
    path = "/api/v1/subscription/{id}",
    tag = "subscriptions",
    operation_id = "subscriptions.delete_subscription",
    params(("id" = String, Path, description = "Subscription UUID")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_subscription(
    Extension(svc): Extension<Arc<Service>>,
    req_id: RequestId,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    let rid = request_id(&req_id);
    let id = parse_path_id(&raw_id, &uri).map_err(|p| p.with_request_id(rid))?;
    info!("Deleting subscription: {}", id);

    match svc.delete_subscription(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path()).with_request_id(rid)),
    }
}

/// List subscriptions, newest first
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    operation_id = "subscriptions.list_subscriptions",
    params(ListSubscriptionsQuery),
    responses(
        (status = 200, description = "One page of subscriptions", body = SubscriptionListDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_subscriptions(
    Extension(svc): Extension<Arc<Service>>,
    req_id: RequestId,
    query: Result<Query<ListSubscriptionsQuery>, QueryRejection>,
    uri: Uri,
) -> Result<Json<SubscriptionListDto>, ProblemResponse> {
    let rid = request_id(&req_id);
    let Query(query) = query.map_err(|e| parse_error(e, uri.path()).with_request_id(rid))?;
    info!("Listing subscriptions with query: {:?}", query);

    match svc.list_subscriptions(query.offset, query.limit).await {
        Ok(page) => Ok(Json(SubscriptionListDto::from(page))),
        Err(e) => Err(map_domain_error(&e, uri.path()).with_request_id(rid)),
    }
}

/// Sum of prices over a period
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/total",
    tag = "subscriptions",
    operation_id = "subscriptions.total_price",
    params(TotalQuery),
    responses(
        (status = 200, description = "Total price", body = TotalDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn total_price(
    Extension(svc): Extension<Arc<Service>>,
    req_id: RequestId,
    query: Result<Query<TotalQuery>, QueryRejection>,
    uri: Uri,
) -> Result<Json<TotalDto>, ProblemResponse> {
    let rid = request_id(&req_id);
    let Query(query) = query.map_err(|e| parse_error(e, uri.path()).with_request_id(rid))?;
    info!("Computing total price with query: {:?}", query);

    let result = match mapper::to_total_filter(&query) {
        Ok(filter) => svc.total_price(filter).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(total) => Ok(Json(TotalDto { total })),
        Err(e) => Err(map_domain_error(&e, uri.path()).with_request_id(rid)),
    }
}
