use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::{DomainError, GENERIC_FAILURE};

pub const CODE_VALIDATION: &str = "SUBSCRIPTIONS_VALIDATION";
pub const CODE_NOT_FOUND: &str = "SUBSCRIPTIONS_NOT_FOUND";
pub const CODE_EMPTY_UPDATE: &str = "SUBSCRIPTIONS_EMPTY_UPDATE";
pub const CODE_PARSE: &str = "SUBSCRIPTIONS_PARSE";
pub const CODE_INVALID_ID: &str = "SUBSCRIPTIONS_INVALID_ID";
pub const CODE_INTERNAL: &str = "INTERNAL";

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// JSON pointer of the field a validation message is about, if it names one.
///
/// Field checks are prefixed `[field] - ...`; date format messages read
/// `Invalid <field> format...`.
fn pointer_for(message: &str) -> String {
    if let Some(rest) = message.strip_prefix('[') {
        if let Some((field, _)) = rest.split_once(']') {
            return format!("/{field}");
        }
    }
    if let Some(rest) = message.strip_prefix("Invalid ") {
        if let Some((field, _)) = rest.split_once(" format") {
            return format!("/{field}");
        }
    }
    String::new()
}

/// 400 for a body that is not valid JSON for the endpoint.
pub fn parse_error(detail: impl std::fmt::Display, instance: &str) -> ProblemResponse {
    tracing::warn!(error = %detail, "Failed to parse request");
    from_parts(
        StatusCode::BAD_REQUEST,
        CODE_PARSE,
        "Bad Request",
        "Cant parse data, please check provided data",
        instance,
    )
}

/// 400 for a path id that is not a UUID.
pub fn invalid_id(raw: &str, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        CODE_INVALID_ID,
        "Bad Request",
        format!("Cannot parse provided id. Expected correct uuid. Got: {raw}"),
        instance,
    )
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { errors } => {
            tracing::warn!(error = %e, "Validation failed");
            let mut resp = from_parts(
                StatusCode::BAD_REQUEST,
                CODE_VALIDATION,
                "Validation error",
                e.to_string(),
                instance,
            );
            resp.0 = resp.0.with_errors(
                errors
                    .iter()
                    .map(|detail| ValidationError {
                        pointer: pointer_for(detail),
                        detail: detail.clone(),
                    })
                    .collect(),
            );
            resp
        }
        DomainError::NotFound { id } => {
            tracing::info!(subscription_id = %id, "Subscription not found");
            from_parts(
                StatusCode::NOT_FOUND,
                CODE_NOT_FOUND,
                "Subscription not found",
                "Nothing found, please check the provided id",
                instance,
            )
        }
        DomainError::EmptyUpdate { id } => {
            tracing::warn!(subscription_id = %id, "Empty update rejected");
            from_parts(
                StatusCode::BAD_REQUEST,
                CODE_EMPTY_UPDATE,
                "Nothing to update",
                "Provide at least one field to update",
                instance,
            )
        }
        DomainError::Mapping { .. } | DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Internal error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                CODE_INTERNAL,
                "Internal error",
                GENERIC_FAILURE,
                instance,
            )
        }
    }
}
