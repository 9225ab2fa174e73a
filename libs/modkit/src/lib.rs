//! # ModKit
//!
//! Shared building blocks for REST modules:
//!
//! - **Problem Details**: RFC 9457 error bodies rendered as `application/problem+json`
//! - **Pagination**: offset/limit normalization and the `Page` envelope
//! - **Request id**: the per-request id extension shared by the host and handlers
//! - **Shutdown**: OS signal handling for graceful stop

pub use anyhow::Result;

pub mod api;
pub mod runtime;

pub use api::pagination::{Page, PageParams, PaginationError, PaginationPolicy};
pub use api::problem::{not_found, Problem, ProblemResponse, ValidationError};
pub use api::request_id::XRequestId;
