//! Offset/limit pagination.
//!
//! Handlers accept raw `offset`/`limit` query values and normalize them through a
//! `PaginationPolicy` before they reach the domain. The resulting `Page<T>` echoes
//! the effective window next to the total row count.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("offset must be >= 0, got {0}")]
    NegativeOffset(i64),
    #[error("limit must be >= 1, got {0}")]
    InvalidLimit(i64),
}

/// Defaults and upper bound for page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Effective offset/limit after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub offset: u64,
    pub limit: u64,
}

impl PaginationPolicy {
    /// Apply defaults and clamp the limit to `max_limit`.
    ///
    /// Missing values take defaults (offset 0, `default_limit`). Negative offsets and
    /// non-positive limits are rejected rather than silently fixed.
    pub fn normalize(
        &self,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<PageParams, PaginationError> {
        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => return Err(PaginationError::NegativeOffset(o)),
            Some(o) => o as u64,
        };
        let limit = match limit {
            None => self.default_limit,
            Some(l) if l < 1 => return Err(PaginationError::InvalidLimit(l)),
            Some(l) => l as u64,
        };
        Ok(PageParams {
            offset,
            limit: limit.min(self.max_limit.max(1)),
        })
    }
}

/// One page of items with the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, params: PageParams) -> Self {
        Self {
            items,
            total,
            offset: params.offset,
            limit: params.limit,
        }
    }

    /// Convert items while keeping the page window.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }

    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as u64) < self.total
    }
}
