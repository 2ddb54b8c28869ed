//! Offset pagination for listing queries.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};

/// Default number of records per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Requested window of a listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

#[derive(Deserialize)]
struct RawPageRequest {
    #[serde(default = "default_page_limit")]
    limit: u32,
    #[serde(default)]
    offset: u64,
}

const fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = ToolRegistryDomainError;

    fn try_from(raw: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(raw.limit, raw.offset)
    }
}

impl PageRequest {
    /// Creates a page request.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::ZeroPageLimit`] when `limit` is zero.
    pub const fn new(limit: u32, offset: u64) -> Result<Self, ToolRegistryDomainError> {
        if limit == 0 {
            return Err(ToolRegistryDomainError::ZeroPageLimit);
        }
        Ok(Self { limit, offset })
    }

    /// Returns the maximum number of records.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Returns the number of records skipped.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }

    /// Returns the request for the following page.
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(u64::from(self.limit)),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// One page of records plus the total number of matching records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records in this page.
    pub items: Vec<T>,
    /// Total number of records across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }
}
