//! Page/limit pagination

use serde::Deserialize;

/// Normalised page request: `page >= 1`, `1 <= limit <= MAX_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPage")]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// Clamp a raw page/limit pair into range
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

#[derive(Deserialize)]
struct RawPage {
    page: Option<i64>,
    limit: Option<i64>,
}

impl From<RawPage> for PageRequest {
    fn from(raw: RawPage) -> Self {
        Self::new(
            raw.page.unwrap_or(1),
            raw.limit.unwrap_or(Self::DEFAULT_LIMIT),
        )
    }
}
