use grantree_core::{AppError, AppResult};

use crate::RoleSearch;

/// Page size defaults and bounds for role listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleListingConfig {
    default_limit: usize,
    max_limit: usize,
}

impl RoleListingConfig {
    /// Creates a validated listing configuration.
    pub fn new(default_limit: usize, max_limit: usize) -> AppResult<Self> {
        if default_limit == 0 || max_limit == 0 {
            return Err(AppError::Validation(
                "role page limits must be greater than zero".to_owned(),
            ));
        }

        if default_limit > max_limit {
            return Err(AppError::Validation(format!(
                "default role page limit {default_limit} exceeds maximum {max_limit}"
            )));
        }

        Ok(Self {
            default_limit,
            max_limit,
        })
    }

    /// Page size used when the caller gives none (or zero).
    #[must_use]
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Upper bound for requested page sizes.
    #[must_use]
    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    /// Normalizes raw paging input into a page number and store search.
    ///
    /// Missing, zero or negative pages become page 1. A missing or zero limit
    /// takes the default, a negative one becomes 1, and anything above the
    /// maximum is clamped. The resulting limit is never below 1.
    #[must_use]
    pub(crate) fn normalize(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
        keyword: Option<String>,
        include_deleted: bool,
    ) -> (usize, RoleSearch) {
        let page = page
            .filter(|page| *page != 0)
            .map_or(1, |page| usize::try_from(page).unwrap_or(1).max(1));
        let limit = limit
            .filter(|limit| *limit != 0)
            .map_or(self.default_limit, |limit| {
                usize::try_from(limit).unwrap_or(1).max(1)
            })
            .min(self.max_limit)
            .max(1);
        let keyword = keyword
            .map(|keyword| keyword.trim().to_owned())
            .filter(|keyword| !keyword.is_empty());

        (
            page,
            RoleSearch {
                keyword,
                offset: (page - 1).saturating_mul(limit),
                limit,
                include_deleted,
            },
        )
    }
}

impl Default for RoleListingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}
