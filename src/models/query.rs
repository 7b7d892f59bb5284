use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::posts::{Category, PostFilter},
    Error, Result,
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Query string values are taken as raw strings so that malformed numbers
/// fall back to the defaults instead of rejecting the request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PaginationQueryDto {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PostListQueryDto {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
}

impl PostListQueryDto {
    pub fn pagination(&self) -> Pagination {
        Pagination::parse(self.page.as_deref(), self.limit.as_deref())
    }

    pub fn filter(&self) -> Result<PostFilter> {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(value) => Some(value.parse::<Category>().map_err(Error::BadRequest)?),
        };

        let author = match self.author.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(parse_id(value, "author")?),
        };

        Ok(PostFilter {
            search,
            category,
            author,
        })
    }
}

impl PaginationQueryDto {
    pub fn pagination(&self) -> Pagination {
        Pagination::parse(self.page.as_deref(), self.limit.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let positive = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v >= 1)
        };

        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }

    /// Saturates for absurd page numbers, which then read past the last row.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

pub fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::BadRequest(format!("Invalid {what} id")))
}
