//! 页码分页（`page` 从 1 开始，`limit` 为每页条数）

use serde::Serialize;

use crate::errors::{FoodgramError, Result};

const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl PageParams {
    /// 校验并补全分页参数；`default_limit` 来自 site.page_size
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Result<Self> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(FoodgramError::not_found("Invalid page."));
        }
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn has_next(&self, total: u64) -> bool {
        self.page.saturating_mul(self.limit) < total
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// 服务层分页结果；链接由 API 层补全
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub params: PageParams,
}

impl<T> Paged<T> {
    /// 超出最后一页（且不是空集合的第一页）按 404 处理
    pub fn check_in_range(self) -> Result<Self> {
        if self.items.is_empty() && self.params.page > 1 {
            return Err(FoodgramError::not_found("Invalid page."));
        }
        Ok(self)
    }
}

/// `{count, next, previous, results}`
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}
