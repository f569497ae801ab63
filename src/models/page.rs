//! Paging for the read projections

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_number: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
        }
        .normalized()
    }

    /// Page numbers start at 1; sizes fall back to 10 and cap at 100
    pub fn normalized(self) -> Self {
        let page_size = if self.page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size.min(MAX_PAGE_SIZE)
        };

        Self {
            page_number: self.page_number.max(1),
            page_size,
        }
    }

    /// Pull a page past the end back onto the last page
    pub fn clamp_to(self, total_count: i64) -> Self {
        let pages = total_pages(total_count, self.page_size);
        if pages > 0 && self.page_number > pages {
            Self {
                page_number: pages,
                ..self
            }
        } else {
            self
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page_number - 1) * self.page_size
    }
}

pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_count + page_size - 1) / page_size
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub total_pages: i64,
    pub page_number: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            total_pages: total_pages(total_count, request.page_size),
            page_number: request.page_number,
            page_size: request.page_size,
        }
    }
}

/// Payments page plus the sum of the listed prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPage<T> {
    pub page: Page<T>,
    pub total_amount: Decimal,
}

/// Optional date range applied to the slot date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
