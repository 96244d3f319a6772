//! Pagination utilities for service layer
//!
//! `Pagination` resolves a requested page against the total row count and
//! `Page` is the page object handed to list templates.

use serde::Serialize;

use crate::errors::ServiceError;

/// Requested page: a 1-based number or the literal `last`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageNumber {
    Number(u64),
    Last,
}

impl PageNumber {
    /// Missing → page 1. Anything that is neither an integer nor `last` is
    /// not found.
    pub fn parse(raw: Option<&str>) -> Result<Self, ServiceError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(PageNumber::Number(1)),
            Some("last") => Ok(PageNumber::Last),
            Some(s) => s
                .parse::<u64>()
                .map(PageNumber::Number)
                .map_err(|_| ServiceError::NotFound(format!("page {s:?} is not a number"))),
        }
    }
}

impl Default for PageNumber {
    fn default() -> Self { PageNumber::Number(1) }
}

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    pub page: PageNumber,
    /// items per page
    pub per_page: u64,
}

impl Pagination {
    pub fn new(page: PageNumber, per_page: u64) -> Self {
        Self { page, per_page: per_page.max(1) }
    }

    /// An empty result still has one (empty) page.
    pub fn num_pages(&self, count: u64) -> u64 {
        if count == 0 { 1 } else { count.div_ceil(self.per_page) }
    }

    /// 1-based page number, or not found when outside `1..=num_pages`.
    pub fn resolve(&self, count: u64) -> Result<u64, ServiceError> {
        let num_pages = self.num_pages(count);
        match self.page {
            PageNumber::Last => Ok(num_pages),
            PageNumber::Number(n) if (1..=num_pages).contains(&n) => Ok(n),
            PageNumber::Number(n) => Err(ServiceError::NotFound(format!("page {n} out of range 1..={num_pages}"))),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub per_page: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(object_list: Vec<T>, number: u64, count: u64, pagination: &Pagination) -> Self {
        let num_pages = pagination.num_pages(count);
        let has_next = number < num_pages;
        let has_previous = number > 1;
        Self {
            object_list,
            number,
            num_pages,
            count,
            per_page: pagination.per_page,
            has_next,
            has_previous,
            next_page_number: has_next.then(|| number + 1),
            previous_page_number: has_previous.then(|| number - 1),
        }
    }
}
