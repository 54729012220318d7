//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{NoPaginator, PageNumberPaginator};
use crate::decode::lookup_path;
use serde_json::Value;
use std::collections::BTreeMap;

/// Opaque continuation token; here, a page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageToken(pub u32);

impl PageToken {
    /// The page number carried by this token
    pub fn page(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed response as seen by a paginator
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// Parsed response body
    pub body: &'a Value,
    /// Number of records parsed from the body
    pub records: usize,
}

impl<'a> Page<'a> {
    /// Create a page view
    pub fn new(body: &'a Value, records: usize) -> Self {
        Self { body, records }
    }
}

/// Configuration for pagination behavior
#[derive(Debug, Clone, Default)]
pub enum PaginationConfig {
    /// No pagination
    #[default]
    None,

    /// Page number pagination
    PageNumber {
        /// Query parameter name for page number
        page_param: String,
        /// First page number (usually 0 or 1)
        start_page: u32,
        /// Optional page size parameter name
        page_size_param: Option<String>,
        /// Page size value
        page_size: Option<u32>,
        /// Stop condition
        stop_condition: StopCondition,
    },
}

impl PaginationConfig {
    /// Create page number pagination config
    pub fn page_number(page_param: impl Into<String>, start_page: u32) -> Self {
        Self::PageNumber {
            page_param: page_param.into(),
            start_page,
            page_size_param: None,
            page_size: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    /// Set the page size parameter (page number pagination only)
    #[must_use]
    pub fn with_page_size(self, param: impl Into<String>, size: u32) -> Self {
        match self {
            Self::PageNumber {
                page_param,
                start_page,
                stop_condition,
                ..
            } => Self::PageNumber {
                page_param,
                start_page,
                page_size_param: Some(param.into()),
                page_size: Some(size),
                stop_condition,
            },
            other => other,
        }
    }

    /// Set the stop condition (page number pagination only)
    #[must_use]
    pub fn with_stop_condition(self, condition: StopCondition) -> Self {
        match self {
            Self::PageNumber {
                page_param,
                start_page,
                page_size_param,
                page_size,
                ..
            } => Self::PageNumber {
                page_param,
                start_page,
                page_size_param,
                page_size,
                stop_condition: condition,
            },
            other => other,
        }
    }

    /// Build the paginator this config describes
    pub fn build(&self) -> Box<dyn Paginator> {
        match self {
            Self::None => Box::new(NoPaginator),
            Self::PageNumber {
                page_param,
                start_page,
                page_size_param,
                page_size,
                stop_condition,
            } => {
                let mut paginator = PageNumberPaginator::new(page_param.clone(), *start_page)
                    .with_stop_condition(stop_condition.clone());
                if let (Some(param), Some(size)) = (page_size_param, page_size) {
                    paginator = paginator.with_page_size(param.clone(), *size);
                }
                Box::new(paginator)
            }
        }
    }

    /// Check whether this config paginates at all
    pub fn is_paginated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Default)]
pub enum StopCondition {
    /// Stop when page is empty (no records)
    #[default]
    EmptyPage,

    /// Stop when page number reaches total pages
    TotalPages {
        /// Dotted path to total pages field
        path: String,
    },
}

impl StopCondition {
    /// Create a total pages stop condition
    pub fn total_pages(path: impl Into<String>) -> Self {
        Self::TotalPages { path: path.into() }
    }
}

/// Result of checking a stop condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Continue pagination
    Continue,
    /// Stop pagination
    Stop,
}

impl StopResult {
    pub fn should_stop(self) -> bool {
        self == Self::Stop
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync + std::fmt::Debug {
    /// Token for the first request, if the strategy sends one
    fn first_token(&self) -> Option<PageToken>;

    /// Query parameters for a request carrying `token`
    fn query_params(&self, token: Option<PageToken>) -> BTreeMap<String, String>;

    /// Token for the next request, or `None` when the listing is exhausted
    fn next_token(&self, previous: Option<PageToken>, page: &Page<'_>) -> Option<PageToken>;
}

/// Check a stop condition against a response
pub fn check_stop_condition(
    condition: &StopCondition,
    page: &Page<'_>,
    current_page: u32,
) -> StopResult {
    match condition {
        StopCondition::EmptyPage => {
            if page.records == 0 {
                StopResult::Stop
            } else {
                StopResult::Continue
            }
        }
        StopCondition::TotalPages { path } => {
            let total_pages = lookup_path(page.body, path).and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse::<u64>().ok(),
                _ => None,
            });
            match total_pages {
                Some(total) if u64::from(current_page) >= total => StopResult::Stop,
                _ if page.records == 0 => StopResult::Stop,
                _ => StopResult::Continue,
            }
        }
    }
}
