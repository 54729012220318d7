//! Pagination module
//!
//! Supports: No pagination, Page Number
//!
//! # Overview
//!
//! A [`Paginator`] decides, from a parsed response, whether another page must
//! be fetched and which [`PageToken`] to send next. Streams pick their
//! strategy at construction time through a [`PaginationConfig`] value.

mod strategies;
mod types;

pub use strategies::{NoPaginator, PageNumberPaginator};
pub use types::{
    check_stop_condition, Page, PageToken, PaginationConfig, Paginator, StopCondition, StopResult,
};
