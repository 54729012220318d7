//! Paginators for the two shapes the Turso API uses: a single response,
//! and `?page=N&page_size=M` with `pagination.total_pages` in the body.

use super::types::{check_stop_condition, Page, PageToken, Paginator, StopCondition};
use std::collections::BTreeMap;
use tracing::trace;

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Walks `page = start_page, start_page + 1, ...`
///
/// Paging ends when the stop condition fires or a page comes back shorter
/// than the page size.
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    pub page_param: String,
    /// Turso pages start at 1
    pub start_page: u32,
    pub page_size_param: Option<String>,
    pub page_size: Option<u32>,
    pub stop_condition: StopCondition,
}

impl PageNumberPaginator {
    /// Stops on an empty page until told otherwise
    pub fn new(page_param: impl Into<String>, start_page: u32) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            page_size_param: None,
            page_size: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size_param = Some(param.into());
        self.page_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }
}

impl Paginator for PageNumberPaginator {
    fn first_token(&self) -> Option<PageToken> {
        Some(PageToken(self.start_page))
    }

    fn query_params(&self, token: Option<PageToken>) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        let page = token.map_or(self.start_page, PageToken::page);
        params.insert(self.page_param.clone(), page.to_string());
        if let (Some(param), Some(size)) = (&self.page_size_param, self.page_size) {
            params.insert(param.clone(), size.to_string());
        }
        params
    }

    fn next_token(&self, previous: Option<PageToken>, page: &Page<'_>) -> Option<PageToken> {
        let current = previous.map_or(self.start_page, PageToken::page);

        if check_stop_condition(&self.stop_condition, page, current).should_stop() {
            trace!(page = current, "stop condition reached");
            return None;
        }

        let short_page = self
            .page_size
            .is_some_and(|size| page.records < size as usize);
        if short_page {
            return None;
        }

        current.checked_add(1).map(PageToken)
    }
}

// ============================================================================
// Single response
// ============================================================================

/// One request per partition
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn first_token(&self) -> Option<PageToken> {
        None
    }

    fn query_params(&self, _token: Option<PageToken>) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn next_token(&self, _previous: Option<PageToken>, _page: &Page<'_>) -> Option<PageToken> {
        None
    }
}
