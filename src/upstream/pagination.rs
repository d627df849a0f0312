//! Catalog pagination.
//!
//! The provider has shipped both next-link and offset/limit pagination, and
//! signals exhaustion in several ways. [`next_page`] folds all of them into
//! one decision so the fetch loop only sees "another request" or "done".

use serde::{Deserialize, Serialize};

use super::types::CatalogPage;

/// How the catalog endpoint advances between pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
    /// Follow `meta.links.next`; a missing link ends the listing.
    #[default]
    NextLink,
    /// Send explicit `page[offset]`/`page[limit]` parameters.
    Offset,
}

impl PaginationStyle {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "next_link" | "next-link" | "link" => Some(Self::NextLink),
            "offset" => Some(Self::Offset),
            _ => None,
        }
    }
}

/// A single catalog page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Initial request built from city code and search parameters.
    First,
    /// Absolute URL supplied by the server.
    Link(String),
    /// Explicit window into the result set.
    Offset { offset: usize, limit: usize },
}

impl PageRequest {
    pub fn first(style: PaginationStyle, page_size: usize) -> Self {
        match style {
            PaginationStyle::NextLink => Self::First,
            PaginationStyle::Offset => Self::Offset {
                offset: 0,
                limit: page_size,
            },
        }
    }
}

/// Decide what to request after receiving `page`.
///
/// `fetched` is the number of records received so far, including `page`.
/// Termination signals, in order: an empty page, an advertised total that
/// has been reached, or a short page. A server-supplied next link always
/// wins over the heuristics. With offset pagination a full page that carries
/// no signal at all is followed by one more request to confirm the end.
pub fn next_page(
    style: PaginationStyle,
    page_size: usize,
    page: &CatalogPage,
    fetched: usize,
) -> Option<PageRequest> {
    if page.data.is_empty() {
        return None;
    }
    if let Some(next) = page.next_link() {
        return Some(PageRequest::Link(next.to_string()));
    }
    if matches!(page.advertised_total(), Some(total) if fetched >= total) {
        return None;
    }
    if page.data.len() < page_size {
        return None;
    }
    match style {
        PaginationStyle::NextLink => None,
        PaginationStyle::Offset => Some(PageRequest::Offset {
            offset: fetched,
            limit: page_size,
        }),
    }
}
