//! Paginated list envelope and page-link construction.

use crate::error::AppError;
use axum::http::Uri;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize, Debug)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Slice one page out of the full (already filtered and ordered) result
/// set. A malformed `page` value is a client error; a page past the end is
/// not found, except that page 1 of an empty set is an empty 200.
pub fn paginate<T>(
    uri: &Uri,
    page_size: u32,
    params: &HashMap<String, String>,
    items: Vec<T>,
) -> Result<Page<T>, AppError> {
    let page = match params.get("page") {
        None => 1,
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| AppError::Validation("page must be a positive integer".into()))?,
    };
    let count = items.len();
    let size = page_size as usize;
    let last_page = count.div_ceil(size).max(1);
    if page as usize > last_page {
        return Err(AppError::NotFound("invalid page".into()));
    }
    let start = (page as usize - 1) * size;
    let results: Vec<T> = items.into_iter().skip(start).take(size).collect();
    let next = ((page as usize) < last_page).then(|| link_for_page(uri, page + 1));
    let previous = (page > 1).then(|| link_for_page(uri, page - 1));
    Ok(Page {
        count,
        next,
        previous,
        results,
    })
}

/// Request URI with the `page` parameter rewritten; page 1 drops the
/// parameter entirely.
fn link_for_page(uri: &Uri, page: u32) -> String {
    let mut parts: Vec<String> = uri
        .query()
        .map(|q| {
            q.split('&')
                .filter(|p| !p.is_empty() && !p.starts_with("page="))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    if page > 1 {
        parts.push(format!("page={page}"));
    }
    if parts.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), parts.join("&"))
    }
}
