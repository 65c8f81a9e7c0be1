//! Sequential pagination driver
//!
//! Drives a page-by-page fetch against a single-page callback. The total
//! record count is discovered on page 1 and decides whether any further
//! requests happen at all. The two upstream API families stop differently
//! (the registry after a computed page count, the trade family on the
//! accumulated item count or an empty page) and both behaviors are kept
//! distinct on purpose; the tests at the bottom document the difference.
//!
//! Pages are requested strictly in increasing order, one at a time, and item
//! order is preserved across the concatenation. Any page that fails
//! classification aborts the whole fetch; partial accumulation is discarded.

use std::future::Future;

use aptmap_domain::{AptMapError, Result};
use tracing::debug;

/// One page of results plus the server-reported total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

/// Per-endpoint stop rule for the pagination loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop after `ceil(total_count / page_size)` pages (registry family).
    PageCount,
    /// Stop once the accumulated item count reaches `total_count`, or as
    /// soon as any page comes back empty (trade family).
    ItemCount,
}

/// Fetch every page and concatenate the items in request order.
///
/// `fetch_page` is called with 1-based page numbers. The first page's
/// `total_count` governs the loop:
/// - `total_count == 0` → empty result, exactly one request
/// - `page_size >= total_count` → page-1 items, exactly one request
/// - otherwise pages `2, 3, …` are requested per the [`Termination`] rule
///
/// # Errors
/// The first error from `fetch_page` aborts the fetch and is returned as-is.
pub async fn fetch_all<T, F, Fut>(
    page_size: u32,
    termination: Termination,
    fetch_page: F,
) -> Result<Vec<T>>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    if page_size == 0 {
        return Err(AptMapError::InvalidInput("page size must be at least 1".to_string()));
    }

    let first = fetch_page(1).await?;
    let total_count = first.total_count;
    debug!(total_count, page_size, "first page fetched");

    if total_count == 0 {
        return Ok(Vec::new());
    }
    if u64::from(page_size) >= total_count {
        return Ok(first.items);
    }

    let mut records = first.items;
    match termination {
        Termination::PageCount => {
            let total_pages = total_count.div_ceil(u64::from(page_size));
            for page in 2..=total_pages {
                let result = fetch_page(page as u32).await?;
                records.extend(result.items);
            }
        }
        Termination::ItemCount => {
            // An empty page is the success terminal for this family, page 1
            // included.
            if records.is_empty() {
                return Ok(records);
            }
            let mut page: u32 = 2;
            loop {
                let result = fetch_page(page).await?;
                if result.items.is_empty() {
                    break;
                }
                records.extend(result.items);
                if records.len() as u64 >= total_count {
                    break;
                }
                page += 1;
            }
        }
    }

    Ok(records)
}
