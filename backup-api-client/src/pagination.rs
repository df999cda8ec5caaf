//! Pagination aggregator - flattens offset/limit listings into one sequence

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use backup_mcp_shared::{ListQuery, Result, MAX_PAGE_SIZE};

use crate::executor::ApiExecutor;

/// Upper bound on items collected by one aggregated listing
pub const MAX_AGGREGATED_ITEMS: usize = 1000;

/// Pause between consecutive page requests
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(50);

/// Where a listing page keeps its items
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageShape<'a> {
    /// The page is itself an array
    Sequence(&'a [Value]),
    /// `{ "items": [...] }`
    ItemsWrapper(&'a [Value]),
    /// `{ "data": [...] }`
    DataWrapper(&'a [Value]),
    Unrecognized,
}

impl<'a> PageShape<'a> {
    pub fn classify(page: &'a Value) -> Self {
        if let Some(items) = page.as_array() {
            return Self::Sequence(items);
        }
        if let Some(items) = page.get("items").and_then(Value::as_array) {
            return Self::ItemsWrapper(items);
        }
        if let Some(items) = page.get("data").and_then(Value::as_array) {
            return Self::DataWrapper(items);
        }
        Self::Unrecognized
    }

    pub fn items(&self) -> Option<&'a [Value]> {
        match *self {
            Self::Sequence(items) | Self::ItemsWrapper(items) | Self::DataWrapper(items) => {
                Some(items)
            }
            Self::Unrecognized => None,
        }
    }
}

/// Items collected across pages
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    pub items: Vec<Value>,
    /// The item cap stopped collection while more pages may exist
    pub truncated: bool,
    /// Upstream requests issued
    pub pages: usize,
}

/// What a listing call produced
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    /// A single upstream page, returned as received
    Page(Value),
    Aggregated(AggregatedResult),
}

impl ListOutcome {
    /// Annotation for callers when the item cap was hit
    pub fn note(&self) -> Option<String> {
        match self {
            Self::Aggregated(result) if result.truncated => Some(format!(
                "Listing capped at {MAX_AGGREGATED_ITEMS} items; use filter or offset to see the rest."
            )),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Page(page) => page,
            Self::Aggregated(result) => Value::Array(result.items),
        }
    }
}

/// Clamp a requested page size to what the portal accepts
pub fn normalize_page_size(limit: Option<u32>) -> u32 {
    limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

pub struct ListAggregator {
    executor: Arc<ApiExecutor>,
    page_delay: Duration,
}

impl ListAggregator {
    pub fn new(executor: Arc<ApiExecutor>, page_delay: Duration) -> Self {
        Self {
            executor,
            page_delay,
        }
    }

    /// List `path`, following pages when `query.all` is set
    pub async fn get_list(&self, path: &str, query: &ListQuery) -> Result<ListOutcome> {
        if !query.wants_all() {
            let page = self
                .executor
                .get(path, &query.query_pairs(query.offset, query.limit))
                .await?;
            return Ok(ListOutcome::Page(page));
        }

        let page_size = normalize_page_size(query.limit);
        let mut offset = query.offset.unwrap_or(0);
        let mut items: Vec<Value> = Vec::new();
        let mut pages = 0usize;
        let mut truncated = false;

        loop {
            let page = self
                .executor
                .get(path, &query.query_pairs(Some(offset), Some(page_size)))
                .await?;
            pages += 1;

            let fetched = match PageShape::classify(&page).items() {
                Some(batch) => {
                    items.extend_from_slice(batch);
                    Some(batch.len())
                }
                None => None,
            };
            let Some(fetched) = fetched else {
                debug!(
                    "Unrecognized page shape from {} at offset {}, returning it as is",
                    path, offset
                );
                return Ok(ListOutcome::Page(page));
            };

            debug!(
                "Fetched {} items from {} at offset {} ({} total)",
                fetched,
                path,
                offset,
                items.len()
            );

            if items.len() >= MAX_AGGREGATED_ITEMS {
                truncated = items.len() > MAX_AGGREGATED_ITEMS || fetched == page_size as usize;
                break;
            }
            if fetched < page_size as usize {
                break;
            }

            // No further offset is representable, so this page was the last
            let Some(next) = offset.checked_add(u64::from(page_size)) else {
                debug!("Offset space exhausted for {} at offset {}", path, offset);
                break;
            };
            offset = next;
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        items.truncate(MAX_AGGREGATED_ITEMS);

        Ok(ListOutcome::Aggregated(AggregatedResult {
            items,
            truncated,
            pages,
        }))
    }
}
