use crate::record::{Item, Key, SCAN_PAGE_LIMIT};
use crate::Error;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// A single-page filtered scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    /// Server-side filter; `None` returns every evaluated item
    pub filter_expression: Option<String>,
    /// Values bound to the filter's `:placeholder`s
    pub values: HashMap<String, AttributeValue>,
    /// Page size cap
    pub limit: i32,
}

impl ScanRequest {
    pub fn new(
        filter_expression: impl Into<String>,
        values: HashMap<String, AttributeValue>,
    ) -> Self {
        let filter_expression = filter_expression.into();
        Self {
            filter_expression: (!filter_expression.trim().is_empty()).then_some(filter_expression),
            values,
            limit: SCAN_PAGE_LIMIT,
        }
    }

    pub fn unfiltered() -> Self {
        Self {
            filter_expression: None,
            values: HashMap::new(),
            limit: SCAN_PAGE_LIMIT,
        }
    }
}

/// Raw item access against a single table
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Name of the table this persistence writes to
    fn table_name(&self) -> &str;

    /// Replace the whole item sharing `item`'s key.
    /// Returns the previous item's attributes if one existed
    async fn put_item(&self, item: Item) -> Result<Option<Item>, Error>;

    /// Fetch the item with the given key, `None` if absent
    async fn get_item(&self, key: &Key) -> Result<Option<Item>, Error>;

    /// Run one page of a scan. No continuation is performed
    async fn scan(&self, request: ScanRequest) -> Result<Vec<Item>, Error>;
}
