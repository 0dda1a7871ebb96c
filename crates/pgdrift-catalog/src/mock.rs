//! Mock record source for testing
//!
//! Returns predefined rows without connecting to any database. Useful for
//! unit testing diff policies, CI pipelines, and demos without real
//! credentials.

use crate::source::{FetchError, RecordSource};
use async_trait::async_trait;
use pgdrift_core::{Category, Record};
use std::collections::HashMap;

/// In-memory record source with per-category fixture rows
#[derive(Debug, Default)]
pub struct MockSource {
    records: HashMap<Category, Vec<Record>>,
    fail_connection: bool,
}

impl MockSource {
    /// Create a mock source with no fixture rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fixture rows for a category
    pub fn with_records(mut self, category: Category, rows: Vec<Record>) -> Self {
        self.records.insert(category, rows);
        self
    }

    /// Make `test_connection` fail
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }
}

#[async_trait]
impl RecordSource for MockSource {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn fetch(&self, category: Category) -> Result<Vec<Record>, FetchError> {
        Ok(self.records.get(&category).cloned().unwrap_or_default())
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        if self.fail_connection {
            Err(FetchError::AuthenticationError(
                "simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
