//! Record source trait for fetching introspection rows

use async_trait::async_trait;
use pgdrift_core::{Category, Record};

/// Errors that can occur when fetching records
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A source of introspection rows for one database.
///
/// Every field value is textualized: booleans as `"true"`/`"false"` and SQL
/// NULL as the literal string `"null"`. Rows come back in query order; the
/// caller re-sorts them by the category's comparison key before diffing.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// The source name (e.g. "PostgreSQL", "Mock")
    fn name(&self) -> &'static str;

    /// Fetch all rows for a category
    async fn fetch(&self, category: Category) -> Result<Vec<Record>, FetchError>;

    /// Validate the connection before fetching anything
    ///
    /// Connection problems should fail fast here, before any diff state is
    /// constructed.
    async fn test_connection(&self) -> Result<(), FetchError>;
}
