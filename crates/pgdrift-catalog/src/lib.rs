//! pgdrift Catalog
//!
//! The external collaborator the diff core consumes: record sources that
//! produce one flat, textualized row per schema object for a given
//! category. The core never fetches or sorts — it only reads what a source
//! hands it.

pub mod mock;
pub mod postgres;
pub mod source;

pub use mock::MockSource;
pub use postgres::PostgresSource;
pub use source::{FetchError, RecordSource};
