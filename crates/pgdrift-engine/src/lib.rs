//! pgdrift Engine
//!
//! The generic ordered-diff machinery: a three-way sorted merge over two
//! pre-sorted record streams, the `SchemaObject` contract it drives, and one
//! reconciliation policy per metadata category. The engine knows nothing
//! about any category's fields; every domain rule lives in the category
//! modules.

pub mod categories;
pub mod cursor;
pub mod diff;
pub mod object;
pub mod sort;

pub use categories::schema_object;
pub use cursor::Cursor;
pub use diff::diff;
pub use object::SchemaObject;
pub use sort::sort_records;
