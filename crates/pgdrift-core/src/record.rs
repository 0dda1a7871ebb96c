//! Introspection records
//!
//! Every value coming out of a catalog query is textualized: booleans arrive
//! as `"true"`/`"false"` and SQL NULL arrives as the literal string `"null"`.
//! The `"null"` sentinel is part of the input contract, not an accident —
//! several mutate policies branch on it (default-value diffing,
//! constraint-presence diffing) and tests exercise the literal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The textual sentinel catalog queries use for SQL NULL.
pub const NULL_SENTINEL: &str = "null";

/// One flat row of schema metadata: field name to textualized field value.
///
/// Field presence is category-specific; a missing key reads as the empty
/// string, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record (zero fields)
    ///
    /// An empty record doubles as the end-of-sequence sentinel for ordered
    /// record sources.
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Get a field value, or `""` when the field is absent
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// True when the field is present and not the `"null"` sentinel
    pub fn has(&self, key: &str) -> bool {
        let value = self.get(key);
        !value.is_empty() && value != NULL_SENTINEL
    }

    /// Set a field value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True for the zero-field sentinel record
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over (field, value) pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Build a record from literal (field, value) pairs.
///
/// Fixture shorthand used throughout the engine tests.
pub fn record(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_field_reads_as_empty() {
        let rec = record(&[("table_name", "t_org")]);
        assert_eq!(rec.get("table_name"), "t_org");
        assert_eq!(rec.get("column_name"), "");
    }

    #[test]
    fn null_sentinel_is_not_a_value() {
        let rec = record(&[("column_default", "null"), ("data_type", "integer")]);
        assert!(!rec.has("column_default"));
        assert!(rec.has("data_type"));
        assert!(!rec.has("absent"));
        // The sentinel is still readable verbatim
        assert_eq!(rec.get("column_default"), NULL_SENTINEL);
    }

    #[test]
    fn empty_record_is_the_sentinel() {
        let rec = Record::new();
        assert!(rec.is_empty());
        assert_eq!(rec.len(), 0);
    }
}
