//! Metadata categories
//!
//! One diff run reconciles exactly one category; `all` runs every category
//! in an order that respects dependencies between them (a table must exist
//! before its columns, columns before indexes, indexes before foreign keys,
//! and so on). The engine itself gives no cross-category guarantee — the
//! ordering lives here, in the caller's hands.

use serde::{Deserialize, Serialize};

/// One kind of database metadata being diffed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Namespaces (schemas within a database)
    Schemata,

    /// Login/group roles
    Role,

    /// Stored functions
    Function,

    /// Sequences
    Sequence,

    /// Tables (existence only; structure is the column category's job)
    Table,

    /// Table columns
    Column,

    /// Indexes, including primary-key and unique constraint backings
    Index,

    /// Views
    View,

    /// Materialized views
    MatView,

    /// Table/sequence/view ownership
    Owner,

    /// Foreign keys
    ForeignKey,

    /// Relation-level grants (tables, views, sequences, foreign tables)
    GrantRelationship,

    /// Column-level grants
    GrantAttribute,

    /// Triggers
    Trigger,
}

impl Category {
    /// Every category, in the dependency-respecting order used by `all`
    pub const DEPENDENCY_ORDER: [Category; 14] = [
        Category::Schemata,
        Category::Role,
        Category::Function,
        Category::Sequence,
        Category::Table,
        Category::Column,
        Category::Index,
        Category::View,
        Category::MatView,
        Category::Owner,
        Category::ForeignKey,
        Category::GrantRelationship,
        Category::GrantAttribute,
        Category::Trigger,
    ];

    /// Stable identifier used on the command line and in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schemata => "schema",
            Self::Role => "role",
            Self::Function => "function",
            Self::Sequence => "sequence",
            Self::Table => "table",
            Self::Column => "column",
            Self::Index => "index",
            Self::View => "view",
            Self::MatView => "matview",
            Self::Owner => "owner",
            Self::ForeignKey => "foreign_key",
            Self::GrantRelationship => "grant_relationship",
            Self::GrantAttribute => "grant_attribute",
            Self::Trigger => "trigger",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for an unrecognized category name
#[derive(Debug, thiserror::Error)]
#[error("unknown category '{0}' (expected one of: schema, role, function, sequence, table, column, index, view, matview, owner, foreign_key, grant_relationship, grant_attribute, trigger)")]
pub struct UnknownCategory(pub String);

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "schema" | "schemata" => Ok(Self::Schemata),
            "role" => Ok(Self::Role),
            "function" => Ok(Self::Function),
            "sequence" => Ok(Self::Sequence),
            "table" => Ok(Self::Table),
            "column" => Ok(Self::Column),
            "index" => Ok(Self::Index),
            "view" => Ok(Self::View),
            "matview" | "materialized_view" => Ok(Self::MatView),
            "owner" => Ok(Self::Owner),
            "foreign_key" => Ok(Self::ForeignKey),
            "grant_relationship" => Ok(Self::GrantRelationship),
            "grant_attribute" => Ok(Self::GrantAttribute),
            "trigger" => Ok(Self::Trigger),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_starts_with_namespaces_and_ends_with_triggers() {
        assert_eq!(Category::DEPENDENCY_ORDER[0], Category::Schemata);
        assert_eq!(
            Category::DEPENDENCY_ORDER[Category::DEPENDENCY_ORDER.len() - 1],
            Category::Trigger
        );
        // Foreign keys come after the tables, columns, and indexes they reference
        let pos = |c: Category| {
            Category::DEPENDENCY_ORDER
                .iter()
                .position(|x| *x == c)
                .unwrap()
        };
        assert!(pos(Category::Table) < pos(Category::Column));
        assert!(pos(Category::Column) < pos(Category::Index));
        assert!(pos(Category::Index) < pos(Category::ForeignKey));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("TABLE".parse::<Category>().unwrap(), Category::Table);
        assert_eq!(
            "grant_attribute".parse::<Category>().unwrap(),
            Category::GrantAttribute
        );
        assert!("nonsense".parse::<Category>().is_err());
    }
}
