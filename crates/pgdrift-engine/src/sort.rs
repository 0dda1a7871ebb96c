//! Client-side ordering of introspection rows
//!
//! The merge assumes both sides are sorted by the category's comparison key
//! in byte-identical order. Server-side ORDER BY is collation-dependent, so
//! the rows are re-sorted here with plain byte comparison before a diff run,
//! using exactly the keys the category `compare` implementations use.

use pgdrift_core::acl::parse_role;
use pgdrift_core::{Category, Record};
use std::cmp::Ordering;

/// Sort rows by the category's composite comparison key
pub fn sort_records(category: Category, rows: &mut [Record]) {
    rows.sort_by(|a, b| key_cmp(category, a, b));
}

fn key_cmp(category: Category, a: &Record, b: &Record) -> Ordering {
    match category {
        Category::Schemata => a.get("schema_name").cmp(b.get("schema_name")),
        Category::Role => a.get("rolname").cmp(b.get("rolname")),
        Category::Function => a.get("function_name").cmp(b.get("function_name")),
        Category::Sequence => a.get("sequence_name").cmp(b.get("sequence_name")),
        Category::Table => a.get("table_name").cmp(b.get("table_name")),
        Category::View => a.get("viewname").cmp(b.get("viewname")),
        Category::MatView => a.get("matviewname").cmp(b.get("matviewname")),
        Category::Owner => a.get("relationship_name").cmp(b.get("relationship_name")),
        Category::Column => a
            .get("compare_name")
            .cmp(b.get("compare_name"))
            .then_with(|| a.get("column_name").cmp(b.get("column_name"))),
        Category::Index => a
            .get("table_name")
            .cmp(b.get("table_name"))
            .then_with(|| a.get("index_name").cmp(b.get("index_name"))),
        Category::ForeignKey => a
            .get("table_name")
            .cmp(b.get("table_name"))
            .then_with(|| a.get("constraint_def").cmp(b.get("constraint_def"))),
        Category::Trigger => a
            .get("table_name")
            .cmp(b.get("table_name"))
            .then_with(|| a.get("trigger_name").cmp(b.get("trigger_name"))),
        Category::GrantRelationship => a
            .get("compare_name")
            .cmp(b.get("compare_name"))
            // The sort key is coarser than identity here: one relation
            // carries one ACL entry per role, so the role breaks the tie
            .then_with(|| {
                parse_role(a.get("relationship_acl")).cmp(&parse_role(b.get("relationship_acl")))
            }),
        Category::GrantAttribute => a
            .get("schema")
            .cmp(b.get("schema"))
            .then_with(|| a.get("relationship_name").cmp(b.get("relationship_name")))
            .then_with(|| a.get("attribute_name").cmp(b.get("attribute_name")))
            .then_with(|| {
                parse_role(a.get("attribute_acl")).cmp(&parse_role(b.get("attribute_acl")))
            }),
    }
}
