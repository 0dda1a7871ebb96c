//! Catalog-to-engine integration
//!
//! Drives a full diff run the way the CLI does: fetch from a record source,
//! sort, wrap, merge.

use pgdrift_catalog::{MockSource, RecordSource};
use pgdrift_core::record::record;
use pgdrift_core::{Category, DiffContext, Script};
use pgdrift_engine::{diff, schema_object, sort_records};

#[tokio::test]
async fn mock_sourced_grant_diff_end_to_end() {
    let grant = |acl: &str| {
        record(&[
            ("schema_name", "public"),
            ("compare_name", "r.table1"),
            ("type", "TABLE"),
            ("relationship_name", "table1"),
            ("relationship_acl", acl),
        ])
    };

    let left_source = MockSource::new().with_records(
        Category::GrantRelationship,
        vec![grant("c42=rwa/postgres")],
    );
    let right_source = MockSource::new().with_records(
        Category::GrantRelationship,
        vec![grant("c42=r/postgres")],
    );

    let category = Category::GrantRelationship;
    let mut left_rows = left_source.fetch(category).await.unwrap();
    let mut right_rows = right_source.fetch(category).await.unwrap();
    sort_records(category, &mut left_rows);
    sort_records(category, &mut right_rows);

    let ctx = DiffContext::default();
    let mut left = schema_object(category, left_rows, &ctx);
    let mut right = schema_object(category, right_rows, &ctx);
    let mut script = Script::new();
    diff(left.as_mut(), right.as_mut(), &mut script);

    assert_eq!(
        script.statements().collect::<Vec<_>>(),
        vec!["GRANT INSERT, UPDATE ON table1 TO c42; -- Change"]
    );
}

#[tokio::test]
async fn empty_category_produces_an_empty_script() {
    let source = MockSource::new();
    let rows = source.fetch(Category::Trigger).await.unwrap();
    assert!(rows.is_empty());

    let ctx = DiffContext::default();
    let mut left = schema_object(Category::Trigger, rows.clone(), &ctx);
    let mut right = schema_object(Category::Trigger, rows, &ctx);
    let mut script = Script::new();
    diff(left.as_mut(), right.as_mut(), &mut script);
    assert!(script.is_empty());
}
