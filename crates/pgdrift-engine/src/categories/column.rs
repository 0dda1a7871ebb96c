//! Column reconciliation
//!
//! Record fields: `table_schema`, `compare_name` (the sort key: table name,
//! schema-qualified under the `*` scope), `table_name`, `column_name`,
//! `data_type`, `is_nullable` (`YES`/`NO`), `column_default` (`"null"` when
//! absent), `character_maximum_length` (`"null"` when not applicable).
//!
//! The richest mutate policy in the system: type, varchar length, default,
//! and nullability are each diffed independently, and risky changes are
//! emitted with a warning comment rather than suppressed — the risk is the
//! operator's to accept.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::record::NULL_SENTINEL;
use pgdrift_core::{Category, DiffContext, Record, SchemaScope, Script};
use std::any::Any;
use std::cmp::Ordering;

const VARCHAR: &str = "character varying";

/// Resolve a `character_maximum_length` value.
///
/// Returns the length and whether it was actually present; an absent length
/// falls back to 1024.
fn max_length(raw: &str) -> (&str, bool) {
    if raw == NULL_SENTINEL {
        ("1024", false)
    } else {
        (raw, true)
    }
}

pub struct ColumnDiff {
    cursor: Cursor,
    ctx: DiffContext,
}

impl ColumnDiff {
    pub fn new(rows: Vec<Record>, ctx: DiffContext) -> Self {
        Self {
            cursor: Cursor::new(rows),
            ctx,
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }

    /// The schema qualifier for DDL aimed at the target database
    fn target_schema(&self) -> &str {
        match &self.ctx.right_scope {
            // Wildcard scope: each record carries its own schema
            SchemaScope::All => self.get("table_schema"),
            SchemaScope::Named(name) => name,
        }
    }
}

impl SchemaObject for ColumnDiff {
    fn category(&self) -> Category {
        Category::Column
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self
                .get("compare_name")
                .cmp(peer.get("compare_name"))
                .then_with(|| self.get("column_name").cmp(peer.get("column_name"))),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        let schema = self.target_schema();
        let table = self.get("table_name");
        let column = self.get("column_name");
        let data_type = self.get("data_type");

        let mut sql = if data_type == VARCHAR {
            let (length, valid) = max_length(self.get("character_maximum_length"));
            if valid {
                format!(
                    "ALTER TABLE {}.{} ADD COLUMN {} character varying({})",
                    schema, table, column, length
                )
            } else {
                format!(
                    "ALTER TABLE {}.{} ADD COLUMN {} character varying",
                    schema, table, column
                )
            }
        } else {
            if data_type == "ARRAY" {
                script.comment("Note that adding of array data types are not yet generated properly.");
            }
            format!(
                "ALTER TABLE {}.{} ADD COLUMN {} {}",
                schema, table, column, data_type
            )
        };

        if self.get("is_nullable") == "NO" {
            sql.push_str(" NOT NULL");
        }
        if self.cursor.has("column_default") {
            sql.push_str(&format!(" DEFAULT {}", self.get("column_default")));
        }
        sql.push(';');
        script.stmt(sql);
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!(
            "ALTER TABLE {}.{} DROP COLUMN IF EXISTS {};",
            self.get("table_schema"),
            self.get("table_name"),
            self.get("column_name")
        ));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };

        // Emitted DDL targets the peer (right) database's schema but names
        // the object by the source record
        let schema = peer.get("table_schema");
        let table = self.get("table_name");
        let column = self.get("column_name");

        // Same type: the only in-type change handled is varchar length
        if self.get("data_type") == peer.get("data_type") && self.get("data_type") == VARCHAR {
            let (len1, len1_valid) = max_length(self.get("character_maximum_length"));
            let (_, len2_valid) = max_length(peer.get("character_maximum_length"));
            if !len1_valid && !len2_valid {
                // Both unbounded; leave them alone
            } else if (len1_valid || !len2_valid)
                && len1 != peer.get("character_maximum_length")
            {
                match (
                    len1.parse::<i64>(),
                    max_length(peer.get("character_maximum_length")).0.parse::<i64>(),
                ) {
                    (Ok(new_len), Ok(old_len)) => {
                        if new_len < old_len {
                            script.warn(
                                "The next statement will shorten a character varying column, \
                                 which may result in data loss.",
                            );
                        }
                        script.stmt(format!(
                            "ALTER TABLE {}.{} ALTER COLUMN {} TYPE character varying({});",
                            schema, table, column, len1
                        ));
                    }
                    _ => {
                        script.error(format!(
                            "non-numeric character_maximum_length for {}.{}.{}; skipping length change",
                            schema, table, column
                        ));
                    }
                }
            }
        }

        // Cross-type change: attempted verbatim, coercibility is not
        // validated here
        if self.get("data_type") != peer.get("data_type") {
            script.warn(format!(
                "This type change may not work well: ({} to {}).",
                peer.get("data_type"),
                self.get("data_type")
            ));
            if self.get("data_type").starts_with("character") {
                let (length, valid) = max_length(self.get("character_maximum_length"));
                if !valid {
                    script.warn("varchar column has no maximum length.  Setting to 1024");
                }
                script.stmt(format!(
                    "ALTER TABLE {}.{} ALTER COLUMN {} TYPE {}({});",
                    schema,
                    table,
                    column,
                    self.get("data_type"),
                    length
                ));
            } else {
                script.stmt(format!(
                    "ALTER TABLE {}.{} ALTER COLUMN {} TYPE {};",
                    schema,
                    table,
                    column,
                    self.get("data_type")
                ));
            }
        }

        // Default added, dropped, or changed
        if self.get("column_default") == NULL_SENTINEL {
            if peer.get("column_default") != NULL_SENTINEL {
                script.stmt(format!(
                    "ALTER TABLE {}.{} ALTER COLUMN {} DROP DEFAULT;",
                    schema, table, column
                ));
            }
        } else if self.get("column_default") != peer.get("column_default") {
            script.stmt(format!(
                "ALTER TABLE {}.{} ALTER COLUMN {} SET DEFAULT {};",
                schema,
                table,
                column,
                self.get("column_default")
            ));
        }

        // Nullability flipped
        if self.get("is_nullable") != peer.get("is_nullable") {
            if self.get("is_nullable") == "YES" {
                script.stmt(format!(
                    "ALTER TABLE {}.{} ALTER COLUMN {} DROP NOT NULL;",
                    schema, table, column
                ));
            } else {
                script.stmt(format!(
                    "ALTER TABLE {}.{} ALTER COLUMN {} SET NOT NULL;",
                    schema, table, column
                ));
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use pgdrift_core::record::record;
    use pgdrift_core::script::Line;
    use pretty_assertions::assert_eq;

    fn column(table: &str, name: &str, fields: &[(&str, &str)]) -> Record {
        let mut rec = record(&[
            ("table_schema", "public"),
            ("compare_name", table),
            ("table_name", table),
            ("column_name", name),
            ("data_type", "integer"),
            ("is_nullable", "YES"),
            ("column_default", "null"),
            ("character_maximum_length", "null"),
        ]);
        for (k, v) in fields {
            rec.set(*k, *v);
        }
        rec
    }

    fn run(left: Vec<Record>, right: Vec<Record>) -> Script {
        let mut script = Script::new();
        let ctx = DiffContext {
            left_scope: SchemaScope::Named("public".into()),
            right_scope: SchemaScope::Named("public".into()),
        };
        let mut left = ColumnDiff::new(left, ctx.clone());
        let mut right = ColumnDiff::new(right, ctx);
        diff(&mut left, &mut right, &mut script);
        script
    }

    #[test]
    fn order_sensitive_merge_visits_every_column_once() {
        // Literal fixture: verify the exact action sequence
        let left = vec![
            column("table1", "col1", &[]),
            column("table1", "col2", &[]),
            column("table2", "col1", &[]),
        ];
        let right = vec![
            column("table1", "col1", &[]),
            column("table2", "col1", &[]),
            column("table2", "col2", &[]),
        ];
        let script = run(left, right);
        let stmts: Vec<_> = script.statements().collect();
        assert_eq!(
            stmts,
            vec![
                // mutate(table1,col1) emits nothing; left-only col2 created
                "ALTER TABLE public.table1 ADD COLUMN col2 integer;",
                // mutate(table2,col1) emits nothing; right-only col2 dropped
                "ALTER TABLE public.table2 DROP COLUMN IF EXISTS col2;",
            ]
        );
    }

    #[test]
    fn add_column_carries_not_null_and_default() {
        let left = vec![column(
            "t",
            "status",
            &[
                ("data_type", "character varying"),
                ("character_maximum_length", "20"),
                ("is_nullable", "NO"),
                ("column_default", "'new'::character varying"),
            ],
        )];
        let script = run(left, vec![]);
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec![
                "ALTER TABLE public.t ADD COLUMN status character varying(20) \
                 NOT NULL DEFAULT 'new'::character varying;"
            ]
        );
    }

    #[test]
    fn shrinking_varchar_warns_before_the_alter() {
        let left = vec![column(
            "t",
            "name",
            &[
                ("data_type", "character varying"),
                ("character_maximum_length", "50"),
            ],
        )];
        let right = vec![column(
            "t",
            "name",
            &[
                ("data_type", "character varying"),
                ("character_maximum_length", "100"),
            ],
        )];
        let script = run(left, right);
        let lines = script.lines();
        assert_eq!(lines.len(), 2);
        match (&lines[0], &lines[1]) {
            (Line::Comment(warning), Line::Statement(alter)) => {
                assert!(warning.contains("data loss"), "warning line: {warning}");
                assert_eq!(
                    alter,
                    "ALTER TABLE public.t ALTER COLUMN name TYPE character varying(50);"
                );
            }
            other => panic!("expected warning then statement, got {other:?}"),
        }
    }

    #[test]
    fn growing_varchar_does_not_warn() {
        let left = vec![column(
            "t",
            "name",
            &[
                ("data_type", "character varying"),
                ("character_maximum_length", "200"),
            ],
        )];
        let right = vec![column(
            "t",
            "name",
            &[
                ("data_type", "character varying"),
                ("character_maximum_length", "100"),
            ],
        )];
        let script = run(left, right);
        assert_eq!(script.stats().warnings, 0);
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec!["ALTER TABLE public.t ALTER COLUMN name TYPE character varying(200);"]
        );
    }

    #[test]
    fn cross_type_change_is_attempted_with_a_warning() {
        let left = vec![column("t", "n", &[("data_type", "bigint")])];
        let right = vec![column("t", "n", &[("data_type", "integer")])];
        let script = run(left, right);
        assert_eq!(script.stats().warnings, 1);
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec!["ALTER TABLE public.t ALTER COLUMN n TYPE bigint;"]
        );
    }

    #[test]
    fn default_and_nullability_diff_independently() {
        let left = vec![column(
            "t",
            "c",
            &[("column_default", "0"), ("is_nullable", "NO")],
        )];
        let right = vec![column("t", "c", &[])];
        let script = run(left, right);
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec![
                "ALTER TABLE public.t ALTER COLUMN c SET DEFAULT 0;",
                "ALTER TABLE public.t ALTER COLUMN c SET NOT NULL;",
            ]
        );
    }

    #[test]
    fn null_sentinel_on_the_left_drops_the_default() {
        let left = vec![column("t", "c", &[])];
        let right = vec![column("t", "c", &[("column_default", "42")])];
        let script = run(left, right);
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec!["ALTER TABLE public.t ALTER COLUMN c DROP DEFAULT;"]
        );
    }

    #[test]
    fn wildcard_scope_uses_the_record_schema() {
        let ctx = DiffContext {
            left_scope: SchemaScope::All,
            right_scope: SchemaScope::All,
        };
        let mut rec = column("t", "c", &[]);
        rec.set("table_schema", "audit");
        rec.set("compare_name", "audit.t");
        let mut script = Script::new();
        let mut left = ColumnDiff::new(vec![rec], ctx.clone());
        let mut right = ColumnDiff::new(vec![], ctx);
        diff(&mut left, &mut right, &mut script);
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec!["ALTER TABLE audit.t ADD COLUMN c integer;"]
        );
    }
}
