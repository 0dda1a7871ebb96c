//! Namespace (schema) reconciliation
//!
//! Record fields: `schema_name`, `schema_owner`.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct SchemataDiff {
    cursor: Cursor,
}

impl SchemataDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for SchemataDiff {
    fn category(&self) -> Category {
        Category::Schemata
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self.get("schema_name").cmp(peer.get("schema_name")),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        script.stmt(format!(
            "CREATE SCHEMA {} AUTHORIZATION {};",
            self.get("schema_name"),
            self.get("schema_owner")
        ));
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!(
            "DROP SCHEMA IF EXISTS {};",
            self.get("schema_name")
        ));
    }

    fn emit_mutate(&self, _peer: &dyn SchemaObject, _script: &mut Script) {
        // A namespace has no attributes worth altering here; its contents
        // are reconciled by the other categories
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
    use pretty_assertions::assert_eq;

    fn run(left: Vec<Record>, right: Vec<Record>) -> Script {
        let mut script = Script::new();
        let mut left = SchemataDiff::new(left);
        let mut right = SchemataDiff::new(right);
        diff(&mut left, &mut right, &mut script);
        script
    }

    #[test]
    fn creates_missing_schema_with_owner() {
        let script = run(
            vec![record(&[("schema_name", "reporting"), ("schema_owner", "c42")])],
            vec![],
        );
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec!["CREATE SCHEMA reporting AUTHORIZATION c42;"]
        );
    }

    #[test]
    fn drops_extra_schema() {
        let script = run(
            vec![],
            vec![record(&[("schema_name", "scratch"), ("schema_owner", "c42")])],
        );
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec!["DROP SCHEMA IF EXISTS scratch;"]
        );
    }

    #[test]
    fn matching_schemas_emit_nothing() {
        let rows = vec![record(&[("schema_name", "public"), ("schema_owner", "postgres")])];
        let script = run(rows.clone(), rows);
        assert!(script.is_empty());
    }
}
