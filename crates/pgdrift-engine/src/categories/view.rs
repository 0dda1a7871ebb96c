//! View reconciliation
//!
//! Record fields: `viewname` (schema-qualified), `definition`.
//!
//! There is no partial ALTER for a view body: any definition difference is
//! a drop followed by a full re-create.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct ViewDiff {
    cursor: Cursor,
}

impl ViewDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for ViewDiff {
    fn category(&self) -> Category {
        Category::View
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self.get("viewname").cmp(peer.get("viewname")),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        script.stmt(format!(
            "CREATE VIEW {} AS {}",
            self.get("viewname"),
            self.get("definition")
        ));
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!("DROP VIEW {};", self.get("viewname")));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };
        if self.get("definition") != peer.get("definition") {
            self.emit_drop(script);
            self.emit_create(script);
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
    use pretty_assertions::assert_eq;

    fn view(name: &str, definition: &str) -> Record {
        record(&[("viewname", name), ("definition", definition)])
    }

    fn run(left: Vec<Record>, right: Vec<Record>) -> Vec<String> {
        let mut script = Script::new();
        let mut left = ViewDiff::new(left);
        let mut right = ViewDiff::new(right);
        diff(&mut left, &mut right, &mut script);
        script.statements().map(String::from).collect()
    }

    #[test]
    fn changed_definition_recreates_the_view() {
        let stmts = run(
            vec![view("public.v_active", "SELECT id FROM t WHERE active;")],
            vec![view("public.v_active", "SELECT id FROM t;")],
        );
        assert_eq!(
            stmts,
            vec![
                "DROP VIEW public.v_active;",
                "CREATE VIEW public.v_active AS SELECT id FROM t WHERE active;",
            ]
        );
    }

    #[test]
    fn identical_definition_emits_nothing() {
        let rows = vec![view("public.v", "SELECT 1;")];
        assert!(run(rows.clone(), rows).is_empty());
    }
}
