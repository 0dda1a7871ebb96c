//! Foreign key reconciliation
//!
//! Record fields: `fk_name`, `table_name`, `constraint_def`.
//!
//! Keys match on (table, constraint body), not on constraint name — a
//! foreign key whose only difference is its name is left alone.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct ForeignKeyDiff {
    cursor: Cursor,
}

impl ForeignKeyDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for ForeignKeyDiff {
    fn category(&self) -> Category {
        Category::ForeignKey
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self
                .get("table_name")
                .cmp(peer.get("table_name"))
                .then_with(|| self.get("constraint_def").cmp(peer.get("constraint_def"))),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        script.stmt(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {};",
            self.get("table_name"),
            self.get("fk_name"),
            self.get("constraint_def")
        ));
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}; -- {}",
            self.get("table_name"),
            self.get("fk_name"),
            self.get("constraint_def")
        ));
    }

    fn emit_mutate(&self, _peer: &dyn SchemaObject, _script: &mut Script) {
        // There is no altering a foreign key in place. Since the comparison
        // key already includes the constraint body, matching keys mean
        // matching definitions; anything else was created or dropped above.
        // Recreating a live foreign key cascades too unpredictably to
        // automate.
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

    fn fk(table: &str, name: &str, def: &str) -> Record {
        record(&[
            ("table_name", table),
            ("fk_name", name),
            ("constraint_def", def),
        ])
    }

    fn run(left: Vec<Record>, right: Vec<Record>) -> Vec<String> {
        let mut script = Script::new();
        let mut left = ForeignKeyDiff::new(left);
        let mut right = ForeignKeyDiff::new(right);
        diff(&mut left, &mut right, &mut script);
        script.statements().map(String::from).collect()
    }

    #[test]
    fn missing_key_is_added_with_its_body() {
        let stmts = run(
            vec![fk(
                "t_child",
                "t_child_parent_fk",
                "FOREIGN KEY (parent_id) REFERENCES t_parent(id)",
            )],
            vec![],
        );
        assert_eq!(
            stmts,
            vec![
                "ALTER TABLE t_child ADD CONSTRAINT t_child_parent_fk \
                 FOREIGN KEY (parent_id) REFERENCES t_parent(id);"
            ]
        );
    }

    #[test]
    fn changed_body_drops_the_old_and_adds_the_new() {
        // Same constraint name, different body: the composite key treats
        // these as two different objects
        let stmts = run(
            vec![fk(
                "t_child",
                "fk1",
                "FOREIGN KEY (parent_id) REFERENCES t_parent(id) ON DELETE CASCADE",
            )],
            vec![fk(
                "t_child",
                "fk1",
                "FOREIGN KEY (parent_id) REFERENCES t_parent(id)",
            )],
        );
        // The plain body sorts before the CASCADE body, so the drop of the
        // outdated key lands first
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("DROP CONSTRAINT"));
        assert!(stmts[1].contains("ADD CONSTRAINT"));
    }

    #[test]
    fn matching_keys_emit_nothing() {
        let rows = vec![fk("t", "fk1", "FOREIGN KEY (a) REFERENCES b(id)")];
        assert!(run(rows.clone(), rows).is_empty());
    }
}
