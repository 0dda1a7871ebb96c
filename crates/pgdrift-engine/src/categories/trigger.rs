//! Trigger reconciliation
//!
//! Record fields: `table_name` (schema-qualified), `trigger_name`,
//! `definition` (the full `CREATE TRIGGER` statement), `enabled`.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct TriggerDiff {
    cursor: Cursor,
}

impl TriggerDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for TriggerDiff {
    fn category(&self) -> Category {
        Category::Trigger
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self
                .get("table_name")
                .cmp(peer.get("table_name"))
                .then_with(|| self.get("trigger_name").cmp(peer.get("trigger_name"))),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        script.stmt(format!("{};", self.get("definition")));
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!(
            "DROP TRIGGER {} ON {};",
            self.get("trigger_name"),
            self.get("table_name")
        ));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };
        if self.get("definition") != peer.get("definition") {
            // A trigger body cannot be altered in place: drop the stale one
            // explicitly, then recreate from the stored definition
            script.comment("This trigger looks different so we'll recreate it:");
            self.emit_drop(script);
            self.emit_create(script);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
