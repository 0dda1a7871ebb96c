//! Sequence reconciliation
//!
//! Record fields: `sequence_name` (schema-qualified), `data_type`,
//! `start_value`, `minimum_value`, `maximum_value`, `increment`,
//! `cycle_option`.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct SequenceDiff {
    cursor: Cursor,
}

impl SequenceDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for SequenceDiff {
    fn category(&self) -> Category {
        Category::Sequence
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self.get("sequence_name").cmp(peer.get("sequence_name")),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        script.stmt(format!(
            "CREATE SEQUENCE {} INCREMENT {} MINVALUE {} MAXVALUE {} START {};",
            self.get("sequence_name"),
            self.get("increment"),
            self.get("minimum_value"),
            self.get("maximum_value"),
            self.get("start_value")
        ));
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!(
            "DROP SEQUENCE IF EXISTS {};",
            self.get("sequence_name")
        ));
    }

    fn emit_mutate(&self, _peer: &dyn SchemaObject, _script: &mut Script) {
        // Altering increment/bounds on a live sequence is not attempted
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
