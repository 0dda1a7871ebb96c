//! Table reconciliation
//!
//! Record fields: `table_name` (schema-qualified), `table_type`.
//!
//! Only existence is reconciled here; a created table starts empty and the
//! column, index, and grant categories fill in the structure.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct TableDiff {
    cursor: Cursor,
}

impl TableDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for TableDiff {
    fn category(&self) -> Category {
        Category::Table
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self.get("table_name").cmp(peer.get("table_name")),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        script.stmt(format!(
            "CREATE {} {}();",
            self.get("table_type"),
            self.get("table_name")
        ));
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!(
            "DROP {} IF EXISTS {};",
            self.get("table_type"),
            self.get("table_name")
        ));
    }

    fn emit_mutate(&self, _peer: &dyn SchemaObject, _script: &mut Script) {
        // Structural differences belong to the column/index categories
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
