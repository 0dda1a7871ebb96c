//! Materialized view reconciliation
//!
//! Record fields: `matviewname` (schema-qualified), `definition`,
//! `indexdef` (the matview's index definitions, pre-joined by the catalog
//! query, possibly empty).

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct MatViewDiff {
    cursor: Cursor,
}

impl MatViewDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for MatViewDiff {
    fn category(&self) -> Category {
        Category::MatView
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self.get("matviewname").cmp(peer.get("matviewname")),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        script.stmt(format!(
            "CREATE MATERIALIZED VIEW {} AS {}",
            self.get("matviewname"),
            self.get("definition")
        ));
        // Replay the matview's indexes alongside it
        if !self.get("indexdef").is_empty() {
            script.stmt(self.get("indexdef").to_string());
        }
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!(
            "DROP MATERIALIZED VIEW {};",
            self.get("matviewname")
        ));
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
