//! Ownership reconciliation for tables, sequences, and views
//!
//! Record fields: `schema`, `relationship_name`, `owner`, `type`
//! (`TABLE`/`SEQUENCE`/`VIEW`).
//!
//! Ownership only changes on an object both sides have; a missing or extra
//! object cannot have its owner reconciled, so create and drop degrade to
//! advisory notices pointing at the category that manages existence.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct OwnerDiff {
    cursor: Cursor,
}

impl OwnerDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for OwnerDiff {
    fn category(&self) -> Category {
        Category::Owner
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self
                .get("relationship_name")
                .cmp(peer.get("relationship_name")),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        script.comment(format!(
            "Notice: the target has no {} named {}. Run the {} diff first.",
            self.get("type"),
            self.get("relationship_name"),
            self.get("type").to_lowercase()
        ));
    }

    fn emit_drop(&self, script: &mut Script) {
        script.comment(format!(
            "Notice: the target has a {} the source does not: {}. Cannot compare owners.",
            self.get("type"),
            self.get("relationship_name")
        ));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };
        if self.get("owner") != peer.get("owner") {
            script.stmt(format!(
                "ALTER {} {} OWNER TO {};",
                self.get("type"),
                self.get("relationship_name"),
                self.get("owner")
            ));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
