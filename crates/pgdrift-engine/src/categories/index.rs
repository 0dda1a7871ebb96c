//! Index reconciliation
//!
//! Record fields: `table_name`, `index_name`, `pk` (`"true"`/`"false"`),
//! `uq`, `index_def`, `constraint_def` (`"null"` unless the index backs a
//! primary-key/unique/exclusion constraint), `typ`.
//!
//! An index and the constraint it backs can diverge independently, so the
//! two definitions are compared separately. An index definition is never
//! ALTERed: the policy either moves the constraint or drops and recreates
//! the whole index.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::record::NULL_SENTINEL;
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct IndexDiff {
    cursor: Cursor,
}

impl IndexDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }

    /// `ADD CONSTRAINT ... USING INDEX` for a constraint-backed index
    fn emit_constraint_using_index(&self, script: &mut Script, only: bool) {
        let table = if only {
            format!("ONLY {}", self.get("table_name"))
        } else {
            self.get("table_name").to_string()
        };
        if self.get("pk") == "true" {
            script.stmt(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY USING INDEX {};",
                table,
                self.get("index_name"),
                self.get("index_name")
            ));
        } else if self.get("uq") == "true" {
            script.stmt(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE USING INDEX {};",
                table,
                self.get("index_name"),
                self.get("index_name")
            ));
        }
    }
}

impl SchemaObject for IndexDiff {
    fn category(&self) -> Category {
        Category::Index
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return Ordering::Greater;
        };

        if !self.cursor.done()
            && (self.get("table_name").is_empty() || self.get("index_name").is_empty())
        {
            script.error(format!(
                "comparing an index record with an empty table_name or index_name: {:?}",
                self.cursor.row()
            ));
        }

        self.get("table_name")
            .cmp(peer.get("table_name"))
            .then_with(|| self.get("index_name").cmp(peer.get("index_name")))
    }

    fn emit_create(&self, script: &mut Script) {
        if self.get("index_def") == NULL_SENTINEL || self.get("index_def").is_empty() {
            script.error(format!(
                "unexpected situation: there is no index_def for {} {}",
                self.get("table_name"),
                self.get("index_name")
            ));
            return;
        }

        // The index first, then the constraint that rides on it
        script.stmt(format!("{};", self.get("index_def")));
        if self.get("constraint_def") != NULL_SENTINEL {
            self.emit_constraint_using_index(script, true);
        }
    }

    fn emit_drop(&self, script: &mut Script) {
        if self.get("constraint_def") != NULL_SENTINEL {
            // A constraint-backed index must be dropped through its
            // constraint, not directly
            script.warn(
                "this may drop foreign keys pointing at this column. Make sure you re-run \
                 the foreign_key diff after running this SQL.",
            );
            script.stmt(format!(
                "ALTER TABLE ONLY {} DROP CONSTRAINT IF EXISTS {} CASCADE;",
                self.get("table_name"),
                self.get("index_name")
            ));
        }
        script.stmt(format!(
            "DROP INDEX IF EXISTS {};",
            self.get("index_name")
        ));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };

        // There should always be an index_def on both sides
        if self.get("index_def").is_empty() {
            script.error(format!(
                "unexpected situation: index_def is empty for {:?} (peer {:?})",
                self.cursor.row(),
                peer.cursor.row()
            ));
            return;
        }
        if peer.get("index_def").is_empty() {
            script.error(format!(
                "unexpected situation: index_def is empty for {:?} (peer {:?})",
                peer.cursor.row(),
                self.cursor.row()
            ));
            return;
        }

        if self.get("constraint_def") != peer.get("constraint_def") {
            script.comment(format!(
                "CHANGE: different constraint defs:\n--    {}\n--    {}",
                self.get("constraint_def"),
                peer.get("constraint_def")
            ));
            if self.get("constraint_def") == NULL_SENTINEL {
                // The owning constraint disappeared; the target's index is
                // now superfluous
                script.stmt(format!(
                    "DROP INDEX IF EXISTS {}; -- {}",
                    peer.get("index_name"),
                    peer.get("index_def")
                ));
            } else if peer.get("constraint_def") == NULL_SENTINEL {
                if self.get("index_def") == peer.get("index_def") {
                    // The index bodies already match: attach the newly
                    // required constraint to the existing index
                    self.emit_constraint_using_index(script, false);
                } else {
                    script.stmt(format!(
                        "DROP INDEX IF EXISTS {}; -- {}",
                        peer.get("index_name"),
                        peer.get("index_def")
                    ));
                }
            }
            // Both constraints present but different: left alone here; the
            // index-def branch below never runs on this path
        } else if self.get("index_def") != peer.get("index_def") {
            // Constraints match (possibly both absent). Tolerate cosmetic
            // differences expressible as a prefix relationship; anything
            // more is a real divergence
            if !self.get("index_def").starts_with(peer.get("index_def"))
                && !peer.get("index_def").starts_with(self.get("index_def"))
            {
                script.comment(format!(
                    "CHANGE: different index defs:\n--    {}\n--    {}",
                    self.get("index_def"),
                    peer.get("index_def")
                ));
                // Drop the index (and any constraint riding on it), then
                // recreate both from the source definition
                self.emit_drop(script);
                self.emit_create(script);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
