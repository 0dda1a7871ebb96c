//! Column-level grant reconciliation
//!
//! Record fields: `schema`, `type` (`TABLE`/`VIEW`/`FOREIGN TABLE`),
//! `relationship_name`, `attribute_name`, `attribute_acl`.
//!
//! PostgreSQL assigns grants independently at the relation and column
//! granularities, so this category applies the same set-difference logic as
//! relation grants, one level deeper: the identity key is
//! (schema, relation, column, ACL role).

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::acl::{parse_entry, parse_role};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct GrantAttributeDiff {
    cursor: Cursor,
}

impl GrantAttributeDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for GrantAttributeDiff {
    fn category(&self) -> Category {
        Category::GrantAttribute
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return Ordering::Greater;
        };
        self.get("schema")
            .cmp(peer.get("schema"))
            .then_with(|| {
                self.get("relationship_name")
                    .cmp(peer.get("relationship_name"))
            })
            .then_with(|| self.get("attribute_name").cmp(peer.get("attribute_name")))
            .then_with(|| {
                parse_role(self.get("attribute_acl")).cmp(&parse_role(peer.get("attribute_acl")))
            })
    }

    fn emit_create(&self, script: &mut Script) {
        let entry = parse_entry(self.get("attribute_acl"), script);
        script.stmt(format!(
            "GRANT {} ({}) ON {} TO {}; -- Add",
            entry.permission_list(),
            self.get("attribute_name"),
            self.get("relationship_name"),
            entry.role
        ));
    }

    fn emit_drop(&self, script: &mut Script) {
        let entry = parse_entry(self.get("attribute_acl"), script);
        script.stmt(format!(
            "REVOKE {} ({}) ON {} FROM {}; -- Drop",
            entry.permission_list(),
            self.get("attribute_name"),
            self.get("relationship_name"),
            entry.role
        ));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };

        let ours = parse_entry(self.get("attribute_acl"), script);
        let theirs = parse_entry(peer.get("attribute_acl"), script);

        let grant_list = ours.missing_from(&theirs);
        if !grant_list.is_empty() {
            script.stmt(format!(
                "GRANT {} ({}) ON {} TO {}; -- Change",
                grant_list.join(", "),
                self.get("attribute_name"),
                self.get("relationship_name"),
                ours.role
            ));
        }

        let revoke_list = theirs.missing_from(&ours);
        if !revoke_list.is_empty() {
            script.stmt(format!(
                "REVOKE {} ({}) ON {} FROM {}; -- Change",
                revoke_list.join(", "),
                self.get("attribute_name"),
                self.get("relationship_name"),
                ours.role
            ));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
