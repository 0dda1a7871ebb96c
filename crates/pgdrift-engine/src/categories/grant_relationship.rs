//! Relation-level grant reconciliation
//!
//! Record fields: `schema_name`, `compare_name` (relkind-qualified relation
//! name, schema-qualified under the `*` scope), `type`
//! (`TABLE`/`VIEW`/`SEQUENCE`/`FOREIGN TABLE`), `relationship_name`,
//! `relationship_acl` (one ACL entry, e.g. `c42=arw/postgres`).
//!
//! The relation name alone is coarser than identity — a relation carries
//! one ACL entry per grantee role — so the role is re-derived from the ACL
//! inside `compare` to refine the key. Matching (relation, role) pairs are
//! reconciled by set difference over permission words.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::acl::{parse_entry, parse_role};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct GrantRelationshipDiff {
    cursor: Cursor,
}

impl GrantRelationshipDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for GrantRelationshipDiff {
    fn category(&self) -> Category {
        Category::GrantRelationship
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return Ordering::Greater;
        };
        self.get("compare_name")
            .cmp(peer.get("compare_name"))
            .then_with(|| {
                parse_role(self.get("relationship_acl"))
                    .cmp(&parse_role(peer.get("relationship_acl")))
            })
    }

    fn emit_create(&self, script: &mut Script) {
        let entry = parse_entry(self.get("relationship_acl"), script);
        script.stmt(format!(
            "GRANT {} ON {} TO {}; -- Add",
            entry.permission_list(),
            self.get("relationship_name"),
            entry.role
        ));
    }

    fn emit_drop(&self, script: &mut Script) {
        let entry = parse_entry(self.get("relationship_acl"), script);
        script.stmt(format!(
            "REVOKE {} ON {} FROM {}; -- Drop",
            entry.permission_list(),
            self.get("relationship_name"),
            entry.role
        ));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };

        let ours = parse_entry(self.get("relationship_acl"), script);
        let theirs = parse_entry(peer.get("relationship_acl"), script);

        // Permissions the source has that the target lacks
        let grant_list = ours.missing_from(&theirs);
        if !grant_list.is_empty() {
            script.stmt(format!(
                "GRANT {} ON {} TO {}; -- Change",
                grant_list.join(", "),
                self.get("relationship_name"),
                ours.role
            ));
        }

        // Permissions the target has that the source lacks
        let revoke_list = theirs.missing_from(&ours);
        if !revoke_list.is_empty() {
            script.stmt(format!(
                "REVOKE {} ON {} FROM {}; -- Change",
                revoke_list.join(", "),
                self.get("relationship_name"),
                ours.role
            ));
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

    fn grant(compare_name: &str, relation: &str, acl: &str) -> Record {
        record(&[
            ("schema_name", "public"),
            ("compare_name", compare_name),
            ("type", "TABLE"),
            ("relationship_name", relation),
            ("relationship_acl", acl),
        ])
    }

    fn run(left: Vec<Record>, right: Vec<Record>) -> Vec<String> {
        let mut script = Script::new();
        let mut left = GrantRelationshipDiff::new(left);
        let mut right = GrantRelationshipDiff::new(right);
        diff(&mut left, &mut right, &mut script);
        script.statements().map(String::from).collect()
    }

    #[test]
    fn set_difference_grants_only_whats_missing() {
        // Same relation, same role, narrower permissions on the target:
        // exactly one GRANT for the missing words and no REVOKE
        let stmts = run(
            vec![grant("r.table1", "table1", "c42=rwa/postgres")],
            vec![grant("r.table1", "table1", "c42=r/postgres")],
        );
        assert_eq!(
            stmts,
            vec!["GRANT INSERT, UPDATE ON table1 TO c42; -- Change"]
        );
    }

    #[test]
    fn extra_permissions_on_the_target_are_revoked() {
        let stmts = run(
            vec![grant("r.table1", "table1", "c42=r/postgres")],
            vec![grant("r.table1", "table1", "c42=rwad/postgres")],
        );
        assert_eq!(
            stmts,
            vec!["REVOKE DELETE, INSERT, UPDATE ON table1 FROM c42; -- Change"]
        );
    }

    #[test]
    fn role_only_on_one_side_is_wholly_granted_or_revoked() {
        let stmts = run(
            vec![
                grant("r.table1", "table1", "c42=rwa/postgres"),
                grant("r.table1", "table1", "c42ro=r/postgres"),
            ],
            vec![grant("r.table1", "table1", "c42=rwa/postgres")],
        );
        assert_eq!(stmts, vec!["GRANT SELECT ON table1 TO c42ro; -- Add"]);
    }

    #[test]
    fn equal_acls_emit_nothing() {
        let rows = vec![grant("r.table1", "table1", "c42=arw/postgres")];
        assert!(run(rows.clone(), rows).is_empty());
    }
}
