//! Role reconciliation
//!
//! Record fields: `rolname`, `rolsuper`, `rolinherit`, `rolcreaterole`,
//! `rolcreatedb`, `rolcanlogin`, `rolconnlimit`, `rolvaliduntil`,
//! `rolreplication` (booleans textualized as `"true"`/`"false"`), and
//! `memberof` — a curly-braced, comma-separated list of the groups this
//! role belongs to (`{admins,readers}`).
//!
//! Group membership is a set and is diffed with set difference; everything
//! else folds into a single CREATE/ALTER ROLE option string.

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::record::NULL_SENTINEL;
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

/// Split a `{a,b,c}` membership list into its member names
fn member_set(raw: &str) -> Vec<&str> {
    raw.trim_matches(|c| c == '{' || c == '}')
        .split(',')
        .filter(|m| !m.is_empty())
        .collect()
}

pub struct RoleDiff {
    cursor: Cursor,
}

impl RoleDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }

    /// `FLAG` when the field is `"true"`, otherwise `NOFLAG`
    fn option(&self, field: &str, on: &str, off: &str) -> String {
        if self.get(field) == "true" {
            format!(" {}", on)
        } else {
            format!(" {}", off)
        }
    }
}

impl SchemaObject for RoleDiff {
    fn category(&self) -> Category {
        Category::Role
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self.get("rolname").cmp(peer.get("rolname")),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        let mut options = String::from(" WITH PASSWORD 'changeme'");

        options.push_str(&self.option("rolcanlogin", "LOGIN", "NOLOGIN"));
        if self.get("rolsuper") == "true" {
            options.push_str(" SUPERUSER");
        }
        if self.get("rolcreatedb") == "true" {
            options.push_str(" CREATEDB");
        }
        if self.get("rolcreaterole") == "true" {
            options.push_str(" CREATEROLE");
        }
        options.push_str(&self.option("rolinherit", "INHERIT", "NOINHERIT"));
        options.push_str(&self.option("rolreplication", "REPLICATION", "NOREPLICATION"));

        if self.get("rolconnlimit") != "-1" && !self.get("rolconnlimit").is_empty() {
            options.push_str(&format!(" CONNECTION LIMIT {}", self.get("rolconnlimit")));
        }
        if self.get("rolvaliduntil") != NULL_SENTINEL && !self.get("rolvaliduntil").is_empty() {
            options.push_str(&format!(" VALID UNTIL '{}'", self.get("rolvaliduntil")));
        }

        script.stmt(format!("CREATE ROLE {}{};", self.get("rolname"), options));
    }

    fn emit_drop(&self, script: &mut Script) {
        script.stmt(format!("DROP ROLE {};", self.get("rolname")));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };

        let mut options = String::new();
        for (field, on, off) in [
            ("rolsuper", "SUPERUSER", "NOSUPERUSER"),
            ("rolcanlogin", "LOGIN", "NOLOGIN"),
            ("rolcreatedb", "CREATEDB", "NOCREATEDB"),
            ("rolcreaterole", "CREATEROLE", "NOCREATEROLE"),
            ("rolinherit", "INHERIT", "NOINHERIT"),
            ("rolreplication", "REPLICATION", "NOREPLICATION"),
        ] {
            if self.get(field) != peer.get(field) {
                options.push_str(&self.option(field, on, off));
            }
        }

        if self.get("rolconnlimit") != peer.get("rolconnlimit")
            && !self.get("rolconnlimit").is_empty()
        {
            options.push_str(&format!(" CONNECTION LIMIT {}", self.get("rolconnlimit")));
        }

        if self.get("rolvaliduntil") != peer.get("rolvaliduntil")
            && self.get("rolvaliduntil") != NULL_SENTINEL
        {
            options.push_str(&format!(" VALID UNTIL '{}'", self.get("rolvaliduntil")));
        }

        // Only alter if we have changes
        if !options.is_empty() {
            script.stmt(format!("ALTER ROLE {}{};", self.get("rolname"), options));
        }

        // Group membership is a plain set diff
        if self.get("memberof") != peer.get("memberof") {
            let members1 = member_set(self.get("memberof"));
            let members2 = member_set(peer.get("memberof"));

            for group in &members1 {
                if !members2.contains(group) {
                    script.stmt(format!("GRANT {} TO {};", group, self.get("rolname")));
                }
            }
            for group in &members2 {
                if !members1.contains(group) {
                    script.stmt(format!("REVOKE {} FROM {};", group, self.get("rolname")));
                }
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
