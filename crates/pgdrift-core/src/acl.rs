//! PostgreSQL ACL (access control list) grammar
//!
//! An ACL entry encodes who may do what to a relation or column:
//!
//! ```text
//! rolename=xxxx/grantor -- privileges granted to a role
//!         =xxxx/grantor -- privileges granted to PUBLIC
//! ```
//!
//! where each permission character maps to a keyword:
//! r SELECT, w UPDATE, a INSERT, d DELETE, D TRUNCATE, x REFERENCES,
//! t TRIGGER, X EXECUTE, U USAGE, C CREATE, c CONNECT, T TEMPORARY.
//! `arwdDxt` is ALL PRIVILEGES for tables; a trailing `*` marks the grant
//! option for the preceding privilege.

use crate::script::Script;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn acl_regex() -> &'static Regex {
    static ACL_REGEX: OnceLock<Regex> = OnceLock::new();
    ACL_REGEX.get_or_init(|| {
        Regex::new(r"([a-zA-Z0-9]+)*=([rwadDxtXUCcT]+)/([a-zA-Z0-9]+)$").expect("acl regex")
    })
}

/// Map a single permission character to its keyword, if known
fn permission_word(c: char) -> Option<&'static str> {
    match c {
        'a' => Some("INSERT"),
        'r' => Some("SELECT"),
        'w' => Some("UPDATE"),
        'd' => Some("DELETE"),
        'D' => Some("TRUNCATE"),
        'x' => Some("REFERENCES"),
        't' => Some("TRIGGER"),
        'X' => Some("EXECUTE"),
        'U' => Some("USAGE"),
        'C' => Some("CREATE"),
        'c' => Some("CONNECT"),
        'T' => Some("TEMPORARY"),
        _ => None,
    }
}

/// One parsed ACL entry: a role and its permission keywords
///
/// Permissions are kept sorted lexically so two entries compare and render
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    /// Grantee role; the empty role segment parses as `public`
    pub role: String,

    /// Sorted permission keywords (SELECT, UPDATE, ...)
    pub permissions: Vec<String>,
}

impl AclEntry {
    /// Comma-joined permission list for GRANT/REVOKE statements
    pub fn permission_list(&self) -> String {
        self.permissions.join(", ")
    }

    /// Permissions present here but absent from `other`
    pub fn missing_from(&self, other: &AclEntry) -> Vec<String> {
        self.permissions
            .iter()
            .filter(|p| !other.permissions.contains(p))
            .cloned()
            .collect()
    }
}

/// Parse just the role segment of an ACL entry.
///
/// Grant categories sort and match on the role alone; the permission set is
/// only expanded once two entries with the same role meet in a mutate.
pub fn parse_role(entry: &str) -> String {
    match acl_regex().captures(entry) {
        Some(caps) => {
            let role = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            if role.is_empty() {
                "public".to_string()
            } else {
                role.to_string()
            }
        }
        None => String::new(),
    }
}

/// Parse an ACL entry (e.g. `c42=aur/postgres`) into a role and its
/// permission keywords.
///
/// An empty input yields an empty entry, not an error. A permission
/// character with no table mapping is reported on `script` as a warning
/// and skipped.
pub fn parse_entry(entry: &str, script: &mut Script) -> AclEntry {
    let (role, perms) = match acl_regex().captures(entry) {
        Some(caps) => {
            let role = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let perms = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let role = if role.is_empty() { "public" } else { role };
            (role.to_string(), perms.to_string())
        }
        None => (String::new(), String::new()),
    };

    let mut permissions = Vec::new();
    for c in perms.chars() {
        match permission_word(c) {
            Some(word) => permissions.push(word.to_string()),
            None => {
                script.warn(format!(
                    "found permission character we haven't coded for: {}",
                    c
                ));
            }
        }
    }
    permissions.sort();

    AclEntry { role, permissions }
}

/// Parse a multi-line ACL blob (one entry per line) into entries sorted by
/// role.
///
/// A relation may be granted to several roles; each role is diffed
/// independently, so the list order must be deterministic.
pub fn parse_acl_list(blob: &str, script: &mut Script) -> Vec<AclEntry> {
    let mut entries: Vec<AclEntry> = blob
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_entry(line, script))
        .collect();
    entries.sort_by(|a, b| a.role.cmp(&b.role));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(entry: &str) -> AclEntry {
        let mut script = Script::new();
        parse_entry(entry, &mut script)
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let entry = parse("");
        assert_eq!(entry.role, "");
        assert!(entry.permissions.is_empty());
    }

    #[test]
    fn empty_role_means_public() {
        let entry = parse("=arwdDxt/c42");
        assert_eq!(entry.role, "public");
        assert_eq!(entry.permissions.len(), 7);
    }

    #[test]
    fn named_role_with_subset_of_permissions() {
        let entry = parse("user2=arwxt/postgres");
        assert_eq!(entry.role, "user2");
        assert_eq!(entry.permissions.len(), 5);
    }

    #[test]
    fn three_permission_entry() {
        let entry = parse("c42ro=rwa/c42");
        assert_eq!(entry.role, "c42ro");
        assert_eq!(
            entry.permissions,
            vec!["INSERT".to_string(), "SELECT".to_string(), "UPDATE".to_string()]
        );
    }

    #[test]
    fn permissions_are_sorted_lexically() {
        let entry = parse("c42=wra/postgres");
        assert_eq!(entry.permissions, vec!["INSERT", "SELECT", "UPDATE"]);
    }

    #[test]
    fn multi_line_blob_sorts_by_role() {
        let mut script = Script::new();
        let entries = parse_acl_list("c42ro=r/postgres\nc42=rwad/postgres", &mut script);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, "c42");
        assert_eq!(entries[1].role, "c42ro");
    }

    #[test]
    fn set_difference_between_entries() {
        let left = parse("c42=rwa/postgres");
        let right = parse("c42=r/postgres");
        assert_eq!(left.missing_from(&right), vec!["INSERT", "UPDATE"]);
        assert!(right.missing_from(&left).is_empty());
    }

    #[test]
    fn role_only_parse() {
        assert_eq!(parse_role("c42=rwa/postgres"), "c42");
        assert_eq!(parse_role("=r/postgres"), "public");
        assert_eq!(parse_role(""), "");
    }
}
