//! Configuration (pgdrift.toml)
//!
//! Two connection descriptors, `[left]` and `[right]`. The left database is
//! the source of truth; the generated script is meant to be reviewed and
//! run against the right one. CLI flags override file values field by field.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which schemas a diff run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaScope {
    /// Every non-system schema (`*` on the command line); comparison keys
    /// are schema-qualified in this mode
    All,

    /// A single named schema
    Named(String),
}

impl SchemaScope {
    /// The wildcard spelling used on the command line and in config files
    pub const WILDCARD: &'static str = "*";

    /// Parse the textual form; `*` covers all non-system schemas
    pub fn parse(s: &str) -> SchemaScope {
        if s == Self::WILDCARD {
            SchemaScope::All
        } else {
            SchemaScope::Named(s.to_string())
        }
    }

    /// True for the `*` (all schemas) scope
    pub fn is_wildcard(&self) -> bool {
        matches!(self, SchemaScope::All)
    }

    /// The named schema, or `None` for the wildcard scope
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaScope::All => None,
            SchemaScope::Named(name) => Some(name),
        }
    }
}

impl Default for SchemaScope {
    fn default() -> Self {
        SchemaScope::All
    }
}

impl std::fmt::Display for SchemaScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaScope::All => write!(f, "{}", Self::WILDCARD),
            SchemaScope::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Connection settings for one side of the diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name
    #[serde(default)]
    pub dbname: String,

    /// Login user
    #[serde(default)]
    pub user: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Schema name, or `*` for all non-system schemas
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Extra libpq options (e.g. `sslmode=require`)
    #[serde(default)]
    pub options: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_schema() -> String {
    SchemaScope::WILDCARD.to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dbname: String::new(),
            user: String::new(),
            password: String::new(),
            schema: default_schema(),
            options: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// The schema scope this connection diffs over
    pub fn scope(&self) -> SchemaScope {
        SchemaScope::parse(&self.schema)
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Password deliberately omitted
        write!(
            f,
            "{}@{}:{}/{} schema={}",
            self.user, self.host, self.port, self.dbname, self.schema
        )
    }
}

/// The immutable comparison context handed to every category constructor.
///
/// Category policies that qualify emitted DDL by schema consult this value
/// rather than any shared state: with a named right-hand scope the DDL
/// targets that schema, and with the `*` scope each record's own schema
/// qualifier is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffContext {
    /// Schema scope of the left (source-of-truth) database
    pub left_scope: SchemaScope,

    /// Schema scope of the right (target) database
    pub right_scope: SchemaScope,
}

impl DiffContext {
    /// Build a context from the two connection configs
    pub fn new(left: &ConnectionConfig, right: &ConnectionConfig) -> Self {
        Self {
            left_scope: left.scope(),
            right_scope: right.scope(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Left (source-of-truth) database
    #[serde(default)]
    pub left: ConnectionConfig,

    /// Right (target) database
    #[serde(default)]
    pub right: ConnectionConfig,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Load config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Enforce the wildcard rule: if one side diffs all schemas, both must
    pub fn validate(&self) -> Result<(), ConfigError> {
        let left_wild = self.left.scope().is_wildcard();
        let right_wild = self.right.scope().is_wildcard();
        if left_wild != right_wild {
            return Err(ConfigError::MismatchedScope);
        }
        Ok(())
    }

    /// The comparison context for this pair of databases
    pub fn context(&self) -> DiffContext {
        DiffContext::new(&self.left, &self.right)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("if one schema is an asterisk, both must be")]
    MismatchedScope,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_scope_is_wildcard() {
        let config = Config::default();
        assert!(config.left.scope().is_wildcard());
        assert_eq!(config.left.host, "localhost");
        assert_eq!(config.left.port, 5432);
    }

    #[test]
    fn toml_roundtrip() {
        let toml = r#"
[left]
host = "dev.example.com"
dbname = "app"
user = "deploy"
schema = "public"

[right]
host = "prod.example.com"
dbname = "app"
user = "deploy"
schema = "public"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.left.host, "dev.example.com");
        assert_eq!(config.right.scope().name(), Some("public"));
    }

    #[test]
    fn wildcard_on_one_side_only_is_rejected() {
        let toml = r#"
[left]
schema = "*"

[right]
schema = "public"
"#;
        assert!(matches!(
            Config::from_toml(toml),
            Err(ConfigError::MismatchedScope)
        ));
    }

    #[test]
    fn context_carries_both_scopes() {
        let mut config = Config::default();
        config.left.schema = "public".to_string();
        config.right.schema = "public".to_string();
        let ctx = config.context();
        assert_eq!(ctx.right_scope.name(), Some("public"));
    }

    #[test]
    fn display_omits_password() {
        let mut conn = ConnectionConfig::default();
        conn.user = "u".into();
        conn.password = "secret".into();
        conn.dbname = "db".into();
        assert!(!conn.to_string().contains("secret"));
    }
}
