//! PostgreSQL record source
//!
//! Runs one introspection query per category against pg_catalog /
//! information_schema and textualizes every value: booleans come back as
//! `"true"`/`"false"` and SQL NULL as the literal `"null"`, which is the
//! record contract the diff policies rely on. The casts happen in SQL
//! (`::text`, `COALESCE(..., 'null')`) so the wire format is always text.
//!
//! Built only with the `postgres` feature; without it, `connect` returns a
//! configuration error.

use crate::source::FetchError;
use pgdrift_core::{ConnectionConfig, SchemaScope};

#[cfg(feature = "postgres")]
use crate::source::RecordSource;
#[cfg(feature = "postgres")]
use async_trait::async_trait;
#[cfg(feature = "postgres")]
use native_tls::TlsConnector;
#[cfg(feature = "postgres")]
use pgdrift_core::record::NULL_SENTINEL;
#[cfg(feature = "postgres")]
use pgdrift_core::{Category, Record};
#[cfg(feature = "postgres")]
use postgres_native_tls::MakeTlsConnector;
#[cfg(feature = "postgres")]
use tokio_postgres::{Client, NoTls};

/// Record source backed by a live PostgreSQL connection
pub struct PostgresSource {
    #[cfg(feature = "postgres")]
    client: Client,

    /// Schema scope the introspection queries are filtered to
    #[allow(dead_code)]
    scope: SchemaScope,

    #[cfg(not(feature = "postgres"))]
    _phantom: std::marker::PhantomData<()>,
}

impl PostgresSource {
    /// Connect without TLS
    #[cfg(feature = "postgres")]
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, FetchError> {
        let params = Self::params(config);
        let (client, connection) = tokio_postgres::connect(&params, NoTls)
            .await
            .map_err(|e| {
                FetchError::AuthenticationError(format!(
                    "failed to connect to {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        let host = config.host.clone();
        let port = config.port;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("PostgreSQL connection error ({}:{}): {}", host, port, e);
            }
        });

        Ok(Self {
            client,
            scope: config.scope(),
        })
    }

    /// Connect with TLS via native-tls
    #[cfg(feature = "postgres")]
    pub async fn connect_with_tls(config: &ConnectionConfig) -> Result<Self, FetchError> {
        let connector = TlsConnector::builder()
            .build()
            .map_err(|e| FetchError::ConfigError(format!("failed to create TLS connector: {}", e)))?;
        let tls = MakeTlsConnector::new(connector);

        let params = Self::params(config);
        let (client, connection) = tokio_postgres::connect(&params, tls)
            .await
            .map_err(|e| {
                FetchError::AuthenticationError(format!(
                    "failed to connect to {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        let host = config.host.clone();
        let port = config.port;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("PostgreSQL connection error ({}:{}): {}", host, port, e);
            }
        });

        Ok(Self {
            client,
            scope: config.scope(),
        })
    }

    /// Create without the postgres feature (always an error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect(_config: &ConnectionConfig) -> Result<Self, FetchError> {
        Err(FetchError::ConfigError(
            "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
                .to_string(),
        ))
    }

    #[cfg(feature = "postgres")]
    fn params(config: &ConnectionConfig) -> String {
        let mut params = format!(
            "host={} port={} dbname={} user={} password={}",
            config.host, config.port, config.dbname, config.user, config.password
        );
        if !config.options.is_empty() {
            params.push(' ');
            params.push_str(&config.options);
        }
        params
    }

    /// Scope predicate over a schema-name column
    #[cfg(feature = "postgres")]
    fn schema_filter(&self, column: &str) -> String {
        schema_filter(&self.scope, column)
    }

    #[cfg(feature = "postgres")]
    async fn query_records(&self, sql: &str) -> Result<Vec<Record>, FetchError> {
        let rows = self
            .client
            .query(sql, &[])
            .await
            .map_err(|e| FetchError::QueryError(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = Record::new();
            for (idx, column) in row.columns().iter().enumerate() {
                let value: Option<String> = row.try_get(idx).map_err(|e| {
                    FetchError::InvalidResponse(format!("column {}: {}", column.name(), e))
                })?;
                record.set(
                    column.name(),
                    value.unwrap_or_else(|| NULL_SENTINEL.to_string()),
                );
            }
            records.push(record);
        }
        Ok(records)
    }

    #[cfg(feature = "postgres")]
    fn query_for(&self, category: Category) -> String {
        match category {
            Category::Schemata => r#"
SELECT schema_name::text AS schema_name
     , schema_owner::text AS schema_owner
FROM information_schema.schemata
WHERE schema_name NOT LIKE 'pg_%'
  AND schema_name <> 'information_schema'
ORDER BY schema_name
"#
            .to_string(),

            Category::Role => r#"
SELECT r.rolname::text AS rolname
     , r.rolsuper::text AS rolsuper
     , r.rolinherit::text AS rolinherit
     , r.rolcreaterole::text AS rolcreaterole
     , r.rolcreatedb::text AS rolcreatedb
     , r.rolcanlogin::text AS rolcanlogin
     , r.rolconnlimit::text AS rolconnlimit
     , COALESCE(r.rolvaliduntil::text, 'null') AS rolvaliduntil
     , r.rolreplication::text AS rolreplication
     , ARRAY(SELECT b.rolname
             FROM pg_catalog.pg_auth_members m
             JOIN pg_catalog.pg_roles b ON (m.roleid = b.oid)
             WHERE m.member = r.oid)::text AS memberof
FROM pg_catalog.pg_roles AS r
ORDER BY r.rolname
"#
            .to_string(),

            Category::Function => format!(
                r#"
SELECT n.nspname || '.' || p.oid::regprocedure::text AS function_name
     , t.typname::text AS return_type
     , pg_get_functiondef(p.oid) AS definition
FROM pg_proc AS p
JOIN pg_type t ON (p.prorettype = t.oid)
JOIN pg_namespace n ON (n.oid = p.pronamespace)
JOIN pg_language l ON (p.prolang = l.oid AND l.lanname IN ('c', 'plpgsql', 'sql'))
WHERE {}
ORDER BY function_name
"#,
                self.schema_filter("n.nspname")
            ),

            Category::Sequence => format!(
                r#"
SELECT sequence_schema || '.' || sequence_name AS sequence_name
     , data_type::text AS data_type
     , start_value::text AS start_value
     , minimum_value::text AS minimum_value
     , maximum_value::text AS maximum_value
     , increment::text AS increment
     , cycle_option::text AS cycle_option
FROM information_schema.sequences
WHERE {}
ORDER BY sequence_name
"#,
                self.schema_filter("sequence_schema")
            ),

            Category::Table => format!(
                r#"
SELECT table_schema || '.' || table_name AS table_name
     , CASE table_type WHEN 'BASE TABLE' THEN 'TABLE' ELSE table_type::text END AS table_type
     , is_insertable_into::text AS is_insertable_into
FROM information_schema.tables
WHERE table_type = 'BASE TABLE'
  AND {}
ORDER BY table_name
"#,
                self.schema_filter("table_schema")
            ),

            Category::Column => {
                let compare_name = match &self.scope {
                    SchemaScope::All => "table_schema || '.' || table_name",
                    SchemaScope::Named(_) => "table_name::text",
                };
                format!(
                    r#"
SELECT table_schema::text AS table_schema
     , {} AS compare_name
     , table_name::text AS table_name
     , column_name::text AS column_name
     , data_type::text AS data_type
     , is_nullable::text AS is_nullable
     , COALESCE(column_default::text, 'null') AS column_default
     , COALESCE(character_maximum_length::text, 'null') AS character_maximum_length
FROM information_schema.columns
WHERE is_updatable = 'YES'
  AND {}
ORDER BY compare_name, column_name
"#,
                    compare_name,
                    self.schema_filter("table_schema")
                )
            }

            Category::Index => format!(
                r#"
SELECT c.relname::text AS table_name
     , c2.relname::text AS index_name
     , i.indisprimary::text AS pk
     , i.indisunique::text AS uq
     , pg_catalog.pg_get_indexdef(i.indexrelid, 0, true) AS index_def
     , COALESCE(pg_catalog.pg_get_constraintdef(con.oid, true), 'null') AS constraint_def
     , COALESCE(con.contype::text, 'null') AS typ
FROM pg_catalog.pg_index AS i
JOIN pg_catalog.pg_class AS c ON (c.oid = i.indrelid)
JOIN pg_catalog.pg_class AS c2 ON (c2.oid = i.indexrelid)
LEFT JOIN pg_catalog.pg_constraint con
    ON (con.conrelid = i.indrelid AND con.conindid = i.indexrelid AND con.contype IN ('p', 'u', 'x'))
JOIN pg_catalog.pg_namespace AS n ON (c2.relnamespace = n.oid)
WHERE c.relname NOT LIKE 'pg_%'
  AND {}
ORDER BY table_name, index_name
"#,
                self.schema_filter("n.nspname")
            ),

            Category::View => format!(
                r#"
SELECT schemaname || '.' || viewname AS viewname
     , definition
FROM pg_views
WHERE {}
ORDER BY viewname
"#,
                self.schema_filter("schemaname")
            ),

            Category::MatView => format!(
                r#"
WITH matviews AS (
    SELECT schemaname || '.' || matviewname AS matviewname
         , definition
    FROM pg_catalog.pg_matviews
    WHERE {}
)
SELECT matviewname
     , definition
     , COALESCE(string_agg(indexdef, ';' || E'\n\n') || ';', '') AS indexdef
FROM matviews
LEFT JOIN pg_catalog.pg_indexes ON matviewname = schemaname || '.' || tablename
GROUP BY matviewname, definition
ORDER BY matviewname
"#,
                self.schema_filter("schemaname")
            ),

            Category::Owner => format!(
                r#"
SELECT n.nspname::text AS schema
     , c.relname::text AS relationship_name
     , a.rolname::text AS owner
     , CASE WHEN c.relkind = 'r' THEN 'TABLE'
            WHEN c.relkind = 'S' THEN 'SEQUENCE'
            WHEN c.relkind = 'v' THEN 'VIEW'
            ELSE c.relkind::text END AS type
FROM pg_class AS c
INNER JOIN pg_roles AS a ON (a.oid = c.relowner)
INNER JOIN pg_namespace AS n ON (n.oid = c.relnamespace)
WHERE c.relkind IN ('r', 'S', 'v')
  AND {}
ORDER BY relationship_name
"#,
                self.schema_filter("n.nspname")
            ),

            Category::ForeignKey => r#"
SELECT c.conname::text AS fk_name
     , cl.relname::text AS table_name
     , pg_catalog.pg_get_constraintdef(c.oid, true) AS constraint_def
FROM pg_catalog.pg_constraint c
INNER JOIN pg_class AS cl ON (c.conrelid = cl.oid)
WHERE c.contype = 'f'
ORDER BY table_name, constraint_def
"#
            .to_string(),

            Category::GrantRelationship => {
                let compare_name = match &self.scope {
                    SchemaScope::All => "n.nspname || '.' || c.relkind::text || '.' || c.relname",
                    SchemaScope::Named(_) => "c.relkind::text || '.' || c.relname",
                };
                format!(
                    r#"
SELECT n.nspname::text AS schema_name
     , {} AS compare_name
     , CASE c.relkind
         WHEN 'r' THEN 'TABLE'
         WHEN 'v' THEN 'VIEW'
         WHEN 'S' THEN 'SEQUENCE'
         WHEN 'f' THEN 'FOREIGN TABLE'
       END AS type
     , c.relname::text AS relationship_name
     , unnest(c.relacl)::text AS relationship_acl
FROM pg_catalog.pg_class c
LEFT JOIN pg_catalog.pg_namespace n ON (n.oid = c.relnamespace)
WHERE c.relkind IN ('r', 'v', 'S', 'f')
  AND pg_catalog.pg_table_is_visible(c.oid)
  AND {}
ORDER BY n.nspname, c.relname
"#,
                    compare_name,
                    self.schema_filter("n.nspname")
                )
            }

            Category::GrantAttribute => format!(
                r#"
SELECT n.nspname::text AS schema
     , CASE c.relkind
         WHEN 'r' THEN 'TABLE'
         WHEN 'v' THEN 'VIEW'
         WHEN 'f' THEN 'FOREIGN TABLE'
       END AS type
     , c.relname::text AS relationship_name
     , a.attname::text AS attribute_name
     , a.attacl::text AS attribute_acl
FROM pg_catalog.pg_class c
LEFT JOIN pg_catalog.pg_namespace n ON (n.oid = c.relnamespace)
INNER JOIN (SELECT attname, unnest(attacl) AS attacl, attrelid
            FROM pg_catalog.pg_attribute
            WHERE NOT attisdropped AND attacl IS NOT NULL)
      AS a ON (a.attrelid = c.oid)
WHERE c.relkind IN ('r', 'v', 'f')
  AND pg_catalog.pg_table_is_visible(c.oid)
  AND {}
ORDER BY n.nspname, c.relname, a.attname
"#,
                self.schema_filter("n.nspname")
            ),

            Category::Trigger => format!(
                r#"
SELECT n.nspname || '.' || c.relname AS table_name
     , t.tgname::text AS trigger_name
     , pg_catalog.pg_get_triggerdef(t.oid, true) AS definition
     , t.tgenabled::text AS enabled
FROM pg_catalog.pg_trigger t
INNER JOIN pg_catalog.pg_class c ON (c.oid = t.tgrelid)
INNER JOIN pg_catalog.pg_namespace n ON (n.oid = c.relnamespace)
WHERE {}
ORDER BY table_name, trigger_name
"#,
                self.schema_filter("n.nspname")
            ),
        }
    }
}

#[cfg(feature = "postgres")]
#[async_trait]
impl RecordSource for PostgresSource {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    async fn fetch(&self, category: Category) -> Result<Vec<Record>, FetchError> {
        let sql = self.query_for(category);
        self.query_records(&sql).await
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        self.client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| FetchError::QueryError(e.to_string()))?;
        Ok(())
    }
}

/// Scope predicate over a schema-name column
fn schema_filter(scope: &SchemaScope, column: &str) -> String {
    match scope {
        SchemaScope::All => format!(
            "{col} NOT LIKE 'pg_%' AND {col} <> 'information_schema'",
            col = column
        ),
        SchemaScope::Named(name) => format!("{} = '{}'", column, name.replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_scope_filters_to_one_schema() {
        assert_eq!(
            schema_filter(&SchemaScope::Named("public".into()), "n.nspname"),
            "n.nspname = 'public'"
        );
    }

    #[test]
    fn wildcard_scope_excludes_system_schemas() {
        let filter = schema_filter(&SchemaScope::All, "table_schema");
        assert!(filter.contains("NOT LIKE 'pg_%'"));
        assert!(filter.contains("<> 'information_schema'"));
    }

    #[test]
    fn quotes_in_schema_names_are_escaped() {
        assert_eq!(
            schema_filter(&SchemaScope::Named("o'brien".into()), "n.nspname"),
            "n.nspname = 'o''brien'"
        );
    }
}
