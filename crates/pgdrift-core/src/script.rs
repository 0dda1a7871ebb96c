//! The DDL output sink
//!
//! Category policies write statements and advisory comments here as the
//! diff engine drives them; the CLI renders the result to stdout. Statements
//! are never batched or wrapped in a transaction — the output is for human
//! review before execution.

use crate::diag::Severity;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// One rendered line of output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A DDL statement, emitted verbatim (terminators included by the caller)
    Statement(String),

    /// An advisory `--` comment
    Comment(String),
}

/// Running counts over a script, for the CLI summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStats {
    /// DDL statements emitted
    pub statements: usize,

    /// Warning comments emitted
    pub warnings: usize,

    /// Error comments emitted (each marks a skipped action)
    pub errors: usize,
}

/// An ordered sequence of DDL statements and advisory comments
#[derive(Debug, Clone, Default)]
pub struct Script {
    lines: Vec<Line>,
    stats: ScriptStats,
}

impl Script {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a DDL statement
    pub fn stmt(&mut self, sql: impl Into<String>) {
        self.stats.statements += 1;
        self.lines.push(Line::Statement(sql.into()));
    }

    /// Append a plain `--` comment
    pub fn comment(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Comment(text.into()));
    }

    /// Append a warning comment
    pub fn warn(&mut self, text: impl Into<String>) {
        self.stats.warnings += 1;
        self.lines.push(Line::Comment(format!(
            "{}: {}",
            Severity::Warning.prefix(),
            text.into()
        )));
    }

    /// Append an error comment; the caller is expected to have skipped the
    /// action it was about to take
    pub fn error(&mut self, text: impl Into<String>) {
        self.stats.errors += 1;
        self.lines.push(Line::Comment(format!(
            "{}: {}",
            Severity::Error.prefix(),
            text.into()
        )));
    }

    /// Append a multi-statement definition between explicit markers.
    ///
    /// Function and trigger bodies contain semicolons of their own; the
    /// markers let a reviewer split the script safely.
    pub fn stmt_block(&mut self, definition: impl Into<String>) {
        self.comment("STATEMENT-BEGIN");
        self.stmt(definition);
        self.comment("STATEMENT-END");
    }

    /// Lines in emission order
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Just the DDL statements, in emission order
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Statement(sql) => Some(sql.as_str()),
            Line::Comment(_) => None,
        })
    }

    /// Running counts
    pub fn stats(&self) -> ScriptStats {
        self.stats
    }

    /// True when nothing has been emitted
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render to SQL text, comments prefixed with `--`
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Statement(sql) => {
                    out.push_str(sql);
                    out.push('\n');
                }
                Line::Comment(text) => {
                    out.push_str("-- ");
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
        out
    }

    /// Write the rendered script to a sink
    pub fn write_to(&self, w: &mut dyn Write) -> io::Result<()> {
        w.write_all(self.render().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_statements_and_comments() {
        let mut script = Script::new();
        script.comment("db1: dev");
        script.stmt("DROP TABLE IF EXISTS public.t_old;");
        script.warn("the next statement may lose data");
        script.stmt("ALTER TABLE public.t ALTER COLUMN c TYPE character varying(50);");

        let text = script.render();
        assert_eq!(
            text,
            "-- db1: dev\n\
             DROP TABLE IF EXISTS public.t_old;\n\
             -- WARNING: the next statement may lose data\n\
             ALTER TABLE public.t ALTER COLUMN c TYPE character varying(50);\n"
        );
        assert_eq!(script.stats().statements, 2);
        assert_eq!(script.stats().warnings, 1);
    }

    #[test]
    fn statement_iterator_skips_comments() {
        let mut script = Script::new();
        script.comment("header");
        script.stmt("CREATE SCHEMA x AUTHORIZATION y;");
        let stmts: Vec<_> = script.statements().collect();
        assert_eq!(stmts, vec!["CREATE SCHEMA x AUTHORIZATION y;"]);
    }

    #[test]
    fn block_wraps_definition_in_markers() {
        let mut script = Script::new();
        script.stmt_block("CREATE OR REPLACE FUNCTION f() ...");
        let text = script.render();
        assert!(text.starts_with("-- STATEMENT-BEGIN\n"));
        assert!(text.ends_with("-- STATEMENT-END\n"));
    }
}
