//! Function reconciliation
//!
//! Record fields: `function_name` (schema-qualified regprocedure, so
//! overloads get distinct keys), `return_type`, `definition` (the full
//! `CREATE OR REPLACE FUNCTION` text).

use crate::cursor::Cursor;
use crate::object::{expect_peer, SchemaObject};
use pgdrift_core::{Category, Record, Script};
use std::any::Any;
use std::cmp::Ordering;

pub struct FunctionDiff {
    cursor: Cursor,
}

impl FunctionDiff {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            cursor: Cursor::new(rows),
        }
    }

    fn get(&self, key: &str) -> &str {
        self.cursor.get(key)
    }
}

impl SchemaObject for FunctionDiff {
    fn category(&self) -> Category {
        Category::Function
    }

    fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    fn compare(&self, peer: &dyn SchemaObject, script: &mut Script) -> Ordering {
        match expect_peer::<Self>(peer, self.category(), script) {
            Some(peer) => self.get("function_name").cmp(peer.get("function_name")),
            None => Ordering::Greater,
        }
    }

    fn emit_create(&self, script: &mut Script) {
        // The definition is already a complete CREATE OR REPLACE statement
        script.stmt_block(self.get("definition").to_string());
    }

    fn emit_drop(&self, script: &mut Script) {
        script.comment(
            "Note that CASCADE in the statement below will also drop any triggers \
             depending on this function.",
        );
        script.comment(
            "Also, if there are two functions with this name, you will need to add \
             arguments to identify the correct one to drop.",
        );
        script.stmt(format!(
            "DROP FUNCTION {} CASCADE;",
            self.get("function_name")
        ));
    }

    fn emit_mutate(&self, peer: &dyn SchemaObject, script: &mut Script) {
        let Some(peer) = expect_peer::<Self>(peer, self.category(), script) else {
            return;
        };
        if self.get("definition") != peer.get("definition") {
            // CREATE OR REPLACE needs no separate drop, but dependents may
            // still care that the body changed
            script.comment("This function is different so we'll recreate it:");
            script.comment(
                "Existing call sites and anything dropped via CASCADE may be affected \
                 by the new body.",
            );
            self.emit_create(script);
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

    fn function(name: &str, definition: &str) -> Record {
        record(&[
            ("function_name", name),
            ("return_type", "int4"),
            ("definition", definition),
        ])
    }

    fn run(left: Vec<Record>, right: Vec<Record>) -> Script {
        let mut script = Script::new();
        let mut left = FunctionDiff::new(left);
        let mut right = FunctionDiff::new(right);
        diff(&mut left, &mut right, &mut script);
        script
    }

    #[test]
    fn changed_body_is_reemitted_without_a_drop() {
        let script = run(
            vec![function(
                "public.add(integer, integer)",
                "CREATE OR REPLACE FUNCTION add(a int, b int) ... RETURN a + b ...",
            )],
            vec![function(
                "public.add(integer, integer)",
                "CREATE OR REPLACE FUNCTION add(a int, b int) ... RETURN a - b ...",
            )],
        );
        let stmts: Vec<_> = script.statements().collect();
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].starts_with("CREATE OR REPLACE FUNCTION add"));
    }

    #[test]
    fn extra_function_drop_warns_about_cascade() {
        let script = run(
            vec![],
            vec![function("public.legacy()", "CREATE OR REPLACE FUNCTION legacy() ...")],
        );
        assert_eq!(
            script.statements().collect::<Vec<_>>(),
            vec!["DROP FUNCTION public.legacy() CASCADE;"]
        );
        let rendered = script.render();
        assert!(rendered.contains("CASCADE in the statement below"));
    }

    #[test]
    fn overloads_are_distinct_objects() {
        let left = vec![
            function("public.f(integer)", "CREATE OR REPLACE FUNCTION f(int) ..."),
            function("public.f(text)", "CREATE OR REPLACE FUNCTION f(text) ..."),
        ];
        let right = vec![function(
            "public.f(integer)",
            "CREATE OR REPLACE FUNCTION f(int) ...",
        )];
        let script = run(left, right);
        let stmts: Vec<_> = script.statements().collect();
        assert_eq!(stmts, vec!["CREATE OR REPLACE FUNCTION f(text) ..."]);
    }
}
