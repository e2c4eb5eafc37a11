// src/extract/typescript.rs

//! Exported symbol extraction for TypeScript / JavaScript sources using the
//! tree-sitter TSX grammar (a superset of the JS, JSX and TS dialects the
//! catalog suffix allows).

use tree_sitter::{Language, Node, Parser};

use crate::errors::{CatalogError, Result};
use crate::extract::SymbolExtractor;

#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptExtractor;

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self
    }

    fn language() -> Language {
        tree_sitter_typescript::LANGUAGE_TSX.into()
    }
}

impl SymbolExtractor for TypeScriptExtractor {
    /// Names exported from the top level of `source`.
    ///
    /// Declarations (`export function`, `export const`, ...) come first in
    /// source order, followed by names from `export { ... }` clauses.
    fn extract(&self, source: &str) -> Result<Vec<String>> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::language())
            .map_err(|e| CatalogError::ParseError(format!("failed to load TSX grammar: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| CatalogError::ParseError("parser produced no tree".to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(CatalogError::ParseError(first_error_message(root)));
        }

        let code = source.as_bytes();
        let mut declared = Vec::new();
        let mut specified = Vec::new();

        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            if statement.kind() != "export_statement" || is_default_export(statement) {
                continue;
            }
            if let Some(declaration) = statement.child_by_field_name("declaration") {
                collect_declared(declaration, code, &mut declared);
                continue;
            }
            if is_type_only(statement) {
                continue;
            }
            let mut inner = statement.walk();
            for child in statement.named_children(&mut inner) {
                if child.kind() == "export_clause" {
                    collect_specified(child, code, &mut specified);
                }
            }
        }

        let mut names: Vec<String> = Vec::with_capacity(declared.len() + specified.len());
        for name in declared.into_iter().chain(specified) {
            if name != "default" && !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }
}

fn is_default_export(statement: Node<'_>) -> bool {
    let mut cursor = statement.walk();
    let found = statement
        .children(&mut cursor)
        .any(|child| child.kind() == "default");
    found
}

/// `export type { A }` re-exports types only.
fn is_type_only(statement: Node<'_>) -> bool {
    let mut cursor = statement.walk();
    let found = statement
        .children(&mut cursor)
        .any(|child| child.kind() == "type");
    found
}

fn collect_declared(declaration: Node<'_>, code: &[u8], out: &mut Vec<String>) {
    match declaration.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name) = declaration.child_by_field_name("name") {
                push_text(name, code, out);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = declaration.walk();
            for declarator in declaration.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                // Destructuring patterns are not single symbols.
                if let Some(name) = declarator.child_by_field_name("name") {
                    if name.kind() == "identifier" {
                        push_text(name, code, out);
                    }
                }
            }
        }
        _ => {}
    }
}

fn collect_specified(clause: Node<'_>, code: &[u8], out: &mut Vec<String>) {
    let mut cursor = clause.walk();
    for specifier in clause.named_children(&mut cursor) {
        if specifier.kind() != "export_specifier" || is_type_only(specifier) {
            continue;
        }
        let exported = specifier
            .child_by_field_name("alias")
            .or_else(|| specifier.child_by_field_name("name"));
        if let Some(node) = exported {
            if node.kind() == "identifier" {
                push_text(node, code, out);
            }
        }
    }
}

fn push_text(node: Node<'_>, code: &[u8], out: &mut Vec<String>) {
    if let Ok(text) = node.utf8_text(code) {
        out.push(text.to_string());
    }
}

fn first_error_message(root: Node<'_>) -> String {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return format!("syntax error at line {}, column {}", pos.row + 1, pos.column + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev().filter(|c| c.has_error()));
    }
    "syntax error".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(src: &str) -> Vec<String> {
        TypeScriptExtractor::new().extract(src).unwrap()
    }

    #[test]
    fn function_and_variable_exports() {
        let src = r#"
import { Button } from "./Button";

export function Primary() {
  return <Button variant="primary" />;
}

export async function Loading() {
  return <Button loading />;
}

export function* Steps() {}

export const Secondary = () => <Button variant="secondary" />;
export let A = 1, B = 2;
export var Legacy = 3;

function helper() {}
const internal = 1;
"#;
        assert_eq!(
            extract(src),
            vec!["Primary", "Loading", "Steps", "Secondary", "A", "B", "Legacy"]
        );
    }

    #[test]
    fn export_clauses_use_the_exported_name() {
        let src = r#"
const a = 1;
const b = 2;
export { a, b as Bee };
export { Other } from "./other";
export const First = 0;
"#;
        assert_eq!(extract(src), vec!["First", "a", "Bee", "Other"]);
    }

    #[test]
    fn default_exports_and_types_are_skipped() {
        let src = r#"
export default function Page() { return null; }
export interface Props { x: number }
export type Alias = string;
export { a as default };
export type { Props as P2 };
export const { x, y } = { x: 1, y: 2 };
export const Kept = 1;
const a = 2;
"#;
        assert_eq!(extract(src), vec!["Kept"]);
    }

    #[test]
    fn plain_typescript_parses() {
        let src = "export const Typed: number = 1 as number;\n";
        assert_eq!(extract(src), vec!["Typed"]);
    }

    #[test]
    fn syntax_error_is_a_parse_error() {
        let err = TypeScriptExtractor::new()
            .extract("export const = ;\nexport function (")
            .unwrap_err();
        assert!(matches!(err, CatalogError::ParseError(_)));
    }

    #[test]
    fn empty_file_has_no_symbols() {
        assert!(extract("").is_empty());
    }
}
