//! Parser for script-based discovery configs (`guardz.generator.config.ts`).
//!
//! # Example
//!
//! ```typescript
//! // guardz.generator.config.ts
//! export default {
//!   includes: ['src/**/*.ts'],
//!   excludes: ['**/*.test.ts'],
//! };
//! ```
//!
//! `export default defineConfig({...})`, `export default config` (a `const`
//! declared in the same file) and `module.exports = {...}` are also accepted.

use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Node;

use crate::config::DiscoveryConfig;
use crate::diagnostic::GuardzError;
use super::parser::TypeScriptParser;

/// Parses the default-exported config object of a script config file.
pub fn parse_discovery_config(source: &str, path: &Path) -> Result<DiscoveryConfig, GuardzError> {
    let mut parser = TypeScriptParser::new()?;
    let tree = parser.parse_tree(source, path)?;

    let root = tree.root_node();
    let mut extractor = ConfigExtractor::new(source);
    extractor.visit_program(root);

    match extractor.exported_object() {
        Some(object) => Ok(extractor.read_patterns(object)),
        None => Err(GuardzError::ConfigError {
            path: path.to_path_buf(),
            message: "no default-exported config object found".to_string(),
        }),
    }
}

/// Extracts the config object literal from a tree-sitter AST.
struct ConfigExtractor<'a, 't> {
    source: &'a str,
    /// `const name = <value>` declarations at the top level.
    bindings: HashMap<String, Node<'t>>,
    /// The default-exported expression.
    exported: Option<Node<'t>>,
}

impl<'a, 't> ConfigExtractor<'a, 't> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bindings: HashMap::new(),
            exported: None,
        }
    }

    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn visit_program(&mut self, node: Node<'t>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "lexical_declaration" | "variable_declaration" => {
                    self.visit_variable_declaration(child);
                }
                "export_statement" => {
                    if self.exported.is_none() {
                        self.exported = child.child_by_field_name("value");
                    }
                    // export const config = {...}
                    if let Some(declaration) = child.child_by_field_name("declaration") {
                        if matches!(declaration.kind(), "lexical_declaration" | "variable_declaration") {
                            self.visit_variable_declaration(declaration);
                        }
                    }
                }
                "expression_statement" => {
                    self.visit_expression_statement(child);
                }
                _ => {}
            }
        }
    }

    fn visit_variable_declaration(&mut self, node: Node<'t>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "variable_declarator" {
                let name_node = child.child_by_field_name("name");
                let value_node = child.child_by_field_name("value");
                if let (Some(name), Some(value)) = (name_node, value_node) {
                    self.bindings.insert(self.node_text(name).to_string(), value);
                }
            }
        }
    }

    /// Look for: module.exports = { ... }
    fn visit_expression_statement(&mut self, node: Node<'t>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "assignment_expression" {
                continue;
            }
            let left = child.child_by_field_name("left");
            let right = child.child_by_field_name("right");
            if let (Some(left), Some(right)) = (left, right) {
                if self.node_text(left) == "module.exports" && self.exported.is_none() {
                    self.exported = Some(right);
                }
            }
        }
    }

    /// Resolves the exported expression down to an object literal.
    fn exported_object(&self) -> Option<Node<'t>> {
        let mut node = self.exported?;

        // Bounded to avoid looping on `const a = b; const b = a;`
        for _ in 0..8 {
            match node.kind() {
                "object" => return Some(node),
                "identifier" => {
                    node = *self.bindings.get(self.node_text(node))?;
                }
                "call_expression" => {
                    let arguments = node.child_by_field_name("arguments")?;
                    node = arguments.named_child(0)?;
                }
                "parenthesized_expression" | "as_expression" | "satisfies_expression" => {
                    node = node.named_child(0)?;
                }
                _ => return None,
            }
        }
        None
    }

    fn read_patterns(&self, object: Node) -> DiscoveryConfig {
        let mut config = DiscoveryConfig::default();

        let mut cursor = object.walk();
        for child in object.children(&mut cursor) {
            if child.kind() != "pair" {
                continue;
            }
            let key_node = child.child_by_field_name("key");
            let value_node = child.child_by_field_name("value");

            if let (Some(key), Some(value)) = (key_node, value_node) {
                let key_name = self.node_text(key).trim_matches(|c| c == '"' || c == '\'');
                match key_name {
                    "includes" | "include" => config.includes = Some(self.read_string_array(value)),
                    "excludes" | "exclude" => config.excludes = Some(self.read_string_array(value)),
                    _ => {}
                }
            }
        }

        config
    }

    /// Reads `['a', "b", `c`]`; non-string elements are skipped.
    fn read_string_array(&self, node: Node) -> Vec<String> {
        if node.kind() != "array" {
            return Vec::new();
        }

        let mut values = Vec::new();
        let mut cursor = node.walk();
        for element in node.named_children(&mut cursor) {
            match element.kind() {
                "string" => {
                    values.push(self.node_text(element).trim_matches(|c| c == '"' || c == '\'').to_string());
                }
                "template_string" if element.named_child_count() == 0 => {
                    values.push(self.node_text(element).trim_matches('`').to_string());
                }
                _ => {}
            }
        }
        values
    }
}
