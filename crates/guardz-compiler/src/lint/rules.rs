//! Lint rules over the tree-sitter syntax tree.

use tree_sitter::Node;

use super::Severity;

/// A text replacement over a byte range.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

/// A rule violation with a zero-based position.
#[derive(Debug, Clone)]
pub struct Finding {
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub fix: Option<Fix>,
}

/// Literal node kinds that make a loose comparison safe to tighten.
const LITERAL_KINDS: &[&str] = &["string", "number", "true", "false", "template_string"];

/// Runs every rule over a parsed file.
pub fn check(root: Node, source: &str) -> Vec<Finding> {
    let mut checker = RuleChecker {
        source,
        findings: Vec::new(),
    };
    checker.visit(root);
    checker.check_trailing_spaces(root);
    checker.findings.sort_by_key(|f| (f.line, f.column));
    checker.findings
}

struct RuleChecker<'a> {
    source: &'a str,
    findings: Vec<Finding>,
}

impl<'a> RuleChecker<'a> {
    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn report(&mut self, node: Node, rule: &'static str, severity: Severity, message: String, fix: Option<Fix>) {
        self.findings.push(Finding {
            rule,
            severity,
            message,
            line: node.start_position().row,
            column: node.start_position().column,
            fix,
        });
    }

    /// Explicit stack: nesting depth is controlled by the input.
    fn visit(&mut self, root: Node) {
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            if node.is_error() || node.is_missing() {
                let message = if node.is_missing() {
                    format!("Parsing error: '{}' expected", node.kind())
                } else {
                    "Parsing error: unexpected token".to_string()
                };
                self.report(node, "parse-error", Severity::Error, message, None);
                continue;
            }

            match node.kind() {
                "variable_declaration" => self.check_no_var(node),
                "binary_expression" => self.check_eqeqeq(node),
                "debugger_statement" => self.check_no_debugger(node),
                "predefined_type" if self.node_text(node) == "any" => {
                    self.report(
                        node,
                        "no-explicit-any",
                        Severity::Warning,
                        "Unexpected any. Specify a different type.".to_string(),
                        None,
                    );
                }
                _ => {}
            }

            let mut cursor = node.walk();
            pending.extend(node.children(&mut cursor));
        }
    }

    fn check_no_var(&mut self, node: Node) {
        let Some(keyword) = node.child(0).filter(|c| c.kind() == "var") else {
            return;
        };
        let fix = Fix {
            start: keyword.start_byte(),
            end: keyword.end_byte(),
            replacement: "let".to_string(),
        };
        self.report(
            node,
            "no-var",
            Severity::Error,
            "Unexpected var, use let or const instead.".to_string(),
            Some(fix),
        );
    }

    fn check_eqeqeq(&mut self, node: Node) {
        let Some(operator) = node.child_by_field_name("operator") else {
            return;
        };
        let strict = match operator.kind() {
            "==" => "===",
            "!=" => "!==",
            _ => return,
        };

        let safe = [node.child_by_field_name("left"), node.child_by_field_name("right")]
            .into_iter()
            .flatten()
            .any(|side| self.is_typeof_or_literal(side));
        let fix = safe.then(|| Fix {
            start: operator.start_byte(),
            end: operator.end_byte(),
            replacement: strict.to_string(),
        });

        self.report(
            operator,
            "eqeqeq",
            Severity::Error,
            format!("Expected '{}' and instead saw '{}'.", strict, operator.kind()),
            fix,
        );
    }

    fn is_typeof_or_literal(&self, node: Node) -> bool {
        if node.kind() == "unary_expression" {
            return node
                .child_by_field_name("operator")
                .map(|op| op.kind() == "typeof")
                .unwrap_or(false);
        }
        if node.kind() == "template_string" {
            return node.named_child_count() == 0;
        }
        LITERAL_KINDS.contains(&node.kind())
    }

    fn check_no_debugger(&mut self, node: Node) {
        let (start, end) = self.whole_line_range(node.start_byte(), node.end_byte());
        let fix = Fix {
            start,
            end,
            replacement: String::new(),
        };
        self.report(
            node,
            "no-debugger",
            Severity::Error,
            "Unexpected 'debugger' statement.".to_string(),
            Some(fix),
        );
    }

    /// Widens a range to its full line (with newline) when nothing else is on the line.
    fn whole_line_range(&self, start: usize, end: usize) -> (usize, usize) {
        let bytes = self.source.as_bytes();
        let line_start = self.source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = self.source[end..].find('\n').map(|i| end + i).unwrap_or(bytes.len());

        let before_blank = self.source[line_start..start].trim().is_empty();
        let after_blank = self.source[end..line_end].trim().is_empty();
        if before_blank && after_blank {
            let with_newline = if line_end < bytes.len() { line_end + 1 } else { line_end };
            (line_start, with_newline)
        } else {
            (start, end)
        }
    }

    fn check_trailing_spaces(&mut self, root: Node) {
        let mut offset = 0;
        for (row, line) in self.source.split('\n').enumerate() {
            let content = line.trim_end_matches('\r');
            let trimmed = content.trim_end_matches(|c: char| c == ' ' || c == '\t');
            if trimmed.len() < content.len() {
                let start = offset + trimmed.len();
                let end = offset + content.len();
                if !inside_template(root, start) {
                    self.findings.push(Finding {
                        rule: "no-trailing-spaces",
                        severity: Severity::Warning,
                        message: "Trailing spaces not allowed.".to_string(),
                        line: row,
                        column: trimmed.len(),
                        fix: Some(Fix {
                            start,
                            end,
                            replacement: String::new(),
                        }),
                    });
                }
            }
            offset += line.len() + 1;
        }
    }
}

fn inside_template(root: Node, byte: usize) -> bool {
    let mut current = root.descendant_for_byte_range(byte, byte);
    while let Some(node) = current {
        if node.kind() == "template_string" {
            return true;
        }
        current = node.parent();
    }
    false
}

/// Applies non-overlapping fixes; later overlapping fixes are dropped.
pub fn apply_fixes(source: &str, fixes: &[Fix]) -> (String, usize) {
    let mut sorted: Vec<&Fix> = fixes.iter().collect();
    sorted.sort_by_key(|f| (f.start, f.end));

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut applied = 0;
    for fix in sorted {
        if fix.start < cursor || fix.end > source.len() {
            continue;
        }
        output.push_str(&source[cursor..fix.start]);
        output.push_str(&fix.replacement);
        cursor = fix.end;
        applied += 1;
    }
    output.push_str(&source[cursor..]);
    (output, applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::typescript::parser::TypeScriptParser;
    use std::path::Path;

    fn findings(source: &str) -> Vec<Finding> {
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse_tree(source, Path::new("a.ts")).unwrap();
        check(tree.root_node(), source)
    }

    fn rules(source: &str) -> Vec<&'static str> {
        findings(source).into_iter().map(|f| f.rule).collect()
    }

    #[test]
    fn test_no_var() {
        let found = findings("var count = 1;\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, "no-var");
        let (fixed, applied) = apply_fixes("var count = 1;\n", &[found[0].fix.clone().unwrap()]);
        assert_eq!(fixed, "let count = 1;\n");
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_eqeqeq_fixable_only_with_typeof_or_literal() {
        let found = findings("if (typeof a == 'string') {}\nif (a == b) {}\n");
        let eq: Vec<&Finding> = found.iter().filter(|f| f.rule == "eqeqeq").collect();
        assert_eq!(eq.len(), 2);
        assert!(eq[0].fix.is_some());
        assert!(eq[1].fix.is_none());
    }

    #[test]
    fn test_no_debugger_removes_line() {
        let source = "function f() {\n  debugger;\n  return 1;\n}\n";
        let found = findings(source);
        assert_eq!(found[0].rule, "no-debugger");
        let (fixed, _) = apply_fixes(source, &[found[0].fix.clone().unwrap()]);
        assert_eq!(fixed, "function f() {\n  return 1;\n}\n");
    }

    #[test]
    fn test_trailing_spaces_skip_templates() {
        let source = "const a = 1;   \nconst b = `x   \ny`;\n";
        let found: Vec<Finding> = findings(source)
            .into_iter()
            .filter(|f| f.rule == "no-trailing-spaces")
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 0);
    }

    #[test]
    fn test_explicit_any_warns() {
        assert_eq!(rules("let a: any = 1;\n"), vec!["no-explicit-any"]);
    }

    #[test]
    fn test_parse_error() {
        assert!(rules("function (\n").contains(&"parse-error"));
    }

    #[test]
    fn test_deep_nesting_is_walked() {
        let depth = 5000;
        let source = format!("let a = {}1{};\n", "[".repeat(depth), "]".repeat(depth));
        assert!(rules(&source).is_empty());
    }

    #[test]
    fn test_clean_source() {
        assert!(rules("export const ok = (a: number): boolean => a === 1;\n").is_empty());
    }
}
