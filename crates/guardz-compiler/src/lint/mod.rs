//! Source linter with autofix.
//!
//! | Rule | Severity | Fixable |
//! |---|---|---|
//! | `no-var` | error | yes |
//! | `eqeqeq` | error | when one side is `typeof` or a literal |
//! | `no-debugger` | error | yes |
//! | `no-trailing-spaces` | warning | yes |
//! | `no-explicit-any` | warning | no |
//! | `parse-error` | error | no |
//!
//! Files with parse errors are never rewritten.

mod rules;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::diagnostic::GuardzError;
use crate::frontend::typescript::parser::TypeScriptParser;
use rules::{apply_fixes, Finding};

/// Violation severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A reported violation with a 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintViolation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub rule: String,
    pub severity: Severity,
    pub message: String,
}

/// Result of one lint pass.
#[derive(Debug, Default)]
pub struct LintReport {
    /// Violations left after fixing (all violations when not fixing).
    pub violations: Vec<LintViolation>,
    pub files_checked: usize,
    pub fixes_applied: usize,
}

impl LintReport {
    pub fn error_count(&self) -> usize {
        self.violations.iter().filter(|v| v.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations.iter().filter(|v| v.severity == Severity::Warning).count()
    }
}

/// Lints TypeScript and JavaScript files.
#[derive(Debug, Default, Clone, Copy)]
pub struct Linter;

impl Linter {
    pub fn new() -> Self {
        Self
    }

    /// Lints every path in one pass. With `fix`, fixable violations are
    /// rewritten in place; without it no file is modified.
    pub fn lint(&self, paths: &[PathBuf], fix: bool) -> Result<LintReport, GuardzError> {
        let mut report = LintReport::default();

        for path in paths {
            let source = std::fs::read_to_string(path).map_err(|e| GuardzError::io(path, e.to_string()))?;
            let mut findings = self.check_source(&source, path)?;

            let has_parse_error = findings.iter().any(|f| f.rule == "parse-error");
            if fix && !has_parse_error {
                let fixes: Vec<_> = findings.iter().filter_map(|f| f.fix.clone()).collect();
                if !fixes.is_empty() {
                    let (fixed, applied) = apply_fixes(&source, &fixes);
                    std::fs::write(path, &fixed).map_err(|e| GuardzError::io(path, e.to_string()))?;
                    report.fixes_applied += applied;
                    debug!(file = %path.display(), applied, "applied lint fixes");
                    findings = self.check_source(&fixed, path)?;
                }
            }

            report.violations.extend(findings.into_iter().map(|f| LintViolation {
                file: path.clone(),
                line: f.line + 1,
                column: f.column + 1,
                rule: f.rule.to_string(),
                severity: f.severity,
                message: f.message,
            }));
            report.files_checked += 1;
        }

        Ok(report)
    }

    fn check_source(&self, source: &str, path: &Path) -> Result<Vec<Finding>, GuardzError> {
        let mut parser = TypeScriptParser::for_path(path)?;
        let tree = parser.parse_tree(source, path)?;
        Ok(rules::check(tree.root_node(), source))
    }
}
