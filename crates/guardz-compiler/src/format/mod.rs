//! Source formatter.
//!
//! Script sources are re-indented from their bracket structure. The
//! formatter never reorders or rewrites tokens, so running it twice yields
//! the same output.

use std::path::Path;

use tracing::debug;

use crate::diagnostic::GuardzError;

const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Formats source files by extension.
#[derive(Debug, Clone)]
pub struct Formatter {
    indent_width: usize,
}

impl Default for Formatter {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats `content` as the file type of `path`.
    pub fn format(&self, content: &str, path: &Path) -> Result<String, GuardzError> {
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if SCRIPT_EXTENSIONS.contains(&ext) => Ok(self.format_script(&normalized)),
            Some("json") => format_json(&normalized, path),
            _ => Ok(normalize_whitespace(&normalized)),
        }
    }

    /// Formats a file in place and returns the formatted content.
    pub fn format_file(&self, path: &Path) -> Result<String, GuardzError> {
        let content = std::fs::read_to_string(path).map_err(|e| GuardzError::io(path, e.to_string()))?;
        let formatted = self.format(&content, path)?;
        if formatted != content {
            std::fs::write(path, &formatted).map_err(|e| GuardzError::io(path, e.to_string()))?;
            debug!(file = %path.display(), "formatted");
        }
        Ok(formatted)
    }

    fn format_script(&self, content: &str) -> String {
        let mut scanner = Scanner::default();
        let mut lines: Vec<String> = Vec::new();
        let mut previous_blank = true;

        for raw in content.split('\n') {
            let starts_in_template = scanner.in_template();
            let starts_in_comment = scanner.block_comment;
            let depth_before = scanner.depth;
            let trimmed = raw.trim();
            let leading_closers = if starts_in_template || starts_in_comment {
                0
            } else {
                count_leading_closers(trimmed)
            };

            scanner.scan_line(raw);

            if starts_in_template {
                // Template literal content is kept byte for byte
                lines.push(raw.to_string());
                previous_blank = false;
                continue;
            }

            if trimmed.is_empty() {
                if !previous_blank {
                    lines.push(String::new());
                }
                previous_blank = true;
                continue;
            }
            previous_blank = false;

            let level = depth_before.saturating_sub(leading_closers);
            let indent = " ".repeat(level * self.indent_width);
            let body = if scanner.in_template() {
                // A template opened on this line: trailing spaces belong to the literal
                raw.trim_start()
            } else {
                trimmed
            };

            if starts_in_comment && body.starts_with('*') {
                lines.push(format!("{} {}", indent, body));
            } else {
                lines.push(format!("{}{}", indent, body));
            }
        }

        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }
        if lines.is_empty() {
            return String::new();
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }
}

fn format_json(content: &str, path: &Path) -> Result<String, GuardzError> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| GuardzError::FormatFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut output = serde_json::to_string_pretty(&value).map_err(|e| GuardzError::FormatFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    output.push('\n');
    Ok(output)
}

fn normalize_whitespace(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').map(|l| l.trim_end()).collect();
    let joined = lines.join("\n");
    let trimmed = joined.trim_end_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

fn count_leading_closers(line: &str) -> usize {
    line.chars()
        .take_while(|c| matches!(c, '}' | ')' | ']') || *c == ' ')
        .filter(|c| *c != ' ')
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    /// Inside the text of a template literal.
    Template,
    /// Inside `${ ... }`, with the number of open braces.
    Expr(usize),
}

/// Tracks bracket depth across lines, skipping strings, comments and templates.
#[derive(Debug, Default)]
struct Scanner {
    depth: usize,
    block_comment: bool,
    stack: Vec<Frame>,
}

impl Scanner {
    fn in_template(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Template))
    }

    fn scan_line(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if self.block_comment {
                if c == '*' && next == Some('/') {
                    self.block_comment = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            if self.in_template() {
                match c {
                    '\\' => i += 2,
                    '`' => {
                        self.stack.pop();
                        i += 1;
                    }
                    '$' if next == Some('{') => {
                        self.stack.push(Frame::Expr(0));
                        i += 2;
                    }
                    _ => i += 1,
                }
                continue;
            }

            match c {
                '/' if next == Some('/') => break,
                '/' if next == Some('*') => {
                    self.block_comment = true;
                    i += 2;
                    continue;
                }
                '\'' | '"' => {
                    i += 1;
                    while i < chars.len() && chars[i] != c {
                        if chars[i] == '\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                '`' => self.stack.push(Frame::Template),
                '{' => match self.stack.last_mut() {
                    Some(Frame::Expr(braces)) => *braces += 1,
                    _ => self.depth += 1,
                },
                '}' => match self.stack.last_mut() {
                    Some(Frame::Expr(0)) => {
                        self.stack.pop();
                    }
                    Some(Frame::Expr(braces)) => *braces -= 1,
                    _ => self.depth = self.depth.saturating_sub(1),
                },
                '(' | '[' if self.stack.is_empty() => self.depth += 1,
                ')' | ']' if self.stack.is_empty() => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }
    }
}
