//! TypeScript frontend.

pub mod ast;
pub mod config_parser;
pub mod parser;
pub mod to_ir;

use std::path::Path;

use crate::diagnostic::GuardzError;
use super::Frontend;
use ast::ParsedFile;
use parser::TypeScriptParser;

/// TypeScript frontend implementation.
///
/// Holds no parser state; every file gets a fresh tree-sitter parser so a
/// frontend can be shared between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptFrontend;

impl TypeScriptFrontend {
    /// Creates a new TypeScript frontend.
    pub fn new() -> Self {
        Self
    }

    /// Parses already-loaded source text.
    pub fn parse_source(&self, source: &str, path: &Path) -> Result<ParsedFile, GuardzError> {
        let mut parser = TypeScriptParser::for_path(path)?;
        parser.parse(source, path)
    }
}

impl Frontend for TypeScriptFrontend {
    fn language(&self) -> &str {
        "typescript"
    }

    fn extensions(&self) -> &[&str] {
        &["ts", "tsx", "mts", "cts"]
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile, GuardzError> {
        let source = std::fs::read_to_string(path).map_err(|e| GuardzError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.parse_source(&source, path)
    }

    fn handles(&self, path: &Path) -> bool {
        let is_declaration_file = path
            .file_name()
            .map(|n| {
                let name = n.to_string_lossy();
                name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
            })
            .unwrap_or(false);
        if is_declaration_file {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions().contains(&ext),
            None => false,
        }
    }
}
