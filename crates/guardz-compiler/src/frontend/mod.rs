//! Language frontends for parsing source code into declarations.
//!
//! A frontend knows which files it can read and turns each one into a
//! [`ParsedFile`]. Lowering to the guard IR happens in the frontend too,
//! since it depends on the language's type syntax.

pub mod typescript;

use std::path::Path;
use crate::diagnostic::GuardzError;
use typescript::ast::ParsedFile;

/// Trait for language frontends.
pub trait Frontend: Send + Sync {
    /// Returns the language name (e.g., "typescript").
    fn language(&self) -> &str;

    /// Returns file extensions this frontend handles (e.g., ["ts", "tsx"]).
    fn extensions(&self) -> &[&str];

    /// Reads and parses a single source file.
    fn parse_file(&self, path: &Path) -> Result<ParsedFile, GuardzError>;

    /// Returns true if the path is a source file this frontend reads.
    fn handles(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions().contains(&ext),
            None => false,
        }
    }
}
