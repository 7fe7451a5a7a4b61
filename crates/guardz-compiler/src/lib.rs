//! # Guardz Compiler
//!
//! This crate turns TypeScript declarations into runtime type-guard functions
//! and provides the format and lint passes applied to generated code.
//!
//! ## Architecture
//!
//! ```text
//! Explicit paths / globs / config
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Discovery   │  Ordered, deduplicated file list
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Program    │  tree-sitter parse of every unit (TS → AST)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │      IR      │  Runtime-checkable shapes (AST → GuardType)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  `isFoo(value): value is Foo` per exported type
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ Format/Lint  │  In-place post-processing of written guards
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use guardz_compiler::{
//!     DiscoveryOptions, FileDiscovery, GenerationOptions, GuardGenerator, ProgramBuilder,
//! };
//!
//! let discovered = FileDiscovery::new().discover(&DiscoveryOptions {
//!     includes: vec!["src/**/*.ts".into()],
//!     ..Default::default()
//! })?;
//! let program = ProgramBuilder::new().build(&discovered.files, None)?;
//!
//! let generator = GuardGenerator::new();
//! let guards = generator.generate_all(&discovered.files, &program, &GenerationOptions::default())?;
//! generator.write_to_same_directory(&guards)?;
//! generator.run_post_processing(&guards)?;
//! ```

pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod discovery;
pub mod format;
pub mod frontend;
pub mod ir;
pub mod lint;
pub mod program;

pub use codegen::{GeneratedFile, GuardGenerator};
pub use config::{DiscoveryConfig, GenerationOptions};
pub use diagnostic::GuardzError;
pub use discovery::{DiscoveryOptions, DiscoveryResult, DiscoverySource, FileDiscovery};
pub use format::Formatter;
pub use lint::{LintReport, LintViolation, Linter, Severity};
pub use program::{DiagnosticKind, Program, ProgramBuilder, ProgramDiagnostic};

/// Version of the guard generator, reported by the API.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
