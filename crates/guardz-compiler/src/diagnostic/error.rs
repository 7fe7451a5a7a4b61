//! Compiler error types.

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while discovering, compiling, generating or post-processing.
#[derive(Error, Diagnostic, Debug)]
pub enum GuardzError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access file '{}': {message}", path.display())]
    #[diagnostic(code(guardz::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Failed to initialize parser")]
    #[diagnostic(code(guardz::parse::init_failed))]
    ParserInitFailed,

    #[error("Failed to parse file: {}", path.display())]
    #[diagnostic(code(guardz::parse::parse_failed))]
    ParseFailed {
        path: PathBuf,
    },

    // =========================================================================
    // Setup Errors
    // =========================================================================
    #[error("Failed to create program: {message}")]
    #[diagnostic(
        code(guardz::program::setup_failed),
        help("Check that at least one source file was discovered and that the tsconfig path is readable JSON")
    )]
    CompilationSetup {
        message: String,
    },

    #[error("Invalid configuration file '{}': {message}", path.display())]
    #[diagnostic(code(guardz::config::invalid))]
    ConfigError {
        path: PathBuf,
        message: String,
    },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    #[diagnostic(
        code(guardz::discovery::invalid_glob),
        help("Patterns use globset syntax, e.g. 'src/**/*.ts'")
    )]
    InvalidGlob {
        pattern: String,
        message: String,
    },

    // =========================================================================
    // Generation Errors
    // =========================================================================
    #[error("Guard name '{guard_name}' is ambiguous: {count} exported types would share it")]
    #[diagnostic(
        code(guardz::generate::ambiguous_guard_name),
        help("Pass a type name together with a custom guard name")
    )]
    AmbiguousGuardName {
        guard_name: String,
        count: usize,
    },

    #[error("Guard name '{guard_name}' is not a valid identifier")]
    #[diagnostic(
        code(guardz::generate::invalid_guard_name),
        help("Use a plain function name such as 'isUser'")
    )]
    InvalidGuardName {
        guard_name: String,
    },

    // =========================================================================
    // Post-processing Errors
    // =========================================================================
    #[error("Failed to format '{}': {message}", path.display())]
    #[diagnostic(code(guardz::format::format_failed))]
    FormatFailed {
        path: PathBuf,
        message: String,
    },

    #[error("Post-processing failed for '{}': {message}", path.display())]
    #[diagnostic(code(guardz::post_process::failed))]
    PostProcess {
        path: PathBuf,
        message: String,
    },
}

impl GuardzError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a program setup error.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::CompilationSetup {
            message: message.into(),
        }
    }
}
