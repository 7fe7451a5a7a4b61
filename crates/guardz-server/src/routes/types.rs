//! Request and response bodies.

use std::path::PathBuf;

use axum::extract::FromRequest;
use guardz_compiler::{DiscoverySource, LintViolation, ProgramDiagnostic, Severity};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `Json` extractor whose rejections become [`ApiError`]s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub files: Option<Vec<String>>,
    /// Discovery config, also used as the tsconfig for the program.
    pub config: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub guard_name: Option<String>,
    pub includes: Option<Vec<String>>,
    pub excludes: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub post_process: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverRequest {
    pub cli_files: Option<Vec<String>>,
    pub cli_includes: Option<Vec<String>>,
    pub cli_excludes: Option<Vec<String>>,
    pub config_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilesRequest {
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LintRequest {
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub fix: bool,
}

/// A file returned to the client, named by its basename.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub success: bool,
    pub message: String,
    pub files: Vec<FileContent>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub success: bool,
    pub files: Vec<PathBuf>,
    pub source: DiscoverySource,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEntry {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<&ProgramDiagnostic> for DiagnosticEntry {
    fn from(diagnostic: &ProgramDiagnostic) -> Self {
        Self {
            file: basename(&diagnostic.file),
            line: diagnostic.line,
            column: diagnostic.column,
            message: diagnostic.message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LintResponse {
    pub success: bool,
    pub message: String,
    pub violations: Vec<ViolationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationEntry {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub rule: String,
    pub severity: Severity,
    pub message: String,
}

impl From<&LintViolation> for ViolationEntry {
    fn from(violation: &LintViolation) -> Self {
        Self {
            file: basename(&violation.file),
            line: violation.line,
            column: violation.column,
            rule: violation.rule.clone(),
            severity: violation.severity,
            message: violation.message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectInfoResponse {
    pub success: bool,
    pub data: ProjectInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub available_config_files: Vec<String>,
    pub guardz_generator_version: String,
    pub mcp_version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

pub fn basename(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let request: GenerateRequest = serde_json::from_str(r#"{"files": ["a"]}"#).unwrap();
        assert!(request.post_process);
        assert!(!request.verbose);
        assert!(!request.debug);
        assert!(request.type_name.is_none());
    }

    #[test]
    fn test_generate_request_wire_names() {
        let request: GenerateRequest = serde_json::from_str(
            r#"{"files": ["a"], "type": "Foo", "guardName": "checkFoo", "postProcess": false}"#,
        )
        .unwrap();
        assert_eq!(request.type_name.as_deref(), Some("Foo"));
        assert_eq!(request.guard_name.as_deref(), Some("checkFoo"));
        assert!(!request.post_process);
    }

    #[test]
    fn test_file_content_is_camel_case() {
        let json = serde_json::to_value(FileContent {
            file_name: "isFoo.ts".into(),
            content: "x".into(),
        })
        .unwrap();
        assert_eq!(json["fileName"], "isFoo.ts");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename(std::path::Path::new("/tmp/req-1/temp_1_0.ts")), "temp_1_0.ts");
    }
}
