//! POST /api/guardz/validate-typescript

use axum::extract::State;
use axum::Json;

use super::types::{ApiJson, DiagnosticEntry, FilesRequest, ValidateResponse};
use crate::error::ApiError;
use crate::pipeline::run_with_sources;
use crate::state::AppState;

/// Compiles the submitted sources and reports their diagnostics.
///
/// Diagnostics are not a request failure: the response is 200 with
/// `success: false` and the list.
pub async fn validate_typescript(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FilesRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let response = run_with_sources(&state, "validate", request.files, |tools, workspace| {
        let count = workspace.paths().len();
        let program = tools.programs.build(workspace.paths(), None)?;
        let diagnostics: Vec<DiagnosticEntry> = program.diagnostics().iter().map(DiagnosticEntry::from).collect();

        if diagnostics.is_empty() {
            return Ok(ValidateResponse {
                success: true,
                message: format!(
                    "Successfully validated {} TypeScript files. No compilation errors found.",
                    count
                ),
                diagnostics,
            });
        }

        Ok(ValidateResponse {
            success: false,
            message: format!(
                "Found {} compilation errors in {} TypeScript files.",
                diagnostics.len(),
                count
            ),
            diagnostics,
        })
    })
    .await?;

    Ok(Json(response))
}
