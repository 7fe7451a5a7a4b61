//! POST /api/guardz/lint-code

use axum::extract::State;
use axum::Json;

use super::types::{ApiJson, LintRequest, LintResponse, ViolationEntry};
use crate::error::ApiError;
use crate::pipeline::run_with_sources;
use crate::state::AppState;

/// Lints the submitted sources. Without `fix` the check is read-only.
pub async fn lint_code(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LintRequest>,
) -> Result<Json<LintResponse>, ApiError> {
    let fix = request.fix;

    let response = run_with_sources(&state, "lint", request.files, move |tools, workspace| {
        let report = tools.linter.lint(workspace.paths(), fix)?;
        let message = if fix {
            format!(
                "Successfully linted and fixed {} files ({} fixes applied).",
                report.files_checked, report.fixes_applied
            )
        } else {
            format!("Successfully linted {} files.", report.files_checked)
        };

        Ok(LintResponse {
            success: true,
            message,
            violations: report.violations.iter().map(ViolationEntry::from).collect(),
        })
    })
    .await?;

    Ok(Json(response))
}
