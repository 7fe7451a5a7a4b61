//! POST /api/guardz/format-code

use axum::extract::State;
use axum::Json;

use super::types::{basename, ApiJson, FileContent, FilesRequest, FilesResponse};
use crate::error::ApiError;
use crate::pipeline::run_with_sources;
use crate::state::AppState;

/// Formats each submitted source in place and returns the results in order.
/// The first file that fails aborts the request.
pub async fn format_code(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FilesRequest>,
) -> Result<Json<FilesResponse>, ApiError> {
    let response = run_with_sources(&state, "format", request.files, |tools, workspace| {
        let mut files = Vec::with_capacity(workspace.paths().len());
        for path in workspace.paths() {
            let content = tools.formatter.format_file(path)?;
            files.push(FileContent {
                file_name: basename(path),
                content,
            });
        }

        Ok(FilesResponse {
            success: true,
            message: format!("Successfully formatted {} files.", files.len()),
            files,
        })
    })
    .await?;

    Ok(Json(response))
}
