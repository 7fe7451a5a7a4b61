//! POST /api/guardz/discover-files

use std::path::PathBuf;

use axum::extract::State;
use axum::Json;
use guardz_compiler::DiscoveryOptions;

use super::types::{ApiJson, DiscoverRequest, DiscoverResponse};
use crate::error::ApiError;
use crate::pipeline::run_blocking;
use crate::state::AppState;

/// Resolves caller-supplied paths and patterns; nothing is materialized.
pub async fn discover_files(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DiscoverRequest>,
) -> Result<Json<DiscoverResponse>, ApiError> {
    let options = DiscoveryOptions {
        files: request.cli_files.unwrap_or_default().into_iter().map(PathBuf::from).collect(),
        includes: request.cli_includes.unwrap_or_default(),
        excludes: request.cli_excludes.unwrap_or_default(),
        config_path: request.config_path.map(PathBuf::from),
        skip_dirs: vec![state.temp_root.to_path_buf()],
    };

    let result = run_blocking(&state, "discover", move |tools, _| Ok(tools.discovery.discover(&options)?)).await?;

    Ok(Json(DiscoverResponse {
        success: true,
        files: result.files,
        source: result.source,
    }))
}
