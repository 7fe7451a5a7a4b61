//! GET /api/guardz/project-info and GET /api/health

use axum::extract::State;
use axum::Json;

use super::types::{HealthResponse, ProjectInfo, ProjectInfoResponse};
use crate::error::ApiError;
use crate::state::AppState;

const CONFIG_FILES: &[&str] = &["guardz.generator.config.ts", "tsconfig.json", "package.json"];

pub async fn project_info(State(state): State<AppState>) -> Result<Json<ProjectInfoResponse>, ApiError> {
    let mut available = Vec::new();
    for name in CONFIG_FILES {
        // Unreadable entries count as absent
        if tokio::fs::try_exists(state.project_dir.join(name)).await.unwrap_or(false) {
            available.push(name.to_string());
        }
    }

    Ok(Json(ProjectInfoResponse {
        success: true,
        data: ProjectInfo {
            available_config_files: available,
            guardz_generator_version: guardz_compiler::VERSION.to_string(),
            mcp_version: crate::VERSION.to_string(),
        },
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
}
