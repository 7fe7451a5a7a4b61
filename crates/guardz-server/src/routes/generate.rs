//! POST /api/guardz/generate-type-guards

use std::path::PathBuf;

use axum::extract::State;
use axum::Json;
use guardz_compiler::{DiscoveryOptions, GeneratedFile, GenerationOptions};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::types::{basename, ApiJson, FileContent, GenerateRequest};
use crate::error::ApiError;
use crate::pipeline::run_with_sources;
use crate::state::AppState;

/// How much of the pipeline to narrate on the request span.
#[derive(Debug, Clone, Copy)]
struct LogDetail {
    verbose: bool,
    debug: bool,
}

impl LogDetail {
    fn stage(&self, message: &str) {
        if self.verbose || self.debug {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }
}

pub async fn generate_type_guards(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    let GenerateRequest {
        files,
        config,
        type_name,
        guard_name,
        includes,
        excludes,
        post_process,
        verbose,
        debug,
    } = request;
    let detail = LogDetail { verbose, debug };
    let options = GenerationOptions {
        type_name,
        guard_name,
        post_process,
    };

    let temp_root = state.temp_root.to_path_buf();
    let response = run_with_sources(&state, "generate", files, move |tools, workspace| {
        let config_path = config.as_deref().map(PathBuf::from);

        detail.stage("discovering files");
        let discovered = tools.discovery.discover(&DiscoveryOptions {
            files: workspace.paths().to_vec(),
            includes: includes.unwrap_or_default(),
            excludes: excludes.unwrap_or_default(),
            config_path: config_path.clone(),
            skip_dirs: vec![temp_root],
        })?;
        if detail.debug {
            for file in &discovered.files {
                info!(file = %file.display(), "discovered");
            }
        }

        if discovered.files.is_empty() {
            return Ok(json!({
                "success": false,
                "message": "No files found for processing",
            }));
        }

        detail.stage("building program");
        let program = tools.programs.build(&discovered.files, config_path.as_deref())?;

        detail.stage("generating guards");
        let mut generated = tools.generator.generate_all(&discovered.files, &program, &options)?;
        // Guards of included sources land outside the workspace; never clobber an existing file
        generated.retain(|file| {
            let exists = file.file_name.exists();
            if exists {
                warn!(file = %file.file_name.display(), "guard target already exists, skipping");
            }
            !exists
        });
        if detail.debug {
            for file in &generated {
                info!(guard = %file.guard_name, bytes = file.content.len(), "generated");
            }
        }
        workspace.track(generated.iter().map(|file| file.file_name.clone()));
        tools.generator.write_to_same_directory(&generated)?;

        if options.post_process {
            detail.stage("post-processing guards");
            let report = tools.generator.run_post_processing(&generated)?;
            if !report.violations.is_empty() {
                debug!(remaining = report.violations.len(), "lint violations left after post-processing");
            }
        }

        let files = read_back(&generated);
        Ok(json!({
            "success": true,
            "message": format!("Successfully generated {} type guard files", generated.len()),
            "files": files,
        }))
    })
    .await?;

    Ok(Json(response))
}

/// Final content of every generated file; unreadable files are logged and left out.
fn read_back(generated: &[GeneratedFile]) -> Vec<FileContent> {
    generated
        .iter()
        .filter_map(|file| match std::fs::read_to_string(&file.file_name) {
            Ok(content) => Some(FileContent {
                file_name: basename(&file.file_name),
                content,
            }),
            Err(e) => {
                warn!(file = %file.file_name.display(), error = %e, "failed to read generated file");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn generated(path: &Path) -> GeneratedFile {
        GeneratedFile {
            file_name: path.to_path_buf(),
            type_name: "Thing".into(),
            guard_name: "isThing".into(),
            content: "stale".into(),
        }
    }

    #[test]
    fn test_read_back_skips_missing_files() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("isThing.ts");
        std::fs::write(&present, "final").unwrap();
        let missing = dir.path().join("isGone.ts");

        let files = read_back(&[generated(&present), generated(&missing)]);

        assert_eq!(
            files,
            vec![FileContent {
                file_name: "isThing.ts".into(),
                content: "final".into(),
            }]
        );
    }
}
