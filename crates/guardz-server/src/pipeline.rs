//! The request pipeline runner.
//!
//! Every file-based route has the same shape: validate the submitted files,
//! take a concurrency permit, materialize a workspace, run one stage on the
//! blocking pool under a timeout, and clean the workspace up. Routes supply
//! only the stage.

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::toolchain::Toolchain;
use crate::workspace::RequestWorkspace;

/// Checks that `files` is present and non-empty.
pub fn require_files(files: Option<Vec<String>>) -> Result<Vec<String>, ApiError> {
    match files {
        Some(files) if !files.is_empty() => Ok(files),
        _ => Err(ApiError::MissingFiles),
    }
}

/// Materializes `files` and runs `stage` over the workspace.
///
/// The workspace is closed before the result is returned. On panic or
/// timeout it is dropped (and removed) when the blocking task ends.
pub async fn run_with_sources<T, F>(
    state: &AppState,
    operation: &'static str,
    files: Option<Vec<String>>,
    stage: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Toolchain, &mut RequestWorkspace) -> Result<T, ApiError> + Send + 'static,
{
    let sources = require_files(files)?;
    let root = state.temp_root.clone();

    run_blocking(state, operation, move |toolchain, request_id| {
        let mut workspace =
            RequestWorkspace::materialize(&root, request_id, &sources).map_err(ApiError::Workspace)?;
        let result = stage(toolchain, &mut workspace);
        workspace.close();
        result
    })
    .await
}

/// Runs `stage` on the blocking pool inside a `pipeline` span, holding a
/// concurrency permit until the stage finishes.
pub async fn run_blocking<T, F>(state: &AppState, operation: &'static str, stage: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Toolchain, Uuid) -> Result<T, ApiError> + Send + 'static,
{
    let request_id = Uuid::new_v4();
    let span = info_span!("pipeline", op = operation, request_id = %request_id);

    let permit = state
        .permits
        .clone()
        .acquire_owned()
        .instrument(span.clone())
        .await
        .map_err(|e| ApiError::StageFailed {
            operation,
            message: e.to_string(),
        })?;

    let toolchain = state.toolchain.clone();
    let task_span = span.clone();
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let _entered = task_span.enter();
        stage(&toolchain, request_id)
    });

    let timeout = state.limits.timeout;
    match tokio::time::timeout(timeout, task).instrument(span.clone()).await {
        Ok(Ok(result)) => {
            if result.is_ok() {
                info!(parent: &span, "pipeline finished");
            }
            result
        }
        Ok(Err(join_error)) => Err(ApiError::StageFailed {
            operation,
            message: join_error.to_string(),
        }),
        Err(_) => Err(ApiError::Timeout {
            operation,
            seconds: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PipelineLimits;
    use crate::workspace::TempRoot;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn state(dir: &TempDir, limits: PipelineLimits) -> AppState {
        let root = TempRoot::create(dir.path().join("temp")).unwrap();
        AppState::new(Toolchain::new(), &root, limits, dir.path().to_path_buf())
    }

    #[test]
    fn test_require_files() {
        assert!(matches!(require_files(None), Err(ApiError::MissingFiles)));
        assert!(matches!(require_files(Some(vec![])), Err(ApiError::MissingFiles)));
        assert_eq!(require_files(Some(vec!["a".into()])).unwrap(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_workspace_removed_after_stage() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir, PipelineLimits::default());

        let seen: Vec<PathBuf> = run_with_sources(&state, "test", Some(vec!["x".into(), "y".into()]), |_, ws| {
            Ok(ws.paths().to_vec())
        })
        .await
        .unwrap();

        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|p| !p.exists()));
        assert_eq!(std::fs::read_dir(state.temp_root.as_path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_tracked_outputs_removed_after_stage() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir, PipelineLimits::default());
        let outside = dir.path().join("project");
        std::fs::create_dir_all(&outside).unwrap();
        let output = outside.join("isThing.ts");

        let written = output.clone();
        run_with_sources(&state, "test", Some(vec!["x".into()]), move |_, ws| {
            ws.track([written.clone()]);
            std::fs::write(&written, "guard").map_err(ApiError::Workspace)?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(!output.exists());
        assert!(outside.is_dir());
    }

    #[tokio::test]
    async fn test_stage_error_still_cleans_up() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir, PipelineLimits::default());

        let result: Result<(), ApiError> = run_with_sources(&state, "test", Some(vec!["x".into()]), |_, _| {
            Err(ApiError::StageFailed {
                operation: "test",
                message: "boom".into(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(state.temp_root.as_path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_panicking_stage_is_contained() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir, PipelineLimits::default());

        let result: Result<(), ApiError> =
            run_with_sources(&state, "test", Some(vec!["x".into()]), |_, _| panic!("stage panicked")).await;

        assert!(matches!(result, Err(ApiError::StageFailed { .. })));
        assert_eq!(std::fs::read_dir(state.temp_root.as_path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let limits = PipelineLimits {
            timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let state = state(&dir, limits);

        let result: Result<(), ApiError> = run_blocking(&state, "slow", |_, _| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ApiError::Timeout { operation: "slow", .. })));
    }
}
