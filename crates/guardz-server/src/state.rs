//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::config::ServerConfig;
use crate::toolchain::Toolchain;
use crate::workspace::TempRoot;

/// Limits applied to every pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    pub max_concurrent: usize,
    pub timeout: Duration,
    pub body_limit: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            max_concurrent: 16,
            timeout: Duration::from_secs(60),
            body_limit: 50 * 1024 * 1024,
        }
    }
}

/// State injected into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub toolchain: Arc<Toolchain>,
    pub temp_root: Arc<PathBuf>,
    pub permits: Arc<Semaphore>,
    pub limits: PipelineLimits,
    /// Directory inspected by project-info.
    pub project_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(toolchain: Toolchain, temp_root: &TempRoot, limits: PipelineLimits, project_dir: PathBuf) -> Self {
        Self {
            toolchain: Arc::new(toolchain),
            temp_root: Arc::new(temp_root.path().to_path_buf()),
            permits: Arc::new(Semaphore::new(limits.max_concurrent.max(1))),
            limits,
            project_dir: Arc::new(project_dir),
        }
    }

    pub fn from_config(config: &ServerConfig, temp_root: &TempRoot, project_dir: PathBuf) -> Self {
        let limits = PipelineLimits {
            max_concurrent: config.max_concurrent_pipelines,
            timeout: config.request_timeout(),
            body_limit: config.body_limit_bytes(),
        };
        Self::new(Toolchain::new(), temp_root, limits, project_dir)
    }
}
