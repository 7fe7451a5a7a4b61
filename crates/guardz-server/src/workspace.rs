//! Request-scoped file materialization.
//!
//! Every request that submits source text gets its own directory under the
//! process-wide temp root. Sources are written there, the toolchain runs over
//! them (generated guards land next to them), and the whole directory goes
//! away when the request ends, whichever way it ends. Files a request writes
//! outside its directory are tracked and deleted along with it.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The shared directory that holds per-request workspaces.
#[derive(Debug, Clone)]
pub struct TempRoot {
    path: PathBuf,
}

impl TempRoot {
    /// Creates the directory (and parents) if needed.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        info!(path = %path.display(), "temp root ready");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the root and everything left in it. Failures are logged.
    pub fn remove(&self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "temp root removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove temp root"),
        }
    }
}

/// One request's materialized sources.
///
/// Dropping an unclosed workspace still removes its directory.
#[derive(Debug)]
pub struct RequestWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
    files: Vec<PathBuf>,
    /// Files written on behalf of the request, possibly outside `path`.
    outputs: Vec<PathBuf>,
}

impl RequestWorkspace {
    /// Creates `req-<request_id>` under `root` and writes source `i` to
    /// `temp_<unix-millis>_<i>.ts`.
    pub fn materialize(root: &Path, request_id: Uuid, sources: &[String]) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("req-{}", request_id))
            .rand_bytes(0)
            .tempdir_in(root)?;
        let path = dir.path().to_path_buf();

        let millis = chrono::Utc::now().timestamp_millis();
        let mut workspace = Self {
            dir: Some(dir),
            path,
            files: Vec::with_capacity(sources.len()),
            outputs: Vec::new(),
        };
        for (index, source) in sources.iter().enumerate() {
            let file = workspace.path.join(format!("temp_{}_{}.ts", millis, index));
            std::fs::write(&file, source)?;
            workspace.files.push(file);
        }

        debug!(dir = %workspace.path.display(), files = workspace.files.len(), "materialized sources");
        Ok(workspace)
    }

    /// Written source paths, in request order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn dir(&self) -> &Path {
        &self.path
    }

    /// Registers files to delete when the workspace ends. Call before writing them.
    pub fn track(&mut self, outputs: impl IntoIterator<Item = PathBuf>) {
        self.outputs.extend(outputs);
    }

    /// Tracked output paths.
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Deletes each source and tracked output, then the directory with
    /// anything else generated in it. A file that cannot be deleted is logged
    /// and does not stop the rest.
    pub fn close(mut self) {
        for file in &self.files {
            remove_file_logged(file);
        }
        self.remove_outputs();
        self.remove_dir();
    }

    fn remove_outputs(&mut self) {
        for file in std::mem::take(&mut self.outputs) {
            remove_file_logged(&file);
        }
    }

    fn remove_dir(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!(dir = %self.path.display(), error = %e, "failed to remove request workspace");
            }
        }
    }
}

impl Drop for RequestWorkspace {
    fn drop(&mut self) {
        if self.dir.is_some() {
            debug!(dir = %self.path.display(), "request workspace dropped without close");
            self.remove_outputs();
            self.remove_dir();
        }
    }
}

fn remove_file_logged(file: &Path) {
    if let Err(e) = std::fs::remove_file(file) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(file = %file.display(), error = %e, "failed to delete temp file");
        }
    }
}
