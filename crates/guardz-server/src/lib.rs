//! # Guardz Server
//!
//! HTTP API over the guardz compiler. Submitted TypeScript sources are
//! written to a per-request workspace, run through discovery, program
//! construction, guard generation and post-processing, and the workspace is
//! removed before the response leaves.
//!
//! ```text
//! request ─► validate files ─► permit ─► materialize ─► stage (blocking pool) ─► close ─► response
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod routes;
pub mod shutdown;
pub mod state;
pub mod toolchain;
pub mod workspace;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, PipelineLimits};
pub use toolchain::Toolchain;
pub use workspace::{RequestWorkspace, TempRoot};

/// Version of the API server, reported by project-info.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
