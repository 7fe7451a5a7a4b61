//! Guardz API server.

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use tokio::net::TcpListener;
use tracing::info;

use guardz_server::logging::init_tracing;
use guardz_server::shutdown::shutdown_signal;
use guardz_server::{router, AppState, ServerConfig, TempRoot};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = ServerConfig::parse();
    init_tracing();

    let temp_root = TempRoot::create(config.temp_dir.clone())
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to create temp directory {}", config.temp_dir.display()))?;
    let project_dir = std::env::current_dir()
        .into_diagnostic()
        .wrap_err("failed to resolve working directory")?;

    let state = AppState::from_config(&config, &temp_root, project_dir);
    let app = router(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to bind to {}", addr))?;
    info!(
        %addr,
        version = guardz_server::VERSION,
        generator = guardz_compiler::VERSION,
        "guardz server listening"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()
        .wrap_err("server error");

    temp_root.remove();
    served
}
