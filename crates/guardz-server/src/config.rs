//! Server configuration from command-line flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "guardz-server")]
#[command(about = "Guardz API - generate TypeScript type guards over HTTP")]
#[command(version)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "GUARDZ_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Root directory for per-request workspaces (created at startup, removed on shutdown)
    #[arg(long, env = "GUARDZ_TEMP_DIR", default_value = "./temp")]
    pub temp_dir: PathBuf,

    /// Maximum JSON body size in MiB
    #[arg(long, default_value_t = 50)]
    pub body_limit_mb: usize,

    /// Pipelines allowed to run at the same time
    #[arg(long, default_value_t = 16)]
    pub max_concurrent_pipelines: usize,

    /// Upper bound for one pipeline stage, in seconds
    #[arg(long, default_value_t = 60)]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env_flags() {
        let config = ServerConfig::try_parse_from(["guardz-server", "--host", "127.0.0.1", "--port", "8080"]).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.body_limit_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.max_concurrent_pipelines, 16);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::try_parse_from([
            "guardz-server",
            "--temp-dir",
            "/var/tmp/guardz",
            "--body-limit-mb",
            "1",
            "--max-concurrent-pipelines",
            "2",
            "--request-timeout-secs",
            "5",
        ])
        .unwrap();

        assert_eq!(config.temp_dir, PathBuf::from("/var/tmp/guardz"));
        assert_eq!(config.body_limit_bytes(), 1024 * 1024);
        assert_eq!(config.max_concurrent_pipelines, 2);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerConfig::try_parse_from(["guardz-server", "--port", "http"]).is_err());
    }
}
