//! Tracing setup.

use tracing_subscriber::EnvFilter;

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Installs the global subscriber. `GUARDZ_LOG` takes either a plain level,
/// applied to the guardz crates and HTTP tracing, or a full filter spec.
pub fn init_tracing() {
    let spec = std::env::var("GUARDZ_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directives(&spec)))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}

fn filter_directives(spec: &str) -> String {
    let spec = spec.trim();
    if LEVELS.contains(&spec.to_ascii_lowercase().as_str()) {
        let level = spec.to_ascii_lowercase();
        format!(
            "guardz_server={level},guardz_compiler={level},tower_http={level}",
            level = level
        )
    } else {
        spec.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_level_expands() {
        assert_eq!(
            filter_directives("DEBUG"),
            "guardz_server=debug,guardz_compiler=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_filter_spec_passes_through() {
        assert_eq!(filter_directives("guardz_server=trace,warn"), "guardz_server=trace,warn");
    }
}
