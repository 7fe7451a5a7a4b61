//! Generation options and discovery configuration files.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diagnostic::GuardzError;
use crate::frontend::typescript::config_parser;

/// Options for a guard generation run.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Only generate the guard for this type.
    pub type_name: Option<String>,

    /// Custom guard function name.
    pub guard_name: Option<String>,

    /// Format and lint the written guards.
    pub post_process: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            type_name: None,
            guard_name: None,
            post_process: true,
        }
    }
}

/// Include/exclude patterns read from a discovery config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryConfig {
    pub includes: Option<Vec<String>>,
    pub excludes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct JsonDiscoveryConfig {
    #[serde(default, alias = "include")]
    includes: Option<Vec<String>>,
    #[serde(default, alias = "exclude")]
    excludes: Option<Vec<String>>,
}

impl DiscoveryConfig {
    /// Loads a config file.
    ///
    /// `.json` files are read as (commented) JSON with `includes`/`excludes`
    /// or tsconfig-style `include`/`exclude`. Script configs are parsed with
    /// tree-sitter and the default-exported object literal is used.
    pub fn load(path: &Path) -> Result<Self, GuardzError> {
        let content = std::fs::read_to_string(path).map_err(|e| GuardzError::ConfigError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content, path),
            Some("ts") | Some("mts") | Some("cts") | Some("js") | Some("mjs") | Some("cjs") => {
                config_parser::parse_discovery_config(&content, path)
            }
            _ => Err(GuardzError::ConfigError {
                path: path.to_path_buf(),
                message: "unsupported config file type".to_string(),
            }),
        }
    }

    fn from_json(content: &str, path: &Path) -> Result<Self, GuardzError> {
        let raw: JsonDiscoveryConfig = serde_json::from_str(&strip_json_comments(content))
            .map_err(|e| GuardzError::ConfigError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self {
            includes: raw.includes,
            excludes: raw.excludes,
        })
    }
}

/// Directory that relative patterns in a config file resolve against.
pub fn config_base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Removes `//` and `/* */` comments and trailing commas so tsconfig-style
/// JSON can be handed to serde_json.
pub fn strip_json_comments(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut in_string = false;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            ',' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if !matches!(chars.get(j), Some('}') | Some(']')) {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_strip_comments_and_trailing_commas() {
        let input = r#"{
            // line comment
            "include": ["src/**/*.ts",], /* block */
            "url": "http://example.com"
        }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_json_comments(input)).unwrap();
        assert_eq!(value["include"][0], "src/**/*.ts");
        assert_eq!(value["url"], "http://example.com");
    }

    #[test]
    fn test_load_json_config_with_tsconfig_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tsconfig.json");
        std::fs::write(&path, r#"{ "include": ["src/**/*.ts"], "exclude": ["**/*.spec.ts"] }"#).unwrap();

        let config = DiscoveryConfig::load(&path).unwrap();
        assert_eq!(config.includes, Some(vec!["src/**/*.ts".to_string()]));
        assert_eq!(config.excludes, Some(vec!["**/*.spec.ts".to_string()]));
    }

    #[test]
    fn test_load_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        let result = DiscoveryConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(GuardzError::ConfigError { .. })));
    }

    #[test]
    fn test_generation_options_default_post_processes() {
        assert!(GenerationOptions::default().post_process);
    }
}
