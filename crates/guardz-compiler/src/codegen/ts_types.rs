//! Naming and path helpers for generated TypeScript.

use std::path::{Component, Path};

/// Default guard function name for a type: `User` -> `isUser`.
pub fn default_guard_name(type_name: &str) -> String {
    format!("is{}", to_pascal_case(type_name))
}

/// Converts a snake_case or kebab-case name to PascalCase; PascalCase input is kept.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c| c == '_' || c == '-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// True if `s` can be used as a bare JavaScript identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// `obj.key` or `obj['odd-key']`.
pub fn property_access(object: &str, key: &str) -> String {
    if is_identifier(key) {
        format!("{}.{}", object, key)
    } else {
        format!("{}['{}']", object, key.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Module specifier importing `target` from a file in `from_dir`, e.g. `./user` or `../models/user`.
pub fn relative_module_path(from_dir: &Path, target: &Path) -> String {
    let without_ext = target.with_extension("");
    let relative = pathdiff::diff_paths(&without_ext, from_dir).unwrap_or(without_ext);

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_guard_name() {
        assert_eq!(default_guard_name("User"), "isUser");
        assert_eq!(default_guard_name("api_response"), "isApiResponse");
        assert_eq!(default_guard_name("userProfile"), "isUserProfile");
    }

    #[test]
    fn test_property_access() {
        assert_eq!(property_access("obj", "name"), "obj.name");
        assert_eq!(property_access("obj", "content-type"), "obj['content-type']");
        assert_eq!(property_access("obj", "1st"), "obj['1st']");
    }

    #[test]
    fn test_relative_module_path() {
        let dir = PathBuf::from("/work/src");
        assert_eq!(relative_module_path(&dir, Path::new("/work/src/user.ts")), "./user");
        assert_eq!(
            relative_module_path(&dir, Path::new("/work/models/address.ts")),
            "../models/address"
        );
    }
}
