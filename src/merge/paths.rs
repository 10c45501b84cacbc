//! Output path template handling.
//!
//! Templates carry `{{language}}` and optionally `{{namespace}}` placeholders,
//! e.g. `locales/{{language}}/{{namespace}}.json` or
//! `src/{{namespace}}/locales/{{language}}.json`. Namespaces may span several
//! path segments (`widgets/component`).

use std::path::{Path, PathBuf};

pub const LANGUAGE_PLACEHOLDER: &str = "{{language}}";
pub const NAMESPACE_PLACEHOLDER: &str = "{{namespace}}";

/// Whether the template produces one file per namespace.
pub fn has_namespace(template: &str) -> bool {
    template.contains(NAMESPACE_PLACEHOLDER)
}

/// Resolve the template into a concrete relative path.
pub fn resolve_path(template: &str, language: &str, namespace: &str) -> PathBuf {
    PathBuf::from(
        template
            .replace(LANGUAGE_PLACEHOLDER, language)
            .replace(NAMESPACE_PLACEHOLDER, namespace),
    )
}

/// Glob pattern matching every namespace file of one language. `**/*` covers
/// namespaces spanning several path segments.
pub fn discovery_pattern(template: &str, language: &str) -> String {
    template
        .replace(LANGUAGE_PLACEHOLDER, language)
        .replace(NAMESPACE_PLACEHOLDER, "**/*")
}

/// Recover the namespace from a path produced by the template.
///
/// The resolved template splits into a literal prefix and suffix around the
/// namespace placeholder; whatever sits between them in the actual path is
/// the namespace. Returns `None` when the path does not fit the template.
pub fn namespace_from_path(template: &str, language: &str, relative: &Path) -> Option<String> {
    let resolved = template.replace(LANGUAGE_PLACEHOLDER, language);
    let (prefix, suffix) = resolved.split_once(NAMESPACE_PLACEHOLDER)?;

    let path = normalize(relative);
    let rest = path.strip_prefix(prefix)?;
    let namespace = rest.strip_suffix(suffix)?;
    if namespace.is_empty() {
        return None;
    }
    Some(namespace.to_string())
}

/// Forward-slash form of a relative path, for template matching.
fn normalize(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}
