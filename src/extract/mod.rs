//! Key extraction: parsing source files and discovering translatable keys.

pub mod finder;
pub mod jsx;
pub mod matcher;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod scope;

use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use crate::config::Config;
use crate::extract::finder::find_keys;
use crate::extract::matcher::FnMatcher;
use crate::extract::registry::KeyRegistry;
use crate::plugins::PluginBus;

/// Result of scanning a set of source files.
pub struct ExtractionOutcome {
    pub registry: KeyRegistry,
    /// Files that failed to parse, with the parser message. A parse failure
    /// skips the file but never aborts the run.
    pub parse_errors: Vec<(PathBuf, String)>,
    pub files_scanned: usize,
}

/// Extract keys from one source string.
pub fn extract_source(
    source: String,
    file_path: &str,
    config: &Config,
    matcher: &FnMatcher,
    plugins: &PluginBus,
) -> Result<KeyRegistry> {
    let source = plugins.on_load(source, Path::new(file_path));
    let module = parser::parse_source(source, file_path)?;

    let mut registry = KeyRegistry::new(&config.default_ns);
    for key in find_keys(&module, config, matcher, plugins) {
        registry.insert(key);
    }
    Ok(registry)
}

/// Extract keys from every file, in parallel.
///
/// `paths` must already be sorted; per-file registries are folded back in that
/// order so the combined registry is deterministic regardless of scheduling.
pub fn extract_files(paths: &[PathBuf], config: &Config, plugins: &PluginBus) -> ExtractionOutcome {
    let matcher = FnMatcher::new(&config.functions);

    let per_file: Vec<(PathBuf, Result<KeyRegistry>)> = paths
        .par_iter()
        .map(|path| {
            let result = std::fs::read_to_string(path)
                .map_err(anyhow::Error::from)
                .and_then(|source| {
                    extract_source(
                        source,
                        &path.to_string_lossy(),
                        config,
                        &matcher,
                        plugins,
                    )
                });
            (path.clone(), result)
        })
        .collect();

    let mut registry = KeyRegistry::new(&config.default_ns);
    let mut parse_errors = Vec::new();
    for (path, result) in per_file {
        match result {
            Ok(file_registry) => registry.extend(file_registry),
            Err(e) => parse_errors.push((path, format!("{:#}", e))),
        }
    }

    ExtractionOutcome {
        registry,
        parse_errors,
        files_scanned: paths.len(),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::extract::*;

    fn extract(source: &str) -> KeyRegistry {
        let config = Config::default();
        let matcher = FnMatcher::new(&config.functions);
        let plugins = PluginBus::new();
        extract_source(source.to_string(), "test.tsx", &config, &matcher, &plugins).unwrap()
    }

    #[test]
    fn test_extract_source_merges_duplicates() {
        let registry = extract("t('a', 'First'); t('a'); t('b');");
        assert_eq!(registry.len(), 2);
        let first = registry.iter().next().unwrap();
        assert_eq!(first.default_value.as_deref(), Some("First"));
    }

    #[test]
    fn test_extract_files_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.tsx");
        let b = dir.path().join("b.tsx");
        std::fs::write(&a, "t('from.a');").unwrap();
        std::fs::write(&b, "t('from.b');").unwrap();

        let config = Config::default();
        let plugins = PluginBus::new();
        let outcome = extract_files(&[a, b], &config, &plugins);

        assert_eq!(outcome.files_scanned, 2);
        assert!(outcome.parse_errors.is_empty());
        let keys: Vec<&str> = outcome.registry.iter().map(|k| k.key.as_str()).collect();
        assert_eq!(keys, vec!["from.a", "from.b"]);
    }

    #[test]
    fn test_parse_error_skips_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.tsx");
        let bad = dir.path().join("bad.tsx");
        std::fs::write(&good, "t('ok');").unwrap();
        std::fs::write(&bad, "const = ;;;").unwrap();

        let config = Config::default();
        let plugins = PluginBus::new();
        let outcome = extract_files(&[good, bad.clone()], &config, &plugins);

        assert_eq!(outcome.registry.len(), 1);
        assert_eq!(outcome.parse_errors.len(), 1);
        assert_eq!(outcome.parse_errors[0].0, bad);
    }
}
