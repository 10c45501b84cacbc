//! The sync session: extract keys, reconcile every locale file, write changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::Value;

use crate::config::{Config, expand_braces};
use crate::extract::extract_files;
use crate::merge::tree::{SortComparator, Tree, same_tree};
use crate::merge::{Conflict, MergeBehavior, merge_namespace, paths};
use crate::output;
use crate::plugins::{Plugin, PluginBus};

/// Programmatic override for output file locations. Receives the locale and
/// namespace, returns a path (relative paths are joined onto the base dir).
pub type PathResolver = Arc<dyn Fn(&str, &str) -> PathBuf + Send + Sync>;

/// Per-invocation switches, as opposed to project configuration.
#[derive(Clone, Default)]
pub struct SyncOptions {
    /// Compute and report everything, write nothing.
    pub dry_run: bool,
    /// Overwrite primary-locale values with the extracted defaults.
    pub sync_primary: bool,
    /// Reset secondary-locale values to the placeholder.
    pub sync_secondary: bool,
    pub path_resolver: Option<PathResolver>,
    pub sort_comparator: Option<SortComparator>,
}

/// What happened to one output file.
pub struct FileReport {
    pub path: PathBuf,
    pub added: usize,
    pub removed: usize,
    pub changed: bool,
}

#[derive(Default)]
pub struct SyncResult {
    /// Whether any output file differs from disk.
    pub changed: bool,
    pub files: Vec<FileReport>,
    pub keys_found: usize,
    pub files_scanned: usize,
    /// Source files skipped because they failed to parse.
    pub parse_errors: Vec<(PathBuf, String)>,
    /// Resource files skipped because they could not be read or parsed.
    pub file_errors: Vec<(PathBuf, String)>,
    pub plugin_errors: Vec<String>,
    /// Structural conflicts; any conflict aborts the run before writing.
    pub conflicts: Vec<Conflict>,
}

struct PendingFile {
    path: PathBuf,
    tree: Tree,
    changed: bool,
    added: usize,
    removed: usize,
}

/// One configured project, reusable across runs.
pub struct Session {
    config: Config,
    plugins: PluginBus,
    base_dir: PathBuf,
}

impl Session {
    pub fn new(config: Config, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            plugins: PluginBus::new(),
            base_dir: base_dir.into(),
        }
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.register(plugin);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full extract-and-reconcile pass.
    ///
    /// Conflicts make the run all-or-nothing: when any (locale, namespace)
    /// pair reports one, no file is written at all.
    pub fn sync(&self, options: &SyncOptions) -> Result<SyncResult> {
        self.config.validate()?;

        let sources = self.source_files()?;
        let outcome = extract_files(&sources, &self.config, &self.plugins);
        let mut registry = outcome.registry;

        let mut result = SyncResult {
            files_scanned: outcome.files_scanned,
            parse_errors: outcome.parse_errors,
            plugin_errors: self.plugins.on_end(&mut registry),
            ..Default::default()
        };
        registry.remove_namespaces(&self.config.ignored_namespaces);
        result.keys_found = registry.len();

        let behavior = MergeBehavior {
            sync_primary: options.sync_primary,
            sync_secondary: options.sync_secondary,
            comparator: options.sort_comparator,
        };

        let pending = if paths::has_namespace(&self.config.output) {
            self.reconcile_namespaced(&registry, options, behavior, &mut result)?
        } else {
            self.reconcile_merged(&registry, options, behavior, &mut result)?
        };

        if !result.conflicts.is_empty() {
            return Ok(result);
        }

        for file in pending {
            if file.changed && !options.dry_run {
                let content = output::render(
                    &file.tree,
                    self.config.format,
                    self.config.indentation,
                    self.config.trailing_newline,
                )?;
                output::write_atomic(&file.path, &content)?;
            }
            result.changed |= file.changed;
            result.files.push(FileReport {
                path: file.path,
                added: file.added,
                removed: file.removed,
                changed: file.changed,
            });
        }

        Ok(result)
    }

    /// One output file per (locale, namespace).
    fn reconcile_namespaced(
        &self,
        registry: &crate::extract::registry::KeyRegistry,
        options: &SyncOptions,
        behavior: MergeBehavior,
        result: &mut SyncResult,
    ) -> Result<Vec<PendingFile>> {
        let mut tasks: Vec<(String, String, PathBuf, Option<Tree>)> = Vec::new();

        for locale in &self.config.locales {
            let mut namespaces = registry.namespaces();
            for ns in self.discovered_namespaces(locale)? {
                if !namespaces.contains(&ns)
                    && !self.config.ignored_namespaces.contains(&ns)
                {
                    namespaces.push(ns);
                }
            }

            for namespace in namespaces {
                let path = self.output_path(options, locale, &namespace);
                match self.read_existing(&path) {
                    Ok(existing) => {
                        tasks.push((locale.clone(), namespace, path, existing));
                    }
                    Err(e) => result.file_errors.push((path, format!("{:#}", e))),
                }
            }
        }

        let merges: Vec<_> = tasks
            .par_iter()
            .map(|(locale, namespace, _, existing)| {
                merge_namespace(
                    registry,
                    &self.config,
                    locale,
                    namespace,
                    existing.as_ref(),
                    behavior,
                )
            })
            .collect();

        let mut pending = Vec::with_capacity(tasks.len());
        for ((_, _, path, _), merge) in tasks.into_iter().zip(merges) {
            result.conflicts.extend(merge.conflicts);
            pending.push(PendingFile {
                path,
                tree: merge.tree,
                changed: merge.changed,
                added: merge.added,
                removed: merge.removed,
            });
        }
        Ok(pending)
    }

    /// One output file per locale, namespaces as top-level keys.
    fn reconcile_merged(
        &self,
        registry: &crate::extract::registry::KeyRegistry,
        options: &SyncOptions,
        behavior: MergeBehavior,
        result: &mut SyncResult,
    ) -> Result<Vec<PendingFile>> {
        let mut pending = Vec::new();

        for locale in &self.config.locales {
            let path = self.output_path(options, locale, "");
            let existing = match self.read_existing(&path) {
                Ok(existing) => existing,
                Err(e) => {
                    result.file_errors.push((path, format!("{:#}", e)));
                    continue;
                }
            };
            let existing_tree = existing.clone().unwrap_or_default();

            let mut namespaces = registry.namespaces();
            for key in existing_tree.keys() {
                if !namespaces.contains(key)
                    && !self.config.ignored_namespaces.contains(key)
                    && existing_tree[key].is_object()
                {
                    namespaces.push(key.clone());
                }
            }

            let mut composed = Tree::new();
            let mut added = 0;
            let mut removed = 0;

            // Keep the file's own top-level order; untouched entries (ignored
            // namespaces, stray scalars) are copied through verbatim.
            for (key, value) in &existing_tree {
                if !namespaces.contains(key) {
                    composed.insert(key.clone(), value.clone());
                }
            }
            for namespace in &namespaces {
                let sub = existing_tree.get(namespace).and_then(Value::as_object);
                let merge = merge_namespace(
                    registry,
                    &self.config,
                    locale,
                    namespace,
                    sub,
                    behavior,
                );
                added += merge.added;
                removed += merge.removed;
                result.conflicts.extend(merge.conflicts);
                composed.insert(namespace.clone(), Value::Object(merge.tree));
            }
            if self.config.sort {
                crate::merge::tree::sort_tree(&mut composed, behavior.comparator);
            }

            let changed = match &existing {
                Some(existing) => !same_tree(existing, &composed),
                None => true,
            };
            pending.push(PendingFile {
                path,
                tree: composed,
                changed,
                added,
                removed,
            });
        }
        Ok(pending)
    }

    // --- filesystem helpers ----------------------------------------------

    fn source_files(&self) -> Result<Vec<PathBuf>> {
        let mut ignore_patterns = Vec::new();
        for ignore in &self.config.ignores {
            for pattern in expand_braces(ignore) {
                ignore_patterns.push(
                    glob::Pattern::new(&pattern)
                        .with_context(|| format!("Invalid ignore pattern: {}", ignore))?,
                );
            }
        }

        let mut files = Vec::new();
        for input in &self.config.input {
            for pattern in expand_braces(input) {
                let full = self.base_dir.join(&pattern);
                let entries = glob::glob(&full.to_string_lossy())
                    .with_context(|| format!("Invalid input pattern: {}", input))?;
                for entry in entries {
                    let Ok(path) = entry else { continue };
                    if !path.is_file() {
                        continue;
                    }
                    let relative = path.strip_prefix(&self.base_dir).unwrap_or(&path);
                    if ignore_patterns.iter().any(|p| p.matches_path(relative)) {
                        continue;
                    }
                    files.push(path);
                }
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn discovered_namespaces(&self, locale: &str) -> Result<Vec<String>> {
        let pattern = paths::discovery_pattern(&self.config.output, locale);
        let full = self.base_dir.join(&pattern);
        let entries = glob::glob(&full.to_string_lossy())
            .with_context(|| format!("Invalid output template: {}", self.config.output))?;

        let mut namespaces = Vec::new();
        for entry in entries {
            let Ok(path) = entry else { continue };
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(&self.base_dir).unwrap_or(&path);
            if let Some(ns) = paths::namespace_from_path(&self.config.output, locale, relative)
                && !namespaces.contains(&ns)
            {
                namespaces.push(ns);
            }
        }
        namespaces.sort();
        Ok(namespaces)
    }

    fn output_path(&self, options: &SyncOptions, locale: &str, namespace: &str) -> PathBuf {
        let path = match &options.path_resolver {
            Some(resolver) => resolver(locale, namespace),
            None => paths::resolve_path(&self.config.output, locale, namespace),
        };
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    /// Read and parse an existing resource file. `Ok(None)` when it does not
    /// exist; an error when it exists but cannot be used.
    fn read_existing(&self, path: &Path) -> Result<Option<Tree>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let tree = output::parse(&content, self.config.format)
            .with_context(|| format!("Failed to parse resource file: {}", path.display()))?;
        Ok(Some(tree))
    }
}
