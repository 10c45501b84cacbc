//! Extraction plugin hooks.
//!
//! Plugins extend extraction without forking the scanner: they can rewrite a
//! source file before parsing, watch call expressions during traversal,
//! contribute context candidates, and post-process the finished key registry.
//! All dispatch is synchronous, in registration order, on the thread doing the
//! extraction.

use std::path::Path;

use anyhow::Result;
use swc_ecma_ast::{CallExpr, Expr};

use crate::config::Config;
use crate::extract::registry::{ExtractedKey, KeyRegistry};
use crate::extract::scope::{ConstValue, ScopeTracker};

/// What a plugin participates in. Used to skip dispatch entirely for hooks a
/// plugin does not implement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub transforms_source: bool,
    pub visits_calls: bool,
    pub extends_registry: bool,
    pub extracts_context: bool,
}

/// Per-call state handed to `on_visit_call`.
pub struct VisitContext<'a> {
    scope: &'a ScopeTracker,
    pub config: &'a Config,
    added: Vec<ExtractedKey>,
}

impl<'a> VisitContext<'a> {
    pub fn new(scope: &'a ScopeTracker, config: &'a Config) -> Self {
        Self {
            scope,
            config,
            added: Vec::new(),
        }
    }

    /// Register an additional key discovered by the plugin.
    pub fn add_key(&mut self, key: ExtractedKey) {
        self.added.push(key);
    }

    /// Look up a statically-known literal binding visible at the call site.
    pub fn lookup_const(&self, name: &str) -> Option<&ConstValue> {
        self.scope.lookup_const(name)
    }

    pub fn take_keys(self) -> Vec<ExtractedKey> {
        self.added
    }
}

#[allow(unused_variables)]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Rewrite source text before parsing. Return `None` to leave it as is.
    fn on_load(&self, source: &str, path: &Path) -> Option<String> {
        None
    }

    /// Inspect a call expression during traversal. Runs for every call, not
    /// just translation calls.
    fn on_visit_call(&self, call: &CallExpr, ctx: &mut VisitContext<'_>) {}

    /// Contribute context candidates for a context option expression the
    /// built-in resolver could not handle. First non-empty answer wins.
    fn extract_context(&self, expr: &Expr, config: &Config) -> Vec<String> {
        Vec::new()
    }

    /// Post-process the completed registry before reconciliation.
    fn on_end(&self, registry: &mut KeyRegistry) -> Result<()> {
        Ok(())
    }
}

/// Ordered plugin dispatcher.
///
/// A failing plugin never discards already-extracted keys: `on_end` errors are
/// collected per plugin and surfaced as warnings by the caller.
#[derive(Default)]
pub struct PluginBus {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Run source transforms in order, feeding each plugin the previous
    /// plugin's output.
    pub fn on_load(&self, source: String, path: &Path) -> String {
        let mut current = source;
        for plugin in &self.plugins {
            if !plugin.capabilities().transforms_source {
                continue;
            }
            if let Some(transformed) = plugin.on_load(&current, path) {
                current = transformed;
            }
        }
        current
    }

    pub fn on_visit_call(
        &self,
        call: &CallExpr,
        scope: &ScopeTracker,
        config: &Config,
    ) -> Vec<ExtractedKey> {
        let mut keys = Vec::new();
        for plugin in &self.plugins {
            if !plugin.capabilities().visits_calls {
                continue;
            }
            let mut ctx = VisitContext::new(scope, config);
            plugin.on_visit_call(call, &mut ctx);
            keys.extend(ctx.take_keys());
        }
        keys
    }

    /// First plugin that recognizes the expression decides the candidates.
    pub fn extract_context(&self, expr: &Expr, config: &Config) -> Vec<String> {
        for plugin in &self.plugins {
            if !plugin.capabilities().extracts_context {
                continue;
            }
            let candidates = plugin.extract_context(expr, config);
            if !candidates.is_empty() {
                return candidates;
            }
        }
        Vec::new()
    }

    /// Run `on_end` for every plugin; a failure is reported and skipped so it
    /// cannot take the registry down with it.
    pub fn on_end(&self, registry: &mut KeyRegistry) -> Vec<String> {
        let mut errors = Vec::new();
        for plugin in &self.plugins {
            if !plugin.capabilities().extends_registry {
                continue;
            }
            if let Err(e) = plugin.on_end(registry) {
                errors.push(format!("plugin `{}` failed: {:#}", plugin.name(), e));
            }
        }
        errors
    }
}
