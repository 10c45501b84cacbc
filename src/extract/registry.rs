//! Extracted keys and the run-scoped key registry.

use std::collections::BTreeMap;

use indexmap::IndexMap;

/// Context information attached to a key usage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyContext {
    #[default]
    None,
    /// The context expression resolved to exactly one literal.
    Static(String),
    /// Dynamic or partially-resolvable context; carries every literal
    /// candidate that could be proven (possibly none).
    Dynamic(Vec<String>),
}

impl KeyContext {
    /// All literal context candidates, regardless of staticness.
    pub fn candidates(&self) -> &[String] {
        match self {
            KeyContext::None => &[],
            KeyContext::Static(c) => std::slice::from_ref(c),
            KeyContext::Dynamic(cs) => cs,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, KeyContext::Dynamic(_))
    }

    fn merge(self, other: KeyContext) -> KeyContext {
        match (self, other) {
            (KeyContext::None, other) => other,
            (this, KeyContext::None) => this,
            (KeyContext::Static(a), KeyContext::Static(b)) if a == b => KeyContext::Static(a),
            (a, b) => {
                // Differing usages mean the runtime value cannot be predicted.
                let mut candidates: Vec<String> = a.candidates().to_vec();
                for c in b.candidates() {
                    if !candidates.contains(c) {
                        candidates.push(c.clone());
                    }
                }
                KeyContext::Dynamic(candidates)
            }
        }
    }
}

/// One translatable key discovered in source code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedKey {
    pub key: String,
    pub ns: Option<String>,
    pub default_value: Option<String>,
    /// Per-category default overrides, keyed by the option suffix after
    /// `defaultValue_` (e.g. `other`, `ordinal_two`).
    pub plural_defaults: BTreeMap<String, String>,
    pub has_count: bool,
    pub is_ordinal: bool,
    pub context: KeyContext,
    /// True when the namespace came from a binding or the configured default
    /// rather than from the key literal or an explicit option.
    pub ns_is_implicit: bool,
}

impl ExtractedKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ns_is_implicit: true,
            ..Default::default()
        }
    }

    /// Registry identity: `ns:key`, with the configured default namespace
    /// filling in when none is attached.
    pub fn identity(&self, default_ns: &str) -> String {
        format!("{}:{}", self.ns.as_deref().unwrap_or(default_ns), self.key)
    }
}

/// Run-scoped ordered map of discovered keys.
///
/// Created fresh per invocation and discarded after reconciliation. Insertion
/// order is preserved so unsorted output appends new keys in discovery order.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    default_ns: String,
    entries: IndexMap<String, ExtractedKey>,
}

impl KeyRegistry {
    pub fn new(default_ns: impl Into<String>) -> Self {
        Self {
            default_ns: default_ns.into(),
            entries: IndexMap::new(),
        }
    }

    /// Insert a key, merging with any previous usage of the same identity.
    ///
    /// Keys with an empty name are ignored (every registered key is non-empty
    /// by construction). The first discovered default value wins; count and
    /// ordinal flags accumulate; contexts merge toward dynamic.
    pub fn insert(&mut self, key: ExtractedKey) {
        if key.key.is_empty() {
            return;
        }

        let identity = key.identity(&self.default_ns);
        match self.entries.get_mut(&identity) {
            Some(existing) => {
                if existing.default_value.is_none() {
                    existing.default_value = key.default_value;
                }
                for (category, value) in key.plural_defaults {
                    existing.plural_defaults.entry(category).or_insert(value);
                }
                existing.has_count |= key.has_count;
                existing.is_ordinal |= key.is_ordinal;
                existing.ns_is_implicit &= key.ns_is_implicit;
                existing.context = std::mem::take(&mut existing.context).merge(key.context);
            }
            None => {
                self.entries.insert(identity, key);
            }
        }
    }

    pub fn extend(&mut self, other: KeyRegistry) {
        for (_, key) in other.entries {
            self.insert(key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_ns(&self) -> &str {
        &self.default_ns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractedKey> {
        self.entries.values()
    }

    pub fn contains(&self, ns: &str, key: &str) -> bool {
        self.entries.contains_key(&format!("{}:{}", ns, key))
    }

    /// Namespaces present in the registry, in first-appearance order.
    pub fn namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = Vec::new();
        for key in self.entries.values() {
            let ns = key.ns.as_deref().unwrap_or(&self.default_ns);
            if !namespaces.iter().any(|n| n == ns) {
                namespaces.push(ns.to_string());
            }
        }
        namespaces
    }

    /// Keys belonging to one namespace, in discovery order.
    pub fn in_namespace<'a>(&'a self, ns: &'a str) -> impl Iterator<Item = &'a ExtractedKey> {
        self.entries
            .values()
            .filter(move |key| key.ns.as_deref().unwrap_or(&self.default_ns) == ns)
    }

    /// Drop every key whose namespace is in the ignore list.
    pub fn remove_namespaces(&mut self, ignored: &[String]) {
        if ignored.is_empty() {
            return;
        }
        let default_ns = self.default_ns.clone();
        self.entries.retain(|_, key| {
            let ns = key.ns.as_deref().unwrap_or(&default_ns);
            !ignored.iter().any(|ignore| ignore == ns)
        });
    }
}
