//! Lexical scope tracking for translation bindings and literal constants.
//!
//! The key finder pushes a scope per function body / block and records, for
//! each identifier, whether it denotes a translation function (and with which
//! namespace and key prefix), a statically-known literal value, or an opaque
//! binding (imports, parameters, anything non-literal). Lookup walks from the
//! innermost scope outward; the first scope that declares the name decides,
//! so inner shadowing always wins.

use std::collections::HashMap;

use indexmap::IndexMap;

/// A statically-known value bound to an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Str(String),
    /// Object literal; a non-literal property value is stored as `Unresolved`
    /// without poisoning its siblings.
    Object(IndexMap<String, ConstValue>),
    Array(Vec<ConstValue>),
    Unresolved,
}

impl ConstValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Namespace and key-prefix carried by a translation function binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransBinding {
    pub ns: Option<String>,
    pub key_prefix: Option<String>,
}

#[derive(Debug, Clone)]
enum ScopeEntry {
    Translation(TransBinding),
    Const(ConstValue),
    /// Declared but not statically resolvable: imports, parameters, bindings
    /// without a literal initializer. Blocks lookups in outer scopes.
    Opaque,
}

/// Stack of lexical scopes (innermost last).
#[derive(Debug, Default)]
pub struct ScopeTracker {
    stack: Vec<HashMap<String, ScopeEntry>>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self {
            stack: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.stack.push(HashMap::new());
    }

    /// Keeps at least the module scope.
    pub fn exit_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn bind_translation(&mut self, name: impl Into<String>, binding: TransBinding) {
        self.insert(name.into(), ScopeEntry::Translation(binding));
    }

    pub fn bind_const(&mut self, name: impl Into<String>, value: ConstValue) {
        self.insert(name.into(), ScopeEntry::Const(value));
    }

    pub fn bind_opaque(&mut self, name: impl Into<String>) {
        self.insert(name.into(), ScopeEntry::Opaque);
    }

    /// Declare a name without upgrading an existing entry in the same scope.
    ///
    /// Used by the pre-scan pass so later plain assignments never turn a
    /// declared-but-uninitialized name into a resolvable one.
    pub fn declare(&mut self, name: &str) {
        let scope = self.stack.last_mut().expect("scope stack is never empty");
        scope
            .entry(name.to_string())
            .or_insert(ScopeEntry::Opaque);
    }

    fn insert(&mut self, name: String, entry: ScopeEntry) {
        let scope = self.stack.last_mut().expect("scope stack is never empty");
        scope.insert(name, entry);
    }

    /// Resolve an identifier to a translation binding.
    ///
    /// The innermost scope declaring the name decides: a const or opaque entry
    /// shadows any translation binding further out.
    pub fn resolve(&self, name: &str) -> Option<&TransBinding> {
        match self.lookup(name)? {
            ScopeEntry::Translation(binding) => Some(binding),
            _ => None,
        }
    }

    /// Resolve an identifier to a statically-known literal value.
    pub fn lookup_const(&self, name: &str) -> Option<&ConstValue> {
        match self.lookup(name)? {
            ScopeEntry::Const(value) => Some(value),
            _ => None,
        }
    }

    /// Whether any scope declares the name at all. A declared non-translation
    /// binding shadows the configured function patterns.
    pub fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn lookup(&self, name: &str) -> Option<&ScopeEntry> {
        for scope in self.stack.iter().rev() {
            if let Some(entry) = scope.get(name) {
                return Some(entry);
            }
        }
        None
    }
}
