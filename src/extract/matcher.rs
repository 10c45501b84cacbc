//! Translation function name matching.
//!
//! Function patterns come in two forms: exact names (`t`, `i18next.t`) and
//! wildcard-suffix patterns (`*.t`). Both are compiled once per run and matched
//! against the dot-joined text of a call's callee, never via per-node regexes.

use std::collections::HashSet;

use swc_ecma_ast::{Callee, Expr, MemberProp};

/// Pre-compiled matcher for translation function patterns.
#[derive(Debug, Clone, Default)]
pub struct FnMatcher {
    exact: HashSet<String>,
    /// Suffixes including the leading dot, e.g. `*.t` is stored as `.t`.
    suffixes: Vec<String>,
}

impl FnMatcher {
    pub fn new(patterns: &[String]) -> Self {
        let mut exact = HashSet::new();
        let mut suffixes = Vec::new();

        for pattern in patterns {
            if let Some(rest) = pattern.strip_prefix("*.") {
                suffixes.push(format!(".{}", rest));
            } else {
                exact.insert(pattern.clone());
            }
        }

        Self { exact, suffixes }
    }

    /// Match a dot-joined callee text such as `t` or `i18n.services.t`.
    pub fn matches(&self, call_text: &str) -> bool {
        if self.exact.contains(call_text) {
            return true;
        }
        self.suffixes.iter().any(|s| call_text.ends_with(s.as_str()))
    }
}

/// Reconstruct the dot-joined text of a callee expression.
///
/// Returns `None` for callees that have no static dotted form (computed
/// members, call results, etc.).
pub fn callee_text(callee: &Callee) -> Option<String> {
    match callee {
        Callee::Expr(expr) => expr_text(expr),
        _ => None,
    }
}

fn expr_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => {
            let MemberProp::Ident(prop) = &member.prop else {
                return None;
            };
            let obj = expr_text(&member.obj)?;
            Some(format!("{}.{}", obj, prop.sym))
        }
        Expr::This(_) => Some("this".to_string()),
        _ => None,
    }
}
