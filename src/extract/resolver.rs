//! Static resolution of key/count/context expressions into literal candidates.
//!
//! Resolution never fails: an expression that cannot be statically evaluated
//! simply contributes no candidates. Partially dynamic expressions (template
//! literals, conditionals, concatenation) produce every literal combination
//! that can be proven.

use indexmap::IndexMap;
use swc_ecma_ast::{
    ArrowExpr, BinaryOp, BlockStmtOrExpr, Expr, Lit, MemberExpr, MemberProp, Pat, Prop, PropName,
    PropOrSpread, Tpl,
};

use crate::extract::scope::{ConstValue, ScopeTracker};

/// Resolves expressions against the current scope's literal bindings.
pub struct ExprResolver<'a> {
    scope: &'a ScopeTracker,
    key_separator: &'a str,
}

impl<'a> ExprResolver<'a> {
    pub fn new(scope: &'a ScopeTracker, key_separator: &'a str) -> Self {
        Self {
            scope,
            key_separator,
        }
    }

    /// Resolve an expression to its literal candidates.
    pub fn resolve(&self, expr: &Expr) -> Vec<String> {
        match expr {
            Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
                Some(value) => vec![value.to_string()],
                None => vec![],
            },
            Expr::Tpl(tpl) => self.resolve_template(tpl),
            Expr::Cond(cond) => {
                let mut candidates = self.resolve(&cond.cons);
                for candidate in self.resolve(&cond.alt) {
                    if !candidates.contains(&candidate) {
                        candidates.push(candidate);
                    }
                }
                candidates
            }
            Expr::Bin(bin) if bin.op == BinaryOp::Add => {
                let left = self.resolve(&bin.left);
                let right = self.resolve(&bin.right);
                cross_concat(&left, &right)
            }
            Expr::Ident(ident) => match self.scope.lookup_const(ident.sym.as_str()) {
                Some(ConstValue::Str(s)) => vec![s.clone()],
                _ => vec![],
            },
            Expr::Member(member) => self.resolve_member(member),
            Expr::Paren(paren) => self.resolve(&paren.expr),
            Expr::TsAs(e) => self.resolve(&e.expr),
            Expr::TsConstAssertion(e) => self.resolve(&e.expr),
            Expr::TsNonNull(e) => self.resolve(&e.expr),
            Expr::TsTypeAssertion(e) => self.resolve(&e.expr),
            Expr::TsSatisfies(e) => self.resolve(&e.expr),
            _ => vec![],
        }
    }

    /// Convenience for positions where at most one literal is expected.
    pub fn resolve_first(&self, expr: &Expr) -> Option<String> {
        self.resolve(expr).into_iter().next()
    }

    /// Template literal: abandoned unless every span resolves, in which case
    /// the cartesian product of fragments is produced.
    fn resolve_template(&self, tpl: &Tpl) -> Vec<String> {
        let mut candidates = vec![String::new()];

        for (i, quasi) in tpl.quasis.iter().enumerate() {
            if let Some(cooked) = &quasi.cooked
                && let Some(text) = cooked.as_str()
            {
                for candidate in &mut candidates {
                    candidate.push_str(text);
                }
            }

            if i < tpl.exprs.len() {
                let span = self.resolve(&tpl.exprs[i]);
                if span.is_empty() {
                    return vec![];
                }
                candidates = cross_concat(&candidates, &span);
            }
        }

        candidates
    }

    /// Property access into a statically-known object literal.
    fn resolve_member(&self, member: &MemberExpr) -> Vec<String> {
        let Some(ConstValue::Object(props)) = self.const_of(&member.obj) else {
            return vec![];
        };

        let names = match &member.prop {
            MemberProp::Ident(prop) => vec![prop.sym.to_string()],
            MemberProp::Computed(computed) => self.resolve(&computed.expr),
            MemberProp::PrivateName(_) => vec![],
        };

        names
            .iter()
            .filter_map(|name| props.get(name).and_then(ConstValue::as_str))
            .map(String::from)
            .collect()
    }

    fn const_of(&self, expr: &Expr) -> Option<ConstValue> {
        match expr {
            Expr::Ident(ident) => self.scope.lookup_const(ident.sym.as_str()).cloned(),
            Expr::Object(_) => Some(eval_const(self.scope, expr)),
            Expr::Member(member) => {
                let ConstValue::Object(props) = self.const_of(&member.obj)? else {
                    return None;
                };
                let name = match &member.prop {
                    MemberProp::Ident(prop) => prop.sym.to_string(),
                    MemberProp::Computed(computed) => self.resolve_first(&computed.expr)?,
                    MemberProp::PrivateName(_) => return None,
                };
                props.get(&name).cloned()
            }
            Expr::Paren(paren) => self.const_of(&paren.expr),
            Expr::TsAs(e) => self.const_of(&e.expr),
            Expr::TsConstAssertion(e) => self.const_of(&e.expr),
            Expr::TsSatisfies(e) => self.const_of(&e.expr),
            _ => None,
        }
    }

    /// Selector-API arrow: `t($ => $.a.b["c"])` reconstructs `a.b.c`.
    pub fn selector_key(&self, arrow: &ArrowExpr) -> Option<String> {
        let [Pat::Ident(param)] = arrow.params.as_slice() else {
            return None;
        };
        let BlockStmtOrExpr::Expr(body) = &*arrow.body else {
            return None;
        };

        let segments = self.member_chain(unwrap_parens(body), param.id.sym.as_str())?;
        if segments.is_empty() {
            return None;
        }
        Some(segments.join(self.key_separator))
    }

    fn member_chain(&self, expr: &Expr, root: &str) -> Option<Vec<String>> {
        match expr {
            Expr::Ident(ident) if ident.sym.as_str() == root => Some(Vec::new()),
            Expr::Member(member) => {
                let mut segments = self.member_chain(unwrap_parens(&member.obj), root)?;
                let segment = match &member.prop {
                    MemberProp::Ident(prop) => prop.sym.to_string(),
                    MemberProp::Computed(computed) => self.resolve_first(&computed.expr)?,
                    MemberProp::PrivateName(_) => return None,
                };
                segments.push(segment);
                Some(segments)
            }
            _ => None,
        }
    }
}

fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        _ => expr,
    }
}

fn cross_concat(left: &[String], right: &[String]) -> Vec<String> {
    if left.is_empty() || right.is_empty() {
        return vec![];
    }
    let mut out = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            out.push(format!("{}{}", l, r));
        }
    }
    out
}

/// Evaluate an initializer expression into a stored constant.
///
/// Object properties with non-literal values become `Unresolved` individually;
/// the object itself stays usable for its other properties.
pub fn eval_const(scope: &ScopeTracker, expr: &Expr) -> ConstValue {
    match expr {
        Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
            Some(value) => ConstValue::Str(value.to_string()),
            None => ConstValue::Unresolved,
        },
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            match tpl.quasis.first().and_then(|q| q.cooked.as_ref()) {
                Some(cooked) => match cooked.as_str() {
                    Some(text) => ConstValue::Str(text.to_string()),
                    None => ConstValue::Unresolved,
                },
                None => ConstValue::Unresolved,
            }
        }
        Expr::Object(obj) => {
            let mut props = IndexMap::new();
            for prop in &obj.props {
                let PropOrSpread::Prop(prop) = prop else {
                    continue;
                };
                match &**prop {
                    Prop::KeyValue(kv) => {
                        if let Some(name) = prop_name(&kv.key) {
                            props.insert(name, eval_const(scope, &kv.value));
                        }
                    }
                    Prop::Shorthand(ident) => {
                        let value = scope
                            .lookup_const(ident.sym.as_str())
                            .cloned()
                            .unwrap_or(ConstValue::Unresolved);
                        props.insert(ident.sym.to_string(), value);
                    }
                    _ => {}
                }
            }
            ConstValue::Object(props)
        }
        Expr::Array(arr) => {
            let elems = arr
                .elems
                .iter()
                .map(|elem| match elem {
                    Some(elem) => eval_const(scope, &elem.expr),
                    None => ConstValue::Unresolved,
                })
                .collect();
            ConstValue::Array(elems)
        }
        Expr::Ident(ident) => scope
            .lookup_const(ident.sym.as_str())
            .cloned()
            .unwrap_or(ConstValue::Unresolved),
        Expr::Bin(bin) if bin.op == BinaryOp::Add => {
            let left = eval_const(scope, &bin.left);
            let right = eval_const(scope, &bin.right);
            match (left.as_str(), right.as_str()) {
                (Some(l), Some(r)) => ConstValue::Str(format!("{}{}", l, r)),
                _ => ConstValue::Unresolved,
            }
        }
        Expr::Paren(paren) => eval_const(scope, &paren.expr),
        Expr::TsAs(e) => eval_const(scope, &e.expr),
        Expr::TsConstAssertion(e) => eval_const(scope, &e.expr),
        Expr::TsNonNull(e) => eval_const(scope, &e.expr),
        Expr::TsSatisfies(e) => eval_const(scope, &e.expr),
        _ => ConstValue::Unresolved,
    }
}

pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(String::from),
        _ => None,
    }
}
