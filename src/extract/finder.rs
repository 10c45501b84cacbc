//! The AST visitor that discovers translatable keys.
//!
//! A single pass per file walks the module, maintaining a scope stack for
//! translation bindings (`useTranslation`, `getFixedT`, custom hooks) and
//! literal constants, and records every translation call and Trans component
//! it can statically account for. Blocks are pre-scanned so identifiers used
//! before their textual declaration still resolve.

use swc_ecma_ast::{
    ArrowExpr, BlockStmt, CallExpr, Callee, Decl, Expr, ExprOrSpread, Function, ImportDecl,
    JSXAttrName, JSXAttrOrSpread, JSXAttrValue, JSXElement, JSXElementName, JSXExpr, Lit, Module,
    ModuleDecl, ModuleItem, ObjectLit, ObjectPatProp, Pat, Prop, PropOrSpread, Stmt,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::config::Config;
use crate::extract::jsx::JsxSerializer;
use crate::extract::matcher::{FnMatcher, callee_text};
use crate::extract::registry::{ExtractedKey, KeyContext};
use crate::extract::resolver::{ExprResolver, eval_const, prop_name};
use crate::extract::scope::{ConstValue, ScopeTracker, TransBinding};
use crate::plugins::PluginBus;

/// Walk a parsed module and return every key found, in source order.
pub fn find_keys(
    module: &Module,
    config: &Config,
    matcher: &FnMatcher,
    plugins: &PluginBus,
) -> Vec<ExtractedKey> {
    let mut finder = KeyFinder {
        config,
        matcher,
        plugins,
        scope: ScopeTracker::new(),
        keys: Vec::new(),
    };
    module.visit_with(&mut finder);
    finder.keys
}

struct KeyFinder<'a> {
    config: &'a Config,
    matcher: &'a FnMatcher,
    plugins: &'a PluginBus,
    scope: ScopeTracker,
    keys: Vec<ExtractedKey>,
}

/// Options parsed from a `t(key, options)` object or a Trans `tOptions` attr.
#[derive(Default)]
struct CallOptions {
    default_value: Option<String>,
    plural_defaults: std::collections::BTreeMap<String, String>,
    has_count: bool,
    is_ordinal: bool,
    context: KeyContext,
    ns: Option<String>,
}

enum HookKind {
    /// `useTranslation(ns?, { keyPrefix }?)` and configured custom hooks:
    /// the translation function comes out of a destructuring pattern.
    Destructured,
    /// `getFixedT(lng, ns?, keyPrefix?)` and custom hooks bound directly:
    /// the call result is the translation function itself.
    Direct,
}

impl<'a> KeyFinder<'a> {
    fn key_separator(&self) -> &str {
        self.config.key_separator.as_deref().unwrap_or(".")
    }

    // --- declarations -----------------------------------------------------

    /// Process every declarator in a statement list before visiting it, so an
    /// identifier used before its textual declaration in the same block still
    /// resolves. A declarator without initializer only declares its names;
    /// a later plain assignment never turns it into a resolvable binding.
    fn prescan_stmts<'s>(&mut self, stmts: impl Iterator<Item = &'s Stmt>) {
        for stmt in stmts {
            match stmt {
                Stmt::Decl(Decl::Var(var)) => {
                    for decl in &var.decls {
                        match &decl.init {
                            Some(init) => self.process_declarator(&decl.name, init),
                            None => self.declare_pat(&decl.name),
                        }
                    }
                }
                Stmt::Decl(Decl::Fn(func)) => {
                    self.scope.declare(func.ident.sym.as_str());
                }
                _ => {}
            }
        }
    }

    fn declare_pat(&mut self, pat: &Pat) {
        let mut names = Vec::new();
        pat_names(pat, &mut names);
        for name in names {
            self.scope.declare(&name);
        }
    }

    fn bind_params<'p>(&mut self, pats: impl Iterator<Item = &'p Pat>) {
        for pat in pats {
            let mut names = Vec::new();
            pat_names(pat, &mut names);
            for name in names {
                self.scope.bind_opaque(name);
            }
        }
    }

    /// Upgrade a declarator's bindings once it is reached in textual order.
    fn process_declarator(&mut self, name: &Pat, init: &Expr) {
        if let Some(call) = as_call(init)
            && let Some((binding, kind)) = self.detect_hook(call)
        {
            self.bind_hook_result(name, binding, kind);
            return;
        }

        match name {
            Pat::Ident(ident) => {
                let value = eval_const(&self.scope, init);
                self.scope.bind_const(ident.id.sym.to_string(), value);
            }
            Pat::Object(object) => {
                let value = eval_const(&self.scope, init);
                for prop in &object.props {
                    let (prop_key, local) = match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            let Some(key) = prop_name(&kv.key) else {
                                continue;
                            };
                            let Pat::Ident(alias) = &*kv.value else {
                                continue;
                            };
                            (key, alias.id.sym.to_string())
                        }
                        ObjectPatProp::Assign(assign) => {
                            (assign.key.sym.to_string(), assign.key.sym.to_string())
                        }
                        ObjectPatProp::Rest(_) => continue,
                    };
                    match &value {
                        ConstValue::Object(props) => {
                            let bound = props.get(&prop_key).cloned().unwrap_or(ConstValue::Unresolved);
                            self.scope.bind_const(local, bound);
                        }
                        _ => self.scope.bind_opaque(local),
                    }
                }
            }
            Pat::Array(array) => {
                let value = eval_const(&self.scope, init);
                for (i, elem) in array.elems.iter().enumerate() {
                    let Some(Pat::Ident(ident)) = elem.as_ref() else {
                        continue;
                    };
                    match &value {
                        ConstValue::Array(elems) => {
                            let bound = elems.get(i).cloned().unwrap_or(ConstValue::Unresolved);
                            self.scope.bind_const(ident.id.sym.to_string(), bound);
                        }
                        _ => self.scope.bind_opaque(ident.id.sym.to_string()),
                    }
                }
            }
            _ => {}
        }
    }

    // --- hooks ------------------------------------------------------------

    fn detect_hook(&self, call: &CallExpr) -> Option<(TransBinding, HookKind)> {
        let text = callee_text(&call.callee)?;
        let last = text.rsplit('.').next().unwrap_or(&text);

        if last == "useTranslation" {
            let ns = self.hook_ns_arg(call.args.first());
            let key_prefix = call.args.get(1).and_then(|arg| {
                let Expr::Object(object) = &*arg.expr else {
                    return None;
                };
                self.object_str_prop(object, "keyPrefix")
            });
            return Some((TransBinding { ns, key_prefix }, HookKind::Destructured));
        }

        if last == "getFixedT" {
            let resolver = ExprResolver::new(&self.scope, self.key_separator());
            let ns = self.hook_ns_arg(call.args.get(1));
            let key_prefix = call
                .args
                .get(2)
                .filter(|arg| arg.spread.is_none())
                .and_then(|arg| resolver.resolve_first(&arg.expr));
            return Some((TransBinding { ns, key_prefix }, HookKind::Direct));
        }

        for hook in &self.config.custom_hooks {
            if last != hook.name {
                continue;
            }
            let resolver = ExprResolver::new(&self.scope, self.key_separator());
            let arg_str = |idx: Option<usize>| {
                idx.and_then(|i| call.args.get(i))
                    .filter(|arg| arg.spread.is_none())
                    .and_then(|arg| resolver.resolve_first(&arg.expr))
            };
            let binding = TransBinding {
                ns: arg_str(hook.ns_arg),
                key_prefix: arg_str(hook.key_prefix_arg),
            };
            return Some((binding, HookKind::Destructured));
        }

        None
    }

    /// Namespace argument: a string literal, or the first element of an array.
    fn hook_ns_arg(&self, arg: Option<&ExprOrSpread>) -> Option<String> {
        let arg = arg.filter(|arg| arg.spread.is_none())?;
        let resolver = ExprResolver::new(&self.scope, self.key_separator());
        match &*arg.expr {
            Expr::Array(array) => array
                .elems
                .iter()
                .flatten()
                .next()
                .and_then(|elem| resolver.resolve_first(&elem.expr)),
            expr => resolver.resolve_first(expr),
        }
    }

    fn object_str_prop(&self, object: &ObjectLit, name: &str) -> Option<String> {
        let resolver = ExprResolver::new(&self.scope, self.key_separator());
        for prop in &object.props {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            match &**prop {
                Prop::KeyValue(kv) if prop_name(&kv.key).as_deref() == Some(name) => {
                    return resolver.resolve_first(&kv.value);
                }
                Prop::Shorthand(ident) if ident.sym.as_str() == name => {
                    return self
                        .scope
                        .lookup_const(name)
                        .and_then(ConstValue::as_str)
                        .map(String::from);
                }
                _ => {}
            }
        }
        None
    }

    fn bind_hook_result(&mut self, name: &Pat, binding: TransBinding, kind: HookKind) {
        match (name, kind) {
            (Pat::Ident(ident), HookKind::Direct) => {
                self.scope.bind_translation(ident.id.sym.to_string(), binding);
            }
            (Pat::Ident(ident), HookKind::Destructured) => {
                // The whole hook result; member calls go through `*.t`.
                self.scope.bind_opaque(ident.id.sym.to_string());
            }
            (Pat::Object(object), _) => {
                for prop in &object.props {
                    let (prop_key, local) = match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            let Some(key) = prop_name(&kv.key) else {
                                continue;
                            };
                            let Pat::Ident(alias) = &*kv.value else {
                                continue;
                            };
                            (key, alias.id.sym.to_string())
                        }
                        ObjectPatProp::Assign(assign) => {
                            (assign.key.sym.to_string(), assign.key.sym.to_string())
                        }
                        ObjectPatProp::Rest(_) => continue,
                    };
                    if prop_key == "t" {
                        self.scope.bind_translation(local, binding.clone());
                    } else {
                        self.scope.bind_opaque(local);
                    }
                }
            }
            (Pat::Array(array), _) => {
                // Array-destructured hook results expose t first.
                for (i, elem) in array.elems.iter().enumerate() {
                    let Some(Pat::Ident(ident)) = elem.as_ref() else {
                        continue;
                    };
                    if i == 0 {
                        self.scope.bind_translation(ident.id.sym.to_string(), binding.clone());
                    } else {
                        self.scope.bind_opaque(ident.id.sym.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    // --- translation calls ------------------------------------------------

    fn translation_binding(&self, call: &CallExpr) -> Option<TransBinding> {
        if let Callee::Expr(expr) = &call.callee
            && let Expr::Ident(ident) = &**expr
        {
            let name = ident.sym.as_str();
            if let Some(binding) = self.scope.resolve(name) {
                return Some(binding.clone());
            }
            // A declared non-translation binding shadows the patterns.
            if !self.scope.is_declared(name) && self.matcher.matches(name) {
                return Some(TransBinding::default());
            }
            return None;
        }

        let text = callee_text(&call.callee)?;
        if self.matcher.matches(&text) {
            return Some(TransBinding::default());
        }
        None
    }

    fn collect_call(&self, call: &CallExpr, binding: &TransBinding) -> Vec<ExtractedKey> {
        let resolver = ExprResolver::new(&self.scope, self.key_separator());

        let Some(arg0) = call.args.first() else {
            return Vec::new();
        };
        if arg0.spread.is_some() {
            return Vec::new();
        }

        let is_fallback_list = matches!(&*arg0.expr, Expr::Array(_));
        let candidates: Vec<String> = match &*arg0.expr {
            Expr::Arrow(arrow) => resolver.selector_key(arrow).into_iter().collect(),
            Expr::Array(array) => array
                .elems
                .iter()
                .flatten()
                .filter(|elem| elem.spread.is_none())
                .filter_map(|elem| resolver.resolve_first(&elem.expr))
                .collect(),
            expr => resolver.resolve(expr),
        };
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut options = CallOptions::default();
        let mut options_arg = call.args.get(1);
        if let Some(arg) = options_arg
            && arg.spread.is_none()
            && let Some(value) = resolver.resolve_first(&arg.expr)
            && matches!(&*arg.expr, Expr::Lit(Lit::Str(_)) | Expr::Tpl(_))
        {
            // t(key, "Default", options?)
            options.default_value = Some(value);
            options_arg = call.args.get(2);
        }
        if let Some(arg) = options_arg
            && arg.spread.is_none()
            && let Expr::Object(object) = &*arg.expr
        {
            self.parse_options(object, &mut options);
        }

        let mut keys = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            let mut key = self.build_key(candidate, binding, &options);
            // For a fallback list only the first candidate owns the default.
            if is_fallback_list && i > 0 {
                key.default_value = None;
                key.plural_defaults.clear();
            }
            keys.push(key);
        }
        keys
    }

    fn parse_options(&self, object: &ObjectLit, options: &mut CallOptions) {
        let resolver = ExprResolver::new(&self.scope, self.key_separator());

        for prop in &object.props {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            match &**prop {
                Prop::KeyValue(kv) => {
                    let Some(name) = prop_name(&kv.key) else {
                        continue;
                    };
                    match name.as_str() {
                        "defaultValue" => {
                            options.default_value = resolver.resolve_first(&kv.value);
                        }
                        "count" => options.has_count = true,
                        "ordinal" => {
                            if let Expr::Lit(Lit::Bool(b)) = &*kv.value {
                                options.is_ordinal = b.value;
                            }
                        }
                        "context" => options.context = self.parse_context(&kv.value),
                        "ns" => options.ns = self.hook_ns_from_expr(&kv.value),
                        other => {
                            if let Some(suffix) = other.strip_prefix("defaultValue_")
                                && let Some(value) = resolver.resolve_first(&kv.value)
                            {
                                options.plural_defaults.insert(suffix.to_string(), value);
                            }
                        }
                    }
                }
                Prop::Shorthand(ident) => match ident.sym.as_str() {
                    "count" => options.has_count = true,
                    "context" => {
                        let candidates = match self.scope.lookup_const("context") {
                            Some(ConstValue::Str(s)) => vec![s.clone()],
                            _ => Vec::new(),
                        };
                        options.context = KeyContext::Dynamic(candidates);
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    /// A lone string literal is a static context; anything else is dynamic,
    /// carrying whatever candidates plugins or the resolver can prove.
    fn parse_context(&self, expr: &Expr) -> KeyContext {
        if let Expr::Lit(Lit::Str(s)) = expr {
            return match s.value.as_str() {
                Some(value) if !value.is_empty() => KeyContext::Static(value.to_string()),
                _ => KeyContext::None,
            };
        }
        if matches!(expr, Expr::Lit(_)) {
            return KeyContext::None;
        }

        let mut candidates = self.plugins.extract_context(expr, self.config);
        if candidates.is_empty() {
            let resolver = ExprResolver::new(&self.scope, self.key_separator());
            candidates = resolver.resolve(expr);
        }
        KeyContext::Dynamic(candidates)
    }

    fn hook_ns_from_expr(&self, expr: &Expr) -> Option<String> {
        let resolver = ExprResolver::new(&self.scope, self.key_separator());
        match expr {
            Expr::Array(array) => array
                .elems
                .iter()
                .flatten()
                .next()
                .and_then(|elem| resolver.resolve_first(&elem.expr)),
            expr => resolver.resolve_first(expr),
        }
    }

    /// Apply namespace precedence and key prefix to one key candidate.
    ///
    /// Precedence: namespace embedded in the key, then the `ns` option, then
    /// the binding's namespace, then none (the default namespace applies at
    /// registry time).
    fn build_key(&self, candidate: &str, binding: &TransBinding, options: &CallOptions) -> ExtractedKey {
        let (embedded_ns, bare) = self.split_ns(candidate);

        let (ns, implicit) = if let Some(ns) = embedded_ns {
            (Some(ns), false)
        } else if let Some(ns) = &options.ns {
            (Some(ns.clone()), false)
        } else if let Some(ns) = &binding.ns {
            (Some(ns.clone()), true)
        } else {
            (None, true)
        };

        let key = match &binding.key_prefix {
            Some(prefix) => format!("{}{}{}", prefix, self.key_separator(), bare),
            None => bare.to_string(),
        };

        ExtractedKey {
            key,
            ns,
            default_value: options.default_value.clone(),
            plural_defaults: options.plural_defaults.clone(),
            has_count: options.has_count,
            is_ordinal: options.is_ordinal,
            context: options.context.clone(),
            ns_is_implicit: implicit,
        }
    }

    fn split_ns<'k>(&self, candidate: &'k str) -> (Option<String>, &'k str) {
        let Some(sep) = &self.config.ns_separator else {
            return (None, candidate);
        };
        match candidate.split_once(sep.as_str()) {
            Some((ns, rest)) if !ns.is_empty() && !rest.is_empty() => {
                (Some(ns.to_string()), rest)
            }
            _ => (None, candidate),
        }
    }

    // --- Trans components -------------------------------------------------

    fn is_trans_component(&self, element: &JSXElement) -> bool {
        let JSXElementName::Ident(ident) = &element.opening.name else {
            return false;
        };
        self.config
            .components
            .iter()
            .any(|c| c == ident.sym.as_str())
    }

    fn collect_trans(&self, element: &JSXElement) -> Option<ExtractedKey> {
        let mut i18n_key = None;
        let mut defaults = None;
        let mut options = CallOptions::default();

        for attr in &element.opening.attrs {
            let JSXAttrOrSpread::JSXAttr(attr) = attr else {
                continue;
            };
            let JSXAttrName::Ident(name) = &attr.name else {
                continue;
            };
            match name.sym.as_str() {
                "i18nKey" => i18n_key = self.attr_string(attr.value.as_ref()),
                "ns" => {
                    if let Some(value) = attr.value.as_ref() {
                        options.ns = match value {
                            JSXAttrValue::JSXExprContainer(container) => match &container.expr {
                                JSXExpr::Expr(expr) => self.hook_ns_from_expr(expr),
                                JSXExpr::JSXEmptyExpr(_) => None,
                            },
                            _ => self.attr_string(Some(value)),
                        };
                    }
                }
                "defaults" => defaults = self.attr_string(attr.value.as_ref()),
                "count" => options.has_count = true,
                "context" => match attr.value.as_ref() {
                    Some(JSXAttrValue::Str(s)) => {
                        options.context = match s.value.as_str() {
                            Some(value) if !value.is_empty() => {
                                KeyContext::Static(value.to_string())
                            }
                            _ => KeyContext::None,
                        };
                    }
                    Some(JSXAttrValue::JSXExprContainer(container)) => {
                        if let JSXExpr::Expr(expr) = &container.expr {
                            options.context = self.parse_context(expr);
                        }
                    }
                    _ => {}
                },
                "tOptions" => {
                    if let Some(JSXAttrValue::JSXExprContainer(container)) = attr.value.as_ref()
                        && let JSXExpr::Expr(expr) = &container.expr
                        && let Expr::Object(object) = &**expr
                    {
                        self.parse_options(object, &mut options);
                    }
                }
                _ => {}
            }
        }

        let serialized = JsxSerializer::new(&self.config.keep_basic_tags)
            .serialize(&element.children);
        if options.default_value.is_none() {
            options.default_value = defaults.or_else(|| {
                if serialized.is_empty() {
                    None
                } else {
                    Some(serialized)
                }
            });
        }

        // Without i18nKey the serialized content is the (natural) key, taken
        // verbatim without namespace splitting.
        let (candidate, split) = match i18n_key {
            Some(key) => (key, true),
            None => (options.default_value.clone()?, false),
        };

        if split {
            return Some(self.build_key(&candidate, &TransBinding::default(), &options));
        }
        Some(ExtractedKey {
            key: candidate,
            ns_is_implicit: options.ns.is_none(),
            ns: options.ns,
            default_value: options.default_value,
            plural_defaults: options.plural_defaults,
            has_count: options.has_count,
            is_ordinal: options.is_ordinal,
            context: options.context,
        })
    }

    fn attr_string(&self, value: Option<&JSXAttrValue>) -> Option<String> {
        match value? {
            JSXAttrValue::Str(s) => s.value.as_str().map(String::from),
            JSXAttrValue::JSXExprContainer(container) => match &container.expr {
                JSXExpr::Expr(expr) => {
                    let resolver = ExprResolver::new(&self.scope, self.key_separator());
                    resolver.resolve_first(expr)
                }
                JSXExpr::JSXEmptyExpr(_) => None,
            },
            _ => None,
        }
    }
}

impl Visit for KeyFinder<'_> {
    fn visit_module(&mut self, node: &Module) {
        let stmts = node.body.iter().filter_map(|item| match item {
            ModuleItem::Stmt(stmt) => Some(stmt),
            ModuleItem::ModuleDecl(_) => None,
        });
        self.prescan_stmts(stmts);
        // Exported declarations hoist the same way.
        for item in &node.body {
            if let ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) = item {
                match &export.decl {
                    Decl::Var(var) => {
                        for decl in &var.decls {
                            match &decl.init {
                                Some(init) => self.process_declarator(&decl.name, init),
                                None => self.declare_pat(&decl.name),
                            }
                        }
                    }
                    Decl::Fn(func) => self.scope.declare(func.ident.sym.as_str()),
                    _ => {}
                }
            }
        }
        node.visit_children_with(self);
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        self.scope.enter_scope();
        self.prescan_stmts(node.stmts.iter());
        node.visit_children_with(self);
        self.scope.exit_scope();
    }

    fn visit_function(&mut self, node: &Function) {
        self.scope.enter_scope();
        self.bind_params(node.params.iter().map(|p| &p.pat));
        node.visit_children_with(self);
        self.scope.exit_scope();
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.scope.enter_scope();
        self.bind_params(node.params.iter());
        node.visit_children_with(self);
        self.scope.exit_scope();
    }

    fn visit_import_decl(&mut self, node: &ImportDecl) {
        for specifier in &node.specifiers {
            use swc_ecma_ast::ImportSpecifier;
            let local = match specifier {
                ImportSpecifier::Named(named) => &named.local,
                ImportSpecifier::Default(default) => &default.local,
                ImportSpecifier::Namespace(ns) => &ns.local,
            };
            self.scope.bind_opaque(local.sym.to_string());
        }
    }

    fn visit_var_declarator(&mut self, node: &swc_ecma_ast::VarDeclarator) {
        if let Some(init) = &node.init {
            self.process_declarator(&node.name, init);
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        let plugin_keys = self.plugins.on_visit_call(node, &self.scope, self.config);
        self.keys.extend(plugin_keys);

        if let Some(binding) = self.translation_binding(node) {
            let keys = self.collect_call(node, &binding);
            self.keys.extend(keys);
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_element(&mut self, node: &JSXElement) {
        if self.is_trans_component(node)
            && let Some(key) = self.collect_trans(node)
        {
            self.keys.push(key);
        }
        node.visit_children_with(self);
    }
}

fn as_call(expr: &Expr) -> Option<&CallExpr> {
    match expr {
        Expr::Call(call) => Some(call),
        Expr::Await(await_expr) => as_call(&await_expr.arg),
        Expr::Paren(paren) => as_call(&paren.expr),
        Expr::TsAs(e) => as_call(&e.expr),
        Expr::TsNonNull(e) => as_call(&e.expr),
        _ => None,
    }
}

/// Collect every binding name introduced by a pattern.
fn pat_names(pat: &Pat, out: &mut Vec<String>) {
    match pat {
        Pat::Ident(ident) => out.push(ident.id.sym.to_string()),
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                pat_names(elem, out);
            }
        }
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => pat_names(&kv.value, out),
                    ObjectPatProp::Assign(assign) => out.push(assign.key.sym.to_string()),
                    ObjectPatProp::Rest(rest) => pat_names(&rest.arg, out),
                }
            }
        }
        Pat::Assign(assign) => pat_names(&assign.left, out),
        Pat::Rest(rest) => pat_names(&rest.arg, out),
        Pat::Invalid(_) | Pat::Expr(_) => {}
    }
}
