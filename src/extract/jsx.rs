//! Serialization of Trans component children into a default-value string.
//!
//! Mirrors how react-i18next renders `<Trans>` children: meaningful children
//! are numbered left to right, whitelisted basic tags keep their name, and
//! interpolation containers become `{{name}}` placeholders.

use swc_ecma_ast::{
    Expr, JSXElement, JSXElementChild, JSXElementName, JSXExpr, Lit, Prop, PropOrSpread,
};

use crate::extract::resolver::prop_name;

/// Remove every whitespace run that contains a newline, keep the rest
/// verbatim. JSX treats a newline-bearing run as formatting, not content.
pub fn clean_jsx_text(raw: &str) -> String {
    let mut out = String::new();
    let mut run = String::new();

    for ch in raw.chars() {
        if ch.is_whitespace() {
            run.push(ch);
        } else {
            if !run.is_empty() {
                if !run.contains('\n') {
                    out.push_str(&run);
                }
                run.clear();
            }
            out.push(ch);
        }
    }
    if !run.is_empty() && !run.contains('\n') {
        out.push_str(&run);
    }
    out
}

pub struct JsxSerializer<'a> {
    basic_tags: &'a [String],
}

impl<'a> JsxSerializer<'a> {
    pub fn new(basic_tags: &'a [String]) -> Self {
        Self { basic_tags }
    }

    /// Serialize Trans children into the default value, trimming the
    /// formatting whitespace left at either end.
    pub fn serialize(&self, children: &[JSXElementChild]) -> String {
        self.serialize_children(children).trim().to_string()
    }

    /// Serialize one child list. Indexes restart at zero for every nesting
    /// level, counting only children that contribute a rendered node: cleaned
    /// text, expression containers, and non-basic elements. Whitespace-only
    /// text and basic tags consume no index.
    fn serialize_children(&self, children: &[JSXElementChild]) -> String {
        let mut out = String::new();
        let mut index = 0usize;

        for child in children {
            match child {
                JSXElementChild::JSXText(text) => {
                    let cleaned = clean_jsx_text(&text.value);
                    if cleaned.is_empty() {
                        continue;
                    }
                    out.push_str(&cleaned);
                    index += 1;
                }
                JSXElementChild::JSXExprContainer(container) => match &container.expr {
                    // Comment containers like {/* note */} render nothing.
                    JSXExpr::JSXEmptyExpr(_) => {}
                    JSXExpr::Expr(expr) => {
                        out.push_str(&serialize_expr(expr));
                        index += 1;
                    }
                },
                JSXElementChild::JSXElement(element) => {
                    self.serialize_element(element, &mut out, &mut index);
                }
                JSXElementChild::JSXFragment(fragment) => {
                    let inner = self.serialize_children(&fragment.children);
                    out.push_str(&format!("<{index}>{inner}</{index}>"));
                    index += 1;
                }
                JSXElementChild::JSXSpreadChild(_) => {
                    index += 1;
                }
            }
        }

        out
    }

    fn serialize_element(&self, element: &JSXElement, out: &mut String, index: &mut usize) {
        if let Some(name) = ident_name(&element.opening.name)
            && element.opening.attrs.is_empty()
            && self.basic_tags.iter().any(|t| t == &name)
            && let Some(inner) = self.text_only_children(&element.children)
        {
            // Whitelisted tags without attributes keep their name and do
            // not consume an index.
            if inner.is_empty() {
                out.push_str(&format!("<{name}/>"));
            } else {
                out.push_str(&format!("<{name}>{inner}</{name}>"));
            }
            return;
        }

        let inner = self.serialize_children(&element.children);
        out.push_str(&format!("<{index}>{inner}</{index}>"));
        *index += 1;
    }

    /// Concatenated cleaned text if every child is a text node, else `None`.
    fn text_only_children(&self, children: &[JSXElementChild]) -> Option<String> {
        let mut text = String::new();
        for child in children {
            match child {
                JSXElementChild::JSXText(node) => text.push_str(&clean_jsx_text(&node.value)),
                _ => return None,
            }
        }
        Some(text)
    }
}

/// Render an expression container child.
///
/// `{name}` and `{{ name }}` both interpolate at runtime, so both become
/// `{{name}}`. String literals pass through verbatim (`{" "}` is the idiom
/// for a forced space). Anything else renders nothing but still holds its
/// index slot.
fn serialize_expr(expr: &Expr) -> String {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().unwrap_or_default().to_string(),
        Expr::Ident(ident) => format!("{{{{{}}}}}", ident.sym),
        Expr::Object(object) if object.props.len() == 1 => {
            let PropOrSpread::Prop(prop) = &object.props[0] else {
                return String::new();
            };
            let name = match &**prop {
                Prop::Shorthand(ident) => Some(ident.sym.to_string()),
                Prop::KeyValue(kv) => prop_name(&kv.key),
                _ => None,
            };
            match name {
                Some(name) => format!("{{{{{name}}}}}"),
                None => String::new(),
            }
        }
        _ => String::new(),
    }
}

fn ident_name(name: &JSXElementName) -> Option<String> {
    match name {
        JSXElementName::Ident(ident) => Some(ident.sym.to_string()),
        _ => None,
    }
}
