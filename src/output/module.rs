//! JS/TS module rendering and parsing of resource trees.
//!
//! Module formats wrap a JSON object literal in an export statement. Parsing
//! accepts any file whose first `{` .. last `}` span is valid JSON, which
//! covers everything this tool writes.

use anyhow::{Context, Result, bail};

use crate::merge::tree::Tree;
use crate::output::json;

pub enum ModuleStyle {
    Esm,
    Cjs,
    Ts,
}

pub fn render(tree: &Tree, indentation: usize, style: ModuleStyle) -> Result<String> {
    let body = json::render(tree, indentation)?;
    Ok(match style {
        ModuleStyle::Esm => format!("export default {};", body),
        ModuleStyle::Cjs => format!("module.exports = {};", body),
        ModuleStyle::Ts => format!("export default {} as const;", body),
    })
}

pub fn parse(content: &str) -> Result<Tree> {
    if content.trim().is_empty() {
        return Ok(Tree::new());
    }
    let start = content.find('{');
    let end = content.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        bail!("No object literal found in module file");
    };
    if end < start {
        bail!("No object literal found in module file");
    }
    json::parse(&content[start..=end]).context("Failed to parse module resource object")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::output::module::*;

    fn tree(value: serde_json::Value) -> Tree {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_render_styles() {
        let t = tree(json!({"a": "1"}));
        assert_eq!(
            render(&t, 2, ModuleStyle::Esm).unwrap(),
            "export default {\n  \"a\": \"1\"\n};"
        );
        assert!(render(&t, 2, ModuleStyle::Cjs)
            .unwrap()
            .starts_with("module.exports = {"));
        assert!(render(&t, 2, ModuleStyle::Ts).unwrap().ends_with("} as const;"));
    }

    #[test]
    fn test_parse_each_style() {
        for style in [ModuleStyle::Esm, ModuleStyle::Cjs, ModuleStyle::Ts] {
            let t = tree(json!({"a": {"b": "v"}}));
            let rendered = render(&t, 2, style).unwrap();
            let reparsed = parse(&rendered).unwrap();
            assert_eq!(
                serde_json::Value::Object(reparsed),
                json!({"a": {"b": "v"}})
            );
        }
    }

    #[test]
    fn test_parse_rejects_braceless_file() {
        assert!(parse("export default 42;").is_err());
    }
}
