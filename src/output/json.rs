//! JSON rendering and parsing of resource trees.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::merge::tree::Tree;

/// Pretty-print a tree with the configured indentation width.
pub fn render(tree: &Tree, indentation: usize) -> Result<String> {
    let indent = " ".repeat(indentation);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut serializer)
        .context("Failed to serialize JSON")?;
    String::from_utf8(buf).context("Serialized JSON is not valid UTF-8")
}

pub fn parse(content: &str) -> Result<Tree> {
    if content.trim().is_empty() {
        return Ok(Tree::new());
    }
    let value: Value = serde_json::from_str(content).context("Failed to parse JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("Root of resource file must be an object"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::output::json::*;

    #[test]
    fn test_render_indentation() {
        let tree = json!({"a": {"b": "v"}}).as_object().unwrap().clone();
        let two = render(&tree, 2).unwrap();
        assert_eq!(two, "{\n  \"a\": {\n    \"b\": \"v\"\n  }\n}");
        let four = render(&tree, 4).unwrap();
        assert!(four.contains("\n    \"a\""));
    }

    #[test]
    fn test_render_empty_tree() {
        assert_eq!(render(&Tree::new(), 2).unwrap(), "{}");
    }

    #[test]
    fn test_parse_round_trip_preserves_order() {
        let tree = parse(r#"{"z": "1", "a": {"y": "2", "b": "3"}}"#).unwrap();
        let keys: Vec<&String> = tree.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        assert!(parse("[1, 2]").is_err());
        assert!(parse("\"text\"").is_err());
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  \n").unwrap().is_empty());
    }
}
