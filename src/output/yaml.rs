//! YAML rendering and parsing of resource trees.
//!
//! Rendering is a small block-style emitter: string scalars are always
//! double-quoted (JSON string syntax is valid YAML), keys stay plain when
//! they are safely unquoted. Parsing goes through serde_yaml into the same
//! order-preserving tree the JSON path uses.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::merge::tree::Tree;

pub fn render(tree: &Tree, indentation: usize) -> Result<String> {
    if tree.is_empty() {
        return Ok("{}".to_string());
    }
    let mut out = String::new();
    emit_map(tree, 0, indentation, &mut out)?;
    // The emitter ends every line with a newline; the trailing-newline policy
    // is applied by the caller.
    out.truncate(out.trim_end_matches('\n').len());
    Ok(out)
}

fn emit_map(tree: &Tree, depth: usize, indentation: usize, out: &mut String) -> Result<()> {
    let pad = " ".repeat(depth * indentation);
    for (key, value) in tree {
        out.push_str(&pad);
        out.push_str(&render_key(key)?);
        match value {
            Value::Object(child) if child.is_empty() => out.push_str(": {}\n"),
            Value::Object(child) => {
                out.push_str(":\n");
                emit_map(child, depth + 1, indentation, out)?;
            }
            Value::Array(items) => {
                out.push_str(":\n");
                let item_pad = " ".repeat((depth + 1) * indentation);
                for item in items {
                    out.push_str(&item_pad);
                    out.push_str("- ");
                    out.push_str(&render_scalar(item)?);
                    out.push('\n');
                }
            }
            scalar => {
                out.push_str(": ");
                out.push_str(&render_scalar(scalar)?);
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn render_key(key: &str) -> Result<String> {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if plain {
        Ok(key.to_string())
    } else {
        serde_json::to_string(key).context("Failed to quote YAML key")
    }
}

fn render_scalar(value: &Value) -> Result<String> {
    match value {
        Value::String(_) => serde_json::to_string(value).context("Failed to quote YAML string"),
        Value::Object(_) | Value::Array(_) => {
            // Nested collections inside sequences come out as JSON flow style,
            // which YAML accepts verbatim.
            serde_json::to_string(value).context("Failed to render YAML value")
        }
        other => Ok(other.to_string()),
    }
}

pub fn parse(content: &str) -> Result<Tree> {
    if content.trim().is_empty() {
        return Ok(Tree::new());
    }
    let value: Value = serde_yaml::from_str(content).context("Failed to parse YAML")?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("Root of resource file must be a mapping"),
    }
}
