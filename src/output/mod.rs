//! Resource file serialization: format dispatch and atomic writes.

pub mod json;
pub mod module;
pub mod yaml;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::OutputFormat;
use crate::merge::tree::Tree;
use crate::output::module::ModuleStyle;

/// Render a tree in the configured format.
pub fn render(
    tree: &Tree,
    format: OutputFormat,
    indentation: usize,
    trailing_newline: bool,
) -> Result<String> {
    let mut content = match format {
        OutputFormat::Json => json::render(tree, indentation)?,
        OutputFormat::Yaml => yaml::render(tree, indentation)?,
        OutputFormat::Esm => module::render(tree, indentation, ModuleStyle::Esm)?,
        OutputFormat::Cjs => module::render(tree, indentation, ModuleStyle::Cjs)?,
        OutputFormat::Ts => module::render(tree, indentation, ModuleStyle::Ts)?,
    };
    if trailing_newline {
        content.push('\n');
    }
    Ok(content)
}

/// Parse an existing resource file in the configured format.
pub fn parse(content: &str, format: OutputFormat) -> Result<Tree> {
    match format {
        OutputFormat::Json => json::parse(content),
        OutputFormat::Yaml => yaml::parse(content),
        OutputFormat::Esm | OutputFormat::Cjs | OutputFormat::Ts => module::parse(content),
    }
}

/// Write a file via a temporary sibling and rename, so readers never observe
/// a half-written resource.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp, content)
        .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", tmp.display()))?;
    Ok(())
}
