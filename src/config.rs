//! Configuration file loading and parsing.
//!
//! Configuration lives in `.lokeyrc.json`, discovered by walking up from the
//! working directory (stopping at a `.git` boundary). Every field has a default
//! so a missing file is not an error.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Deserializer, Serialize};

pub const CONFIG_FILE_NAME: &str = ".lokeyrc.json";

/// Output format of the generated resource files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain JSON object.
    #[default]
    Json,
    /// YAML block mapping.
    Yaml,
    /// ES module: `export default {...};`
    Esm,
    /// CommonJS module: `module.exports = {...};`
    Cjs,
    /// TypeScript module: `export default {...} as const;`
    Ts,
}

/// A user-defined translation hook, e.g. `useAppTranslation`.
///
/// `ns_arg` and `key_prefix_arg` are positional argument indices into the hook
/// call from which the namespace and key prefix are read.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomHook {
    pub name: String,
    #[serde(default)]
    pub ns_arg: Option<usize>,
    #[serde(default)]
    pub key_prefix_arg: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Glob patterns for source files to scan.
    #[serde(default = "default_input")]
    pub input: Vec<String>,
    /// Glob patterns for files to skip.
    #[serde(default)]
    pub ignores: Vec<String>,
    /// Configured locales; the first entry is the primary language.
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    /// Translation function patterns: exact names (`t`, `i18next.t`) or
    /// wildcard-suffix patterns (`*.t`) matched over the dot-joined call text.
    #[serde(default = "default_functions")]
    pub functions: Vec<String>,
    /// Translatable component names.
    #[serde(default = "default_components")]
    pub components: Vec<String>,
    /// User-defined translation hooks recognized by the scope tracker.
    #[serde(default)]
    pub custom_hooks: Vec<CustomHook>,
    /// Namespace used when neither the key nor the binding carries one.
    #[serde(default = "default_ns")]
    pub default_ns: String,
    /// Key separator; `null`/`false` disables nesting (flat resource trees).
    #[serde(
        default = "default_key_separator",
        deserialize_with = "deserialize_separator"
    )]
    pub key_separator: Option<String>,
    /// Namespace separator inside key literals; `null`/`false` disables it.
    #[serde(
        default = "default_ns_separator",
        deserialize_with = "deserialize_separator"
    )]
    pub ns_separator: Option<String>,
    /// Separator between a key and its context suffix.
    #[serde(default = "default_suffix_separator")]
    pub context_separator: String,
    /// Separator between a key and its plural-category suffix.
    #[serde(default = "default_suffix_separator")]
    pub plural_separator: String,
    /// Output path template with `{{language}}` and `{{namespace}}` placeholders.
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub format: OutputFormat,
    /// Indentation width for generated files.
    #[serde(default = "default_indentation")]
    pub indentation: usize,
    /// Whether generated files end with a newline.
    #[serde(default = "default_true")]
    pub trailing_newline: bool,
    /// Sort resource trees recursively (code-point order) instead of keeping
    /// on-disk order with new keys appended.
    #[serde(default)]
    pub sort: bool,
    /// Emit the base key alongside context variants even when the context
    /// expression is a single static value.
    #[serde(default)]
    pub generate_base_for_context: bool,
    /// Preserve every context-suffixed variant of a key that is used anywhere
    /// with a non-static context expression.
    #[serde(default)]
    pub preserve_dynamic_context: bool,
    /// Value given to newly created keys in secondary languages.
    #[serde(default)]
    pub secondary_placeholder: String,
    /// Namespaces excluded from reconciliation.
    #[serde(default)]
    pub ignored_namespaces: Vec<String>,
    /// JSX tags rendered by name instead of by index when they carry no
    /// attributes. An empty list makes them ordinary indexed elements.
    #[serde(default = "default_basic_tags")]
    pub keep_basic_tags: Vec<String>,
}

fn default_input() -> Vec<String> {
    vec!["src/**/*.{js,jsx,ts,tsx}".to_string()]
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_functions() -> Vec<String> {
    vec!["t".to_string(), "*.t".to_string()]
}

fn default_components() -> Vec<String> {
    vec!["Trans".to_string()]
}

fn default_ns() -> String {
    "translation".to_string()
}

fn default_key_separator() -> Option<String> {
    Some(".".to_string())
}

fn default_ns_separator() -> Option<String> {
    Some(":".to_string())
}

fn default_suffix_separator() -> String {
    "_".to_string()
}

fn default_output() -> String {
    "locales/{{language}}/{{namespace}}.json".to_string()
}

fn default_indentation() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_basic_tags() -> Vec<String> {
    ["br", "strong", "i", "p"].map(String::from).to_vec()
}

/// Accepts a string, `null`, or `false` (i18next configs commonly use
/// `keySeparator: false` to disable nesting).
fn deserialize_separator<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Separator {
        Text(String),
        Toggle(bool),
    }

    match Option::<Separator>::deserialize(deserializer)? {
        Some(Separator::Text(s)) => Ok(Some(s)),
        Some(Separator::Toggle(false)) | None => Ok(None),
        Some(Separator::Toggle(true)) => Err(serde::de::Error::custom(
            "separator must be a string, false, or null",
        )),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            ignores: Vec::new(),
            locales: default_locales(),
            functions: default_functions(),
            components: default_components(),
            custom_hooks: Vec::new(),
            default_ns: default_ns(),
            key_separator: default_key_separator(),
            ns_separator: default_ns_separator(),
            context_separator: default_suffix_separator(),
            plural_separator: default_suffix_separator(),
            output: default_output(),
            format: OutputFormat::default(),
            indentation: default_indentation(),
            trailing_newline: true,
            sort: false,
            generate_base_for_context: false,
            preserve_dynamic_context: false,
            secondary_placeholder: String::new(),
            ignored_namespaces: Vec::new(),
            keep_basic_tags: default_basic_tags(),
        }
    }
}

impl Config {
    /// The locale whose source-code default values are authoritative.
    pub fn primary_locale(&self) -> &str {
        self.locales.first().map(String::as_str).unwrap_or("en")
    }

    pub fn is_primary(&self, locale: &str) -> bool {
        self.primary_locale() == locale
    }

    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns, an empty locale list, an
    /// output template without a `{{language}}` placeholder, or zero
    /// indentation.
    pub fn validate(&self) -> Result<()> {
        for pattern in self.input.iter().chain(&self.ignores) {
            // Brace alternation ({js,ts}) is expanded before glob compilation.
            for expanded in expand_braces(pattern) {
                Pattern::new(&expanded)
                    .with_context(|| format!("Invalid glob pattern: \"{}\"", pattern))?;
            }
        }

        if self.locales.is_empty() {
            anyhow::bail!("'locales' must contain at least one locale");
        }

        if !self.output.contains("{{language}}") {
            anyhow::bail!("'output' template must contain a {{{{language}}}} placeholder");
        }

        if self.indentation == 0 {
            anyhow::bail!("'indentation' must be at least 1");
        }

        Ok(())
    }
}

/// Expand a single level of `{a,b}` brace alternation into plain glob patterns.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (pattern.find('{'), pattern.find('}')) else {
        return vec![pattern.to_string()];
    };
    if close < open {
        return vec![pattern.to_string()];
    }

    let prefix = &pattern[..open];
    let body = &pattern[open + 1..close];
    let suffix = &pattern[close + 1..];

    body.split(',')
        .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt, suffix)))
        .collect()
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// The config file the values came from; `None` when using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn from_file(&self) -> bool {
        self.path.is_some()
    }
}

/// Load configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ConfigLoadResult> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config.validate()?;
    Ok(ConfigLoadResult {
        config,
        path: Some(path.to_path_buf()),
    })
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => load_config_file(&path),
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
