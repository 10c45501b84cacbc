//! Lokey - i18next key extraction and locale file synchronization
//!
//! Lokey scans JS/TS/JSX source for i18next translation usages (`t()` calls,
//! `<Trans>` components, `useTranslation`/`getFixedT` bindings), reconciles the
//! discovered keys against the per-(locale, namespace) resource files on disk,
//! and keeps those files consistent across languages with different CLDR plural
//! rules.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands)
//! - `config`: Configuration file loading and parsing
//! - `extract`: AST-driven key extraction (scope tracking, expression
//!   resolution, JSX serialization)
//! - `plural`: CLDR plural categories and plural/context suffix expansion
//! - `plugins`: Optional-capability hook bus for extraction plugins
//! - `merge`: Reconciliation of extracted keys with existing resource trees
//! - `output`: Resource serialization (JSON/YAML/JS/TS) and path resolution
//! - `sync`: Run-scoped session orchestrating a full extract-and-sync pass
//! - `report`: Console reporting

pub mod cli;
pub mod config;
pub mod extract;
pub mod merge;
pub mod output;
pub mod plugins;
pub mod plural;
pub mod report;
pub mod sync;
