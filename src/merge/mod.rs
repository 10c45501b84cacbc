//! Reconciliation of extracted keys against existing locale resources.

pub mod paths;
pub mod tree;

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::Config;
use crate::extract::registry::KeyRegistry;
use crate::merge::tree::{SortComparator, Tree, collect_leaves, remove_leaf, same_tree, set_leaf, sort_tree, split_key};
use crate::plural::{cardinal_categories, expand_variants, ordinal_categories, variant_default};

/// A structural mismatch between the registry and an existing file.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub locale: String,
    pub namespace: String,
    pub key: String,
    pub reason: String,
}

/// Knobs that vary per invocation rather than per project.
#[derive(Clone, Copy, Default)]
pub struct MergeBehavior {
    /// Overwrite primary-locale values with the extracted defaults.
    pub sync_primary: bool,
    /// Reset secondary-locale values to the placeholder.
    pub sync_secondary: bool,
    pub comparator: Option<SortComparator>,
}

/// Outcome of reconciling one (locale, namespace) pair.
pub struct NamespaceMerge {
    pub locale: String,
    pub namespace: String,
    pub tree: Tree,
    pub changed: bool,
    pub added: usize,
    pub removed: usize,
    pub conflicts: Vec<Conflict>,
}

/// Reconcile one namespace of one locale.
///
/// Keys present in the registry but missing on disk are added (defaults in
/// the primary locale, the placeholder elsewhere). Leaves on disk with no
/// registry counterpart are removed, except plural forms still valid for the
/// locale and, when configured, variants of dynamic-context keys. Existing
/// translations are never touched unless a sync flag says so.
pub fn merge_namespace(
    registry: &KeyRegistry,
    config: &Config,
    locale: &str,
    namespace: &str,
    existing: Option<&Tree>,
    behavior: MergeBehavior,
) -> NamespaceMerge {
    let key_separator = config.key_separator.as_deref();
    let is_primary = config.is_primary(locale);

    let mut tree = existing.cloned().unwrap_or_default();
    let mut conflicts = Vec::new();
    let mut added = 0;
    let mut removed = 0;

    // Every leaf this namespace must contain, with the value to use when the
    // leaf is new. First usage wins on duplicates.
    let mut desired: IndexMap<String, String> = IndexMap::new();
    for key in registry.in_namespace(namespace) {
        for variant in expand_variants(key, locale, config) {
            let name = format!("{}{}", key.key, variant.suffix);
            let value = if is_primary {
                variant_default(key, &variant).unwrap_or_default().to_string()
            } else {
                config.secondary_placeholder.clone()
            };
            desired.entry(name).or_insert(value);
        }
    }

    // Remove stale leaves first so a leftover leaf cannot block a new branch.
    for (path, _) in collect_leaves(&tree) {
        let Some(name) = rejoin(&path, key_separator) else {
            continue;
        };
        if desired.contains_key(&name) || is_preserved(&name, registry, namespace, locale, config)
        {
            continue;
        }
        if remove_leaf(&mut tree, &path) {
            removed += 1;
        }
    }

    for (name, value) in &desired {
        let path = split_key(name, key_separator);
        let exists = tree::get_leaf(&tree, &path).is_some();

        let write = if !exists {
            Some(value.clone())
        } else if is_primary && behavior.sync_primary {
            // Only meaningful when the source actually carries a default.
            let fresh = value.clone();
            (!fresh.is_empty()).then_some(fresh)
        } else if !is_primary && behavior.sync_secondary {
            Some(config.secondary_placeholder.clone())
        } else {
            None
        };

        let Some(write) = write else { continue };
        match set_leaf(&mut tree, &path, Value::String(write)) {
            Ok(()) => {
                if !exists {
                    added += 1;
                }
            }
            Err(reason) => conflicts.push(Conflict {
                locale: locale.to_string(),
                namespace: namespace.to_string(),
                key: name.clone(),
                reason,
            }),
        }
    }

    if config.sort {
        sort_tree(&mut tree, behavior.comparator);
    }

    let changed = match existing {
        Some(existing) => !same_tree(existing, &tree),
        None => true,
    };

    NamespaceMerge {
        locale: locale.to_string(),
        namespace: namespace.to_string(),
        tree,
        changed,
        added,
        removed,
        conflicts,
    }
}

/// Full key name of a leaf path, or `None` when the path cannot correspond to
/// any key (nested objects in flat-key mode).
fn rejoin(path: &[String], key_separator: Option<&str>) -> Option<String> {
    match key_separator {
        Some(sep) => Some(path.join(sep)),
        None => {
            if path.len() == 1 {
                Some(path[0].clone())
            } else {
                None
            }
        }
    }
}

/// Whether a stale-looking leaf should survive reconciliation.
fn is_preserved(
    name: &str,
    registry: &KeyRegistry,
    namespace: &str,
    locale: &str,
    config: &Config,
) -> bool {
    for key in registry.in_namespace(namespace) {
        if config.preserve_dynamic_context
            && key.context.is_dynamic()
            && name.starts_with(&format!("{}{}", key.key, config.context_separator))
        {
            return true;
        }

        if !key.has_count {
            continue;
        }

        let mut bases = vec![key.key.clone()];
        for context in key.context.candidates() {
            bases.push(format!(
                "{}{}{}",
                key.key, config.context_separator, context
            ));
        }

        let categories: HashSet<&str> = if key.is_ordinal {
            ordinal_categories(locale)
        } else {
            cardinal_categories(locale)
        }
        .iter()
        .copied()
        .chain(std::iter::once("zero"))
        .collect();

        for base in &bases {
            let Some(rest) = name.strip_prefix(base.as_str()) else {
                continue;
            };
            let Some(rest) = rest.strip_prefix(config.plural_separator.as_str()) else {
                continue;
            };
            let category = if key.is_ordinal {
                match rest
                    .strip_prefix("ordinal")
                    .and_then(|r| r.strip_prefix(config.plural_separator.as_str()))
                {
                    Some(category) => category,
                    None => continue,
                }
            } else {
                rest
            };
            if categories.contains(category) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::Config;
    use crate::extract::registry::{ExtractedKey, KeyContext, KeyRegistry};
    use crate::merge::*;

    fn registry(keys: Vec<ExtractedKey>) -> KeyRegistry {
        let mut registry = KeyRegistry::new("translation");
        for key in keys {
            registry.insert(key);
        }
        registry
    }

    fn tree(value: serde_json::Value) -> Tree {
        value.as_object().unwrap().clone()
    }

    fn merge(
        registry: &KeyRegistry,
        config: &Config,
        locale: &str,
        existing: Option<&Tree>,
    ) -> NamespaceMerge {
        merge_namespace(
            registry,
            config,
            locale,
            "translation",
            existing,
            MergeBehavior::default(),
        )
    }

    #[test]
    fn test_new_namespace_gets_defaults_in_primary() {
        let config = Config::default();
        let reg = registry(vec![ExtractedKey {
            default_value: Some("Save".to_string()),
            ..ExtractedKey::new("button.save")
        }]);

        let result = merge(&reg, &config, "en", None);
        assert!(result.changed);
        assert_eq!(result.added, 1);
        assert_eq!(
            Value::Object(result.tree),
            json!({"button": {"save": "Save"}})
        );
    }

    #[test]
    fn test_secondary_gets_placeholder() {
        let config = Config::default();
        let reg = registry(vec![ExtractedKey {
            default_value: Some("Save".to_string()),
            ..ExtractedKey::new("save")
        }]);

        let result = merge(&reg, &config, "de", None);
        assert_eq!(Value::Object(result.tree), json!({"save": ""}));
    }

    #[test]
    fn test_existing_translation_untouched() {
        let config = Config::default();
        let reg = registry(vec![ExtractedKey {
            default_value: Some("Save".to_string()),
            ..ExtractedKey::new("save")
        }]);
        let existing = tree(json!({"save": "Speichern"}));

        let result = merge(&reg, &config, "de", Some(&existing));
        assert!(!result.changed);
        assert_eq!(Value::Object(result.tree), json!({"save": "Speichern"}));
    }

    #[test]
    fn test_sync_primary_overwrites_default() {
        let config = Config::default();
        let reg = registry(vec![ExtractedKey {
            default_value: Some("Save changes".to_string()),
            ..ExtractedKey::new("save")
        }]);
        let existing = tree(json!({"save": "Save"}));

        let behavior = MergeBehavior {
            sync_primary: true,
            ..Default::default()
        };
        let result = merge_namespace(&reg, &config, "en", "translation", Some(&existing), behavior);
        assert!(result.changed);
        assert_eq!(Value::Object(result.tree), json!({"save": "Save changes"}));
    }

    #[test]
    fn test_stale_key_removed_and_branch_pruned() {
        let config = Config::default();
        let reg = registry(vec![ExtractedKey::new("kept")]);
        let existing = tree(json!({"kept": "x", "old": {"nested": "y"}}));

        let result = merge(&reg, &config, "en", Some(&existing));
        assert_eq!(result.removed, 1);
        assert_eq!(Value::Object(result.tree), json!({"kept": "x"}));
    }

    #[test]
    fn test_plural_expansion_per_locale() {
        let config = Config {
            locales: vec!["en".to_string(), "ar".to_string()],
            ..Config::default()
        };
        let reg = registry(vec![ExtractedKey {
            has_count: true,
            ..ExtractedKey::new("apple")
        }]);

        let en = merge(&reg, &config, "en", None);
        assert_eq!(
            Value::Object(en.tree),
            json!({"apple_one": "", "apple_other": ""})
        );

        let ar = merge(&reg, &config, "ar", None);
        assert_eq!(ar.tree.len(), 6);
        assert!(ar.tree.contains_key("apple_few"));
    }

    #[test]
    fn test_valid_plural_forms_preserved() {
        let config = Config::default();
        let reg = registry(vec![ExtractedKey {
            has_count: true,
            ..ExtractedKey::new("apple")
        }]);
        // `zero` is always allowed; `few` is not a category of English.
        let existing = tree(json!({
            "apple_one": "1", "apple_other": "n", "apple_zero": "0", "apple_few": "f"
        }));

        let result = merge(&reg, &config, "en", Some(&existing));
        assert!(result.tree.contains_key("apple_zero"));
        assert!(!result.tree.contains_key("apple_few"));
        assert_eq!(result.removed, 1);
    }

    #[test]
    fn test_dynamic_context_preserves_unknown_variants() {
        let config = Config {
            preserve_dynamic_context: true,
            ..Config::default()
        };
        let reg = registry(vec![ExtractedKey {
            context: KeyContext::Dynamic(vec![]),
            ..ExtractedKey::new("friend")
        }]);
        let existing = tree(json!({"friend": "x", "friend_male": "y", "friend_female": "z"}));

        let result = merge(&reg, &config, "en", Some(&existing));
        assert!(!result.changed);
        assert_eq!(result.tree.len(), 3);
    }

    #[test]
    fn test_stale_flat_leaf_yields_to_new_branch() {
        let config = Config::default();
        let reg = registry(vec![ExtractedKey::new("button.save")]);
        let existing = tree(json!({"button": "flat"}));

        let result = merge(&reg, &config, "en", Some(&existing));
        assert!(result.conflicts.is_empty());
        assert_eq!(Value::Object(result.tree), json!({"button": {"save": ""}}));
    }

    #[test]
    fn test_conflicting_keys_reported() {
        let config = Config::default();
        let reg = registry(vec![
            ExtractedKey::new("button"),
            ExtractedKey::new("button.save"),
        ]);

        let result = merge(&reg, &config, "en", None);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].key, "button.save");
    }

    #[test]
    fn test_sync_secondary_resets_to_placeholder() {
        let config = Config::default();
        let reg = registry(vec![ExtractedKey::new("save")]);
        let existing = tree(json!({"save": "Speichern"}));

        let behavior = MergeBehavior {
            sync_secondary: true,
            ..Default::default()
        };
        let result = merge_namespace(&reg, &config, "de", "translation", Some(&existing), behavior);
        assert!(result.changed);
        assert_eq!(Value::Object(result.tree), json!({"save": ""}));
    }

    #[test]
    fn test_sort_only_difference_counts_as_change() {
        let config = Config {
            sort: true,
            ..Config::default()
        };
        let reg = registry(vec![ExtractedKey::new("zebra"), ExtractedKey::new("apple")]);
        let existing = tree(json!({"zebra": "Z", "apple": "A"}));

        let result = merge(&reg, &config, "en", Some(&existing));
        assert!(result.changed);
        let keys: Vec<&String> = result.tree.keys().collect();
        assert_eq!(keys, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_sorted_output() {
        let config = Config {
            sort: true,
            ..Config::default()
        };
        let reg = registry(vec![ExtractedKey::new("zebra"), ExtractedKey::new("apple")]);

        let result = merge(&reg, &config, "en", None);
        let keys: Vec<&String> = result.tree.keys().collect();
        assert_eq!(keys, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let config = Config::default();
        let reg = registry(vec![
            ExtractedKey {
                default_value: Some("Save".to_string()),
                ..ExtractedKey::new("button.save")
            },
            ExtractedKey {
                has_count: true,
                ..ExtractedKey::new("apple")
            },
        ]);

        let first = merge(&reg, &config, "en", None);
        let second = merge(&reg, &config, "en", Some(&first.tree));
        assert!(!second.changed);
        assert_eq!(second.added, 0);
        assert_eq!(second.removed, 0);
    }

    #[test]
    fn test_flat_keys_leave_nested_objects_alone() {
        let config = Config {
            key_separator: None,
            ..Config::default()
        };
        let reg = registry(vec![ExtractedKey::new("button.save")]);
        let existing = tree(json!({"legacy": {"nested": "kept"}}));

        let result = merge(&reg, &config, "en", Some(&existing));
        assert_eq!(
            Value::Object(result.tree),
            json!({"legacy": {"nested": "kept"}, "button.save": ""})
        );
    }
}
