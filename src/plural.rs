//! CLDR plural categories and key variant expansion.
//!
//! Each locale owns its cardinal and ordinal category set; a key with a count
//! expands to one entry per category of the target locale, and context
//! candidates multiply in front of the plural suffix (`friend_male_one`).

use crate::config::Config;
use crate::extract::registry::{ExtractedKey, KeyContext};

const OTHER_ONLY: &[&str] = &["other"];
const ONE_OTHER: &[&str] = &["one", "other"];
const ONE_MANY_OTHER: &[&str] = &["one", "many", "other"];
const ONE_FEW_MANY_OTHER: &[&str] = &["one", "few", "many", "other"];
const ALL_SIX: &[&str] = &["zero", "one", "two", "few", "many", "other"];

/// Cardinal plural categories for a locale, per CLDR.
pub fn cardinal_categories(locale: &str) -> &'static [&'static str] {
    match language_subtag(locale).as_str() {
        "ja" | "zh" | "ko" | "th" | "vi" | "id" | "ms" => OTHER_ONLY,
        "fr" | "es" | "it" | "pt" => ONE_MANY_OTHER,
        "ru" | "uk" | "pl" | "cs" | "sk" | "lt" => ONE_FEW_MANY_OTHER,
        "ar" | "cy" => ALL_SIX,
        "he" => &["one", "two", "many", "other"],
        "lv" => &["zero", "one", "other"],
        "ro" | "hr" | "sr" | "bs" => &["one", "few", "other"],
        "sl" => &["one", "two", "few", "other"],
        "ga" => &["one", "two", "few", "many", "other"],
        _ => ONE_OTHER,
    }
}

/// Ordinal plural categories for a locale, per CLDR.
pub fn ordinal_categories(locale: &str) -> &'static [&'static str] {
    match language_subtag(locale).as_str() {
        "en" => &["one", "two", "few", "other"],
        "fr" | "sv" | "ga" => ONE_OTHER,
        "it" => &["many", "other"],
        "cy" => ALL_SIX,
        _ => OTHER_ONLY,
    }
}

/// Language subtag of a locale tag: `pt-BR` and `pt_BR` both give `pt`.
fn language_subtag(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_ascii_lowercase()
}

/// One concrete leaf a key expands to in a given locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Suffix appended to the key name, empty for the base form.
    pub suffix: String,
    /// The plural category this variant covers, if any.
    pub category: Option<&'static str>,
}

impl Variant {
    fn base() -> Self {
        Self {
            suffix: String::new(),
            category: None,
        }
    }
}

/// Expand a key into the variants a locale's resource file must contain.
///
/// Context candidates come first in the suffix, plural categories second.
/// A dynamic context always keeps the unsuffixed base; a static context only
/// keeps it when `generate_base_for_context` is set. A count against a locale
/// whose only category is `other` stays unsuffixed but still records the
/// category so default-value overrides resolve.
pub fn expand_variants(key: &ExtractedKey, locale: &str, config: &Config) -> Vec<Variant> {
    let contexts: Vec<Option<&str>> = match &key.context {
        KeyContext::None => vec![None],
        KeyContext::Static(c) => {
            if config.generate_base_for_context {
                vec![None, Some(c.as_str())]
            } else {
                vec![Some(c.as_str())]
            }
        }
        KeyContext::Dynamic(candidates) => {
            let mut all = vec![None];
            all.extend(candidates.iter().map(|c| Some(c.as_str())));
            all
        }
    };

    let plurals: Vec<(String, Option<&'static str>)> = if key.has_count {
        let categories = if key.is_ordinal {
            ordinal_categories(locale)
        } else {
            cardinal_categories(locale)
        };
        if !key.is_ordinal && categories == OTHER_ONLY {
            vec![(String::new(), Some("other"))]
        } else {
            categories
                .iter()
                .map(|category| {
                    let suffix = if key.is_ordinal {
                        format!(
                            "{sep}ordinal{sep}{category}",
                            sep = config.plural_separator
                        )
                    } else {
                        format!("{}{}", config.plural_separator, category)
                    };
                    (suffix, Some(*category))
                })
                .collect()
        }
    } else {
        vec![(String::new(), None)]
    };

    let mut variants = Vec::with_capacity(contexts.len() * plurals.len());
    for context in &contexts {
        for (plural_suffix, category) in &plurals {
            let mut suffix = String::new();
            if let Some(context) = context {
                suffix.push_str(&config.context_separator);
                suffix.push_str(context);
            }
            suffix.push_str(plural_suffix);
            variants.push(Variant {
                suffix,
                category: *category,
            });
        }
    }

    if variants.is_empty() {
        variants.push(Variant::base());
    }
    variants
}

/// Default value for one variant of a key.
///
/// Category-specific overrides (`defaultValue_other`, `defaultValue_ordinal_two`)
/// win over the generic default.
pub fn variant_default<'k>(key: &'k ExtractedKey, variant: &Variant) -> Option<&'k str> {
    if let Some(category) = variant.category {
        let lookup = if key.is_ordinal {
            format!("ordinal_{}", category)
        } else {
            category.to_string()
        };
        if let Some(value) = key.plural_defaults.get(&lookup) {
            return Some(value);
        }
    }
    key.default_value.as_deref()
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::extract::registry::{ExtractedKey, KeyContext};
    use crate::plural::*;

    fn suffixes(key: &ExtractedKey, locale: &str, config: &Config) -> Vec<String> {
        expand_variants(key, locale, config)
            .into_iter()
            .map(|v| v.suffix)
            .collect()
    }

    #[test]
    fn test_subtag_normalization() {
        assert_eq!(cardinal_categories("pt-BR"), cardinal_categories("pt"));
        assert_eq!(cardinal_categories("zh_Hant"), cardinal_categories("zh"));
        assert_eq!(cardinal_categories("unknown-locale"), ONE_OTHER);
    }

    #[test]
    fn test_simple_key_single_variant() {
        let config = Config::default();
        let key = ExtractedKey::new("save");
        assert_eq!(suffixes(&key, "en", &config), vec![""]);
    }

    #[test]
    fn test_count_expands_per_locale() {
        let config = Config::default();
        let key = ExtractedKey {
            has_count: true,
            ..ExtractedKey::new("apple")
        };
        assert_eq!(suffixes(&key, "en", &config), vec!["_one", "_other"]);
        assert_eq!(
            suffixes(&key, "ar", &config),
            vec!["_zero", "_one", "_two", "_few", "_many", "_other"]
        );
    }

    #[test]
    fn test_other_only_locale_stays_unsuffixed() {
        let config = Config::default();
        let key = ExtractedKey {
            has_count: true,
            ..ExtractedKey::new("apple")
        };
        let variants = expand_variants(&key, "ja", &config);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].suffix, "");
        assert_eq!(variants[0].category, Some("other"));
    }

    #[test]
    fn test_ordinal_suffixes() {
        let config = Config::default();
        let key = ExtractedKey {
            has_count: true,
            is_ordinal: true,
            ..ExtractedKey::new("place")
        };
        assert_eq!(
            suffixes(&key, "en", &config),
            vec![
                "_ordinal_one",
                "_ordinal_two",
                "_ordinal_few",
                "_ordinal_other"
            ]
        );
    }

    #[test]
    fn test_static_context_without_base() {
        let config = Config::default();
        let key = ExtractedKey {
            context: KeyContext::Static("male".to_string()),
            ..ExtractedKey::new("friend")
        };
        assert_eq!(suffixes(&key, "en", &config), vec!["_male"]);
    }

    #[test]
    fn test_static_context_with_base() {
        let config = Config {
            generate_base_for_context: true,
            ..Config::default()
        };
        let key = ExtractedKey {
            context: KeyContext::Static("male".to_string()),
            ..ExtractedKey::new("friend")
        };
        assert_eq!(suffixes(&key, "en", &config), vec!["", "_male"]);
    }

    #[test]
    fn test_dynamic_context_keeps_base() {
        let config = Config::default();
        let key = ExtractedKey {
            context: KeyContext::Dynamic(vec!["male".to_string(), "female".to_string()]),
            ..ExtractedKey::new("friend")
        };
        assert_eq!(suffixes(&key, "en", &config), vec!["", "_male", "_female"]);
    }

    #[test]
    fn test_context_before_plural() {
        let config = Config::default();
        let key = ExtractedKey {
            has_count: true,
            context: KeyContext::Static("male".to_string()),
            ..ExtractedKey::new("friend")
        };
        assert_eq!(
            suffixes(&key, "en", &config),
            vec!["_male_one", "_male_other"]
        );
    }

    #[test]
    fn test_variant_default_override() {
        let mut key = ExtractedKey {
            has_count: true,
            default_value: Some("An apple".to_string()),
            ..ExtractedKey::new("apple")
        };
        key.plural_defaults
            .insert("other".to_string(), "Apples".to_string());

        let config = Config::default();
        let variants = expand_variants(&key, "en", &config);
        assert_eq!(variant_default(&key, &variants[0]), Some("An apple"));
        assert_eq!(variant_default(&key, &variants[1]), Some("Apples"));
    }

    #[test]
    fn test_ordinal_default_lookup() {
        let mut key = ExtractedKey {
            has_count: true,
            is_ordinal: true,
            default_value: Some("{{count}}th".to_string()),
            ..ExtractedKey::new("place")
        };
        key.plural_defaults
            .insert("ordinal_one".to_string(), "{{count}}st".to_string());

        let config = Config::default();
        let variants = expand_variants(&key, "en", &config);
        assert_eq!(variant_default(&key, &variants[0]), Some("{{count}}st"));
        assert_eq!(variant_default(&key, &variants[3]), Some("{{count}}th"));
    }
}
