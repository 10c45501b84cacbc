//! End-to-end sync tests: real source trees, real locale files on disk.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

use lokey::config::{Config, OutputFormat};
use lokey::sync::{Session, SyncOptions};

fn write(dir: &TempDir, relative: &str, content: &str) {
    let path = dir.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read_json(dir: &TempDir, relative: &str) -> Value {
    let content = fs::read_to_string(dir.path().join(relative)).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn exists(dir: &TempDir, relative: &str) -> bool {
    dir.path().join(relative).exists()
}

fn session(dir: &TempDir, config: Config) -> Session {
    Session::new(config, dir.path())
}

fn config_with_locales(locales: &[&str]) -> Config {
    Config {
        locales: locales.iter().map(|l| l.to_string()).collect(),
        ..Config::default()
    }
}

#[test]
fn test_sync_creates_locale_files() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/App.tsx",
        "t('button.save', 'Save'); t('button.cancel', 'Cancel');",
    );

    let s = session(&dir, config_with_locales(&["en", "de"]));
    let result = s.sync(&SyncOptions::default()).unwrap();

    assert!(result.changed);
    assert_eq!(result.keys_found, 2);
    assert_eq!(
        read_json(&dir, "locales/en/translation.json"),
        json!({"button": {"save": "Save", "cancel": "Cancel"}})
    );
    assert_eq!(
        read_json(&dir, "locales/de/translation.json"),
        json!({"button": {"save": "", "cancel": ""}})
    );
}

#[test]
fn test_sync_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/App.tsx",
        "t('apple', { count: n, defaultValue: 'Apple' }); t('b.c', 'X');",
    );

    let s = session(&dir, config_with_locales(&["en", "ar"]));
    let first = s.sync(&SyncOptions::default()).unwrap();
    assert!(first.changed);

    let en_before = fs::read(dir.path().join("locales/en/translation.json")).unwrap();
    let ar_before = fs::read(dir.path().join("locales/ar/translation.json")).unwrap();

    let second = s.sync(&SyncOptions::default()).unwrap();
    assert!(!second.changed);
    for file in &second.files {
        assert!(!file.changed, "{} reported as changed", file.path.display());
    }

    assert_eq!(
        en_before,
        fs::read(dir.path().join("locales/en/translation.json")).unwrap()
    );
    assert_eq!(
        ar_before,
        fs::read(dir.path().join("locales/ar/translation.json")).unwrap()
    );
}

#[test]
fn test_existing_translations_survive() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('greeting', 'Hello');");
    write(
        &dir,
        "locales/de/translation.json",
        r#"{"greeting": "Hallo"}"#,
    );

    let s = session(&dir, config_with_locales(&["en", "de"]));
    s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(
        read_json(&dir, "locales/de/translation.json"),
        json!({"greeting": "Hallo"})
    );
}

#[test]
fn test_stale_keys_removed() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('kept');");
    write(
        &dir,
        "locales/en/translation.json",
        r#"{"kept": "x", "old": {"nested": "y"}}"#,
    );

    let s = session(&dir, config_with_locales(&["en"]));
    let result = s.sync(&SyncOptions::default()).unwrap();

    assert!(result.changed);
    assert_eq!(
        read_json(&dir, "locales/en/translation.json"),
        json!({"kept": "x"})
    );
}

#[test]
fn test_trans_children_serialization() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/App.tsx",
        r#"
        const A = () => <Trans i18nKey="bold">wo<b>r</b>d</Trans>;
        const B = () => (
            <Trans i18nKey="link">
                word <a href="/x">link</a> word
            </Trans>
        );
        "#,
    );

    let s = session(&dir, config_with_locales(&["en"]));
    s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(
        read_json(&dir, "locales/en/translation.json"),
        json!({
            "bold": "wo<1>r</1>d",
            "link": "word <1>link</1> word"
        })
    );
}

#[test]
fn test_use_translation_namespace_file() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/App.tsx",
        r#"
        function C() {
            const { t } = useTranslation('common');
            return t('button.save', 'Save');
        }
        "#,
    );

    let s = session(&dir, config_with_locales(&["en"]));
    s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(
        read_json(&dir, "locales/en/common.json"),
        json!({"button": {"save": "Save"}})
    );
    assert!(!exists(&dir, "locales/en/translation.json"));
}

#[test]
fn test_dynamic_context_variants() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/App.tsx",
        "t('friend', { context: isMale ? 'male' : 'female' });",
    );

    let s = session(&dir, config_with_locales(&["en"]));
    s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(
        read_json(&dir, "locales/en/translation.json"),
        json!({"friend": "", "friend_male": "", "friend_female": ""})
    );
}

#[test]
fn test_plural_forms_per_locale() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('apple', { count: n });");

    let s = session(&dir, config_with_locales(&["en", "ar", "ja"]));
    s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(
        read_json(&dir, "locales/en/translation.json"),
        json!({"apple_one": "", "apple_other": ""})
    );
    let ar = read_json(&dir, "locales/ar/translation.json");
    assert_eq!(ar.as_object().unwrap().len(), 6);
    assert_eq!(
        read_json(&dir, "locales/ja/translation.json"),
        json!({"apple": ""})
    );
}

#[test]
fn test_valid_plural_forms_preserved_on_disk() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('apple', { count: n });");
    write(
        &dir,
        "locales/en/translation.json",
        r#"{"apple_one": "1", "apple_other": "n", "apple_zero": "none", "apple_few": "f"}"#,
    );

    let s = session(&dir, config_with_locales(&["en"]));
    s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(
        read_json(&dir, "locales/en/translation.json"),
        json!({"apple_one": "1", "apple_other": "n", "apple_zero": "none"})
    );
}

#[test]
fn test_conflict_aborts_all_writes() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/App.tsx",
        r#"
        t('button');
        t('button.save');
        function C() {
            const { t } = useTranslation('common');
            return t('pending');
        }
        "#,
    );

    let s = session(&dir, config_with_locales(&["en"]));
    let result = s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].key, "button.save");
    // All-or-nothing: the clean namespace was not written either.
    assert!(!exists(&dir, "locales/en/translation.json"));
    assert!(!exists(&dir, "locales/en/common.json"));
}

#[test]
fn test_multi_segment_namespace_lifecycle() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        output: "src/{{namespace}}/locales/{{language}}.json".to_string(),
        ..config_with_locales(&["en"])
    };

    write(&dir, "src/App.tsx", "t('widgets/component:title');");
    // Does not match the output template, must never be touched.
    write(&dir, "src/notes/readme.json", r#"{"note": "keep me"}"#);

    let s = session(&dir, config.clone());
    s.sync(&SyncOptions::default()).unwrap();
    assert_eq!(
        read_json(&dir, "src/widgets/component/locales/en.json"),
        json!({"title": ""})
    );

    // The key disappears from source: the file empties but stays in place.
    write(&dir, "src/App.tsx", "const nothing = 1;");
    let s = session(&dir, config);
    s.sync(&SyncOptions::default()).unwrap();
    assert_eq!(
        read_json(&dir, "src/widgets/component/locales/en.json"),
        json!({})
    );
    assert_eq!(
        read_json(&dir, "src/notes/readme.json"),
        json!({"note": "keep me"})
    );
}

#[test]
fn test_merged_file_mode() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        output: "locales/{{language}}.json".to_string(),
        ..config_with_locales(&["en"])
    };
    write(&dir, "src/App.tsx", "t('a', 'A'); t('common:b', 'B');");

    let s = session(&dir, config);
    s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(
        read_json(&dir, "locales/en.json"),
        json!({"translation": {"a": "A"}, "common": {"b": "B"}})
    );
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('pending');");

    let s = session(&dir, config_with_locales(&["en"]));
    let options = SyncOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = s.sync(&options).unwrap();

    assert!(result.changed);
    assert!(!exists(&dir, "locales/en/translation.json"));
}

#[test]
fn test_yaml_format_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        output: "locales/{{language}}/{{namespace}}.yml".to_string(),
        format: OutputFormat::Yaml,
        ..config_with_locales(&["en"])
    };
    write(&dir, "src/App.tsx", "t('button.save', 'Save');");

    let s = session(&dir, config.clone());
    let first = s.sync(&SyncOptions::default()).unwrap();
    assert!(first.changed);

    let content = fs::read_to_string(dir.path().join("locales/en/translation.yml")).unwrap();
    assert_eq!(content, "button:\n  save: \"Save\"\n");

    let s = session(&dir, config);
    let second = s.sync(&SyncOptions::default()).unwrap();
    assert!(!second.changed);
}

#[test]
fn test_malformed_resource_file_skipped() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('key');");
    write(&dir, "locales/en/translation.json", "{ not json");

    let s = session(&dir, config_with_locales(&["en"]));
    let result = s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(result.file_errors.len(), 1);
    // The broken file was left exactly as it was.
    assert_eq!(
        fs::read_to_string(dir.path().join("locales/en/translation.json")).unwrap(),
        "{ not json"
    );
}

#[test]
fn test_source_parse_error_does_not_abort() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/Good.tsx", "t('good');");
    write(&dir, "src/Bad.tsx", "const = broken ;;;");

    let s = session(&dir, config_with_locales(&["en"]));
    let result = s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(result.parse_errors.len(), 1);
    assert_eq!(result.keys_found, 1);
    assert_eq!(
        read_json(&dir, "locales/en/translation.json"),
        json!({"good": ""})
    );
}

#[test]
fn test_ignored_namespaces_left_alone() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('kept'); t('vendor:ignored');");
    write(&dir, "locales/en/vendor.json", r#"{"stale": "untouched"}"#);

    let config = Config {
        ignored_namespaces: vec!["vendor".to_string()],
        ..config_with_locales(&["en"])
    };
    let s = session(&dir, config);
    let result = s.sync(&SyncOptions::default()).unwrap();

    assert_eq!(result.keys_found, 1);
    assert_eq!(
        read_json(&dir, "locales/en/vendor.json"),
        json!({"stale": "untouched"})
    );
}

#[test]
fn test_sorted_output() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('zebra'); t('apple'); t('mango');");

    let config = Config {
        sort: true,
        ..config_with_locales(&["en"])
    };
    let s = session(&dir, config);
    s.sync(&SyncOptions::default()).unwrap();

    let content = fs::read_to_string(dir.path().join("locales/en/translation.json")).unwrap();
    let apple = content.find("apple").unwrap();
    let mango = content.find("mango").unwrap();
    let zebra = content.find("zebra").unwrap();
    assert!(apple < mango && mango < zebra);
}

#[test]
fn test_sort_rewrites_unsorted_existing_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('zebra', 'Z'); t('apple', 'A');");
    write(
        &dir,
        "locales/en/translation.json",
        r#"{"zebra": "Z", "apple": "A"}"#,
    );

    let config = Config {
        sort: true,
        ..config_with_locales(&["en"])
    };
    let s = session(&dir, config);
    let result = s.sync(&SyncOptions::default()).unwrap();

    assert!(result.changed, "sort-only difference must count as a change");
    let content = fs::read_to_string(dir.path().join("locales/en/translation.json")).unwrap();
    assert!(content.find("apple").unwrap() < content.find("zebra").unwrap());
}

#[test]
fn test_sync_secondary_resets_translations() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('greeting', 'Hello');");
    write(
        &dir,
        "locales/de/translation.json",
        r#"{"greeting": "Hallo"}"#,
    );

    let s = session(&dir, config_with_locales(&["en", "de"]));
    s.sync(&SyncOptions::default()).unwrap();
    assert_eq!(
        read_json(&dir, "locales/de/translation.json"),
        json!({"greeting": "Hallo"})
    );

    let options = SyncOptions {
        sync_secondary: true,
        ..Default::default()
    };
    let result = s.sync(&options).unwrap();
    assert!(result.changed);
    assert_eq!(
        read_json(&dir, "locales/de/translation.json"),
        json!({"greeting": ""})
    );
    // The primary locale keeps its defaults either way.
    assert_eq!(
        read_json(&dir, "locales/en/translation.json"),
        json!({"greeting": "Hello"})
    );
}

#[test]
fn test_programmatic_path_resolver() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/App.tsx", "t('key');");

    let s = session(&dir, config_with_locales(&["en"]));
    let options = SyncOptions {
        path_resolver: Some(std::sync::Arc::new(|language: &str, namespace: &str| {
            Path::new("i18n").join(format!("{}.{}.json", namespace, language))
        })),
        ..Default::default()
    };
    s.sync(&options).unwrap();

    assert_eq!(
        read_json(&dir, "i18n/translation.en.json"),
        json!({"key": ""})
    );
}
