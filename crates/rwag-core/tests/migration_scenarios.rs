//! Integration tests for the migration walk through the public API.
//!
//! These exercise the combinations a real settings upgrade produces: renamed
//! keys that then fail typed deserialization, deleted keys, and the legacy
//! numeric enum format, always checking the final document against the
//! typed [`SettingsRecord`].

use rwag_core::{
    legacy_settings_plan, migrate_value, AppTheme, FieldMapping, MigrationPlan, SettingsRecord,
    TypeMapping, DELETE_SENTINEL,
};
use serde_json::{json, Value};

/// The example upgrade: `OldName` became `AppColorTheme`.
#[test]
fn test_renamed_theme_key_becomes_readable() {
    let mut doc = json!({ "OldName": "Dark" });
    assert!(serde_json::from_value::<SettingsRecord>(doc.clone()).is_err());

    let plan = MigrationPlan::new().with_names(FieldMapping::new().rename("OldName", "AppColorTheme"));
    let outcome = migrate_value(&mut doc, &plan);

    assert!(outcome.modified);
    assert_eq!(doc, json!({ "AppColorTheme": "Dark" }));
    let settings: SettingsRecord = serde_json::from_value(doc).expect("typed read after migration");
    assert_eq!(settings.app_color_theme, AppTheme::Dark);
}

/// Running the same plan twice: the second pass reports no change.
#[test]
fn test_second_pass_is_a_noop() {
    let plan = MigrationPlan::new()
        .with_names(FieldMapping::new().rename("OldName", "AppColorTheme").delete("Obsolete"));
    let mut doc = json!({ "OldName": "Light", "Obsolete": 1 });

    let first = migrate_value(&mut doc, &plan);
    let snapshot = doc.clone();
    let second = migrate_value(&mut doc, &plan);

    assert!(first.modified);
    assert!(!second.modified);
    assert_eq!(doc, snapshot);
}

/// A field mapped to the delete sentinel is gone and the document still
/// serializes as valid JSON.
#[test]
fn test_delete_sentinel_from_string_pairs() {
    let names: FieldMapping = [("WindowChrome", DELETE_SENTINEL)].into_iter().collect();
    let plan = MigrationPlan::new().with_names(names);
    let mut doc = json!({
        "AppColorTheme": "System",
        "WindowChrome": { "Mica": true }
    });

    let outcome = migrate_value(&mut doc, &plan);

    assert!(outcome.modified);
    assert!(doc.get("WindowChrome").is_none());
    let text = serde_json::to_string_pretty(&doc).expect("serialize");
    let reparsed: Value = serde_json::from_str(&text).expect("still valid JSON");
    assert_eq!(reparsed, json!({ "AppColorTheme": "System" }));
}

/// A file written by the previous release with numeric enums and an extra
/// key that has since been dropped.
#[test]
fn test_legacy_file_with_custom_deletion() {
    let mut plan = legacy_settings_plan();
    plan.names = Some(FieldMapping::new().delete("PropertyChanged"));
    let mut doc = json!({
        "AppColorTheme": 1,
        "BackgroundType": 0,
        "BackgroundImagePath": "",
        "BackgroundImageStretch": 3,
        "PropertyChanged": null
    });

    let outcome = migrate_value(&mut doc, &plan);

    assert!(outcome.modified);
    assert!(!outcome.failed);
    let settings: SettingsRecord = serde_json::from_value(doc).expect("typed read");
    assert_eq!(settings.app_color_theme, AppTheme::Light);
}

/// Conversions and renames inside arrays of records.
#[test]
fn test_array_of_records_is_migrated_element_wise() {
    let plan = MigrationPlan::new()
        .with_names(FieldMapping::new().rename("title", "Title"))
        .with_types(TypeMapping::new().convert("Title", |v| {
            Ok(match v {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other.clone(),
            })
        }));
    let mut doc = json!([{ "title": " a " }, { "Title": "b" }, 3]);

    let outcome = migrate_value(&mut doc, &plan);

    assert!(outcome.modified);
    assert_eq!(doc, json!([{ "Title": "a" }, { "Title": "b" }, 3]));
}
