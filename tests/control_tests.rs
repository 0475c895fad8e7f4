//! Control surface tests: registry listing, level updates, reset and
//! persistence through a file-backed store

use parking_lot::Mutex;
use rust_category_logging::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn captured() -> (ControlOutput, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    (
        ControlOutput::new(move |text| sink.lock().push(text.to_string())),
        lines,
    )
}

fn registry_with_tree() -> (ProviderRegistry, Arc<CategoryProvider>) {
    let registry = ProviderRegistry::new();
    let provider = registry
        .create_category_provider("app", ProviderConfig::default())
        .unwrap();
    let root = provider.get_category("service", None).unwrap();
    provider.get_category("db", Some(&root)).unwrap();
    provider.get_category("http", Some(&root)).unwrap();
    (registry, provider)
}

#[test]
fn test_update_by_index_cascades_to_children() {
    let (registry, provider) = registry_with_tree();
    let control = registry.control().provider("app").unwrap();

    control.update("debug", Some(ControlId::Index(0))).unwrap();
    for category in provider.all_categories() {
        assert_eq!(category.level(), LogLevel::Debug);
    }

    control.update("info", Some("service#db".into())).unwrap();
    let db = provider.get_category_by_path("service#db").unwrap();
    let http = provider.get_category_by_path("service#http").unwrap();
    assert_eq!(db.level(), LogLevel::Info);
    assert_eq!(http.level(), LogLevel::Debug);
}

#[test]
fn test_update_rejects_bad_input() {
    let (registry, _provider) = registry_with_tree();
    let control = registry.control().provider("app").unwrap();

    assert!(matches!(
        control.update("verbose", None),
        Err(LoggerError::InvalidLevel { .. })
    ));
    assert!(matches!(
        control.update("info", Some(ControlId::Index(3))),
        Err(LoggerError::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert!(matches!(
        control.update("info", Some("service#cache".into())),
        Err(LoggerError::UnknownIdentifier { .. })
    ));
}

#[test]
fn test_reset_uses_snapshot_from_construction() {
    let (registry, provider) = registry_with_tree();
    let service = provider.get_category_by_path("service").unwrap();

    provider
        .update_runtime_settings_category(&service, &LogLevel::Warn.into(), false)
        .unwrap();

    let control = registry.control().provider("app").unwrap();
    control.update("trace", None).unwrap();
    control.reset();
    control.update("fatal", None).unwrap();
    control.reset();

    for category in provider.all_categories() {
        assert_eq!(category.level(), LogLevel::Warn);
    }
}

#[test]
fn test_save_and_restore_through_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("levels.json");

    {
        let (registry, _provider) = registry_with_tree();
        let control = registry
            .control()
            .with_store(Arc::new(FileStore::new(&path)))
            .provider("app")
            .unwrap();
        control.update("info", Some(ControlId::Index(1))).unwrap();
        assert!(control.save());
    }

    let (registry, provider) = registry_with_tree();
    let (output, lines) = captured();
    let control = registry
        .control()
        .with_store(Arc::new(FileStore::new(&path)))
        .with_output(output)
        .provider("app")
        .unwrap();

    assert!(control.restore(true));
    let levels: Vec<(String, LogLevel)> = provider
        .all_categories()
        .iter()
        .map(|c| (c.path().to_string(), c.level()))
        .collect();
    assert_eq!(
        levels,
        vec![
            ("service".to_string(), LogLevel::Error),
            ("service#db".to_string(), LogLevel::Info),
            ("service#http".to_string(), LogLevel::Error),
        ]
    );
    assert!(lines.lock()[0].contains("Restored"));
}

#[test]
fn test_restore_rejects_other_provider() {
    let registry = ProviderRegistry::new();
    registry
        .create_category_provider("one", ProviderConfig::default())
        .unwrap();
    let two = registry
        .create_category_provider("two", ProviderConfig::default())
        .unwrap();
    let root = two.get_category("root", None).unwrap();

    let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
    let first = registry
        .control()
        .with_store(Arc::clone(&store))
        .provider("one")
        .unwrap();
    let payload = r#"{"providerName":"one","entries":[{"identifier":"root","level":"trace"}]}"#;
    store.set_item(&first.storage_key(), payload).unwrap();
    store
        .set_item("rust_category_logging:two", &payload.replace("\"one\"", "\"other\""))
        .unwrap();

    let (output, lines) = captured();
    let second = registry
        .control()
        .with_store(store)
        .with_output(output)
        .provider("two")
        .unwrap();
    assert!(!second.restore(true));
    assert_eq!(root.level(), LogLevel::Error);
    assert!(lines.lock()[0].contains("other"));
}

#[test]
fn test_group_provider_control() {
    let registry = ProviderRegistry::new();
    let groups = registry
        .create_group_provider(
            "groups",
            GroupProviderConfig::new(vec![
                GroupRule::new("^model").unwrap().identifier("models"),
                GroupRule::new("^http").unwrap(),
            ]),
        )
        .unwrap();
    let model = groups.get_logger("model.User").unwrap();

    let (output, lines) = captured();
    let control = registry
        .control()
        .with_output(output)
        .provider(ControlId::Index(0))
        .unwrap();
    control.update("debug", Some("models".into())).unwrap();
    assert_eq!(model.level(), LogLevel::Debug);

    control.show_settings();
    let listing = lines.lock().last().cloned().unwrap();
    assert!(listing.contains("models"));
    assert!(listing.contains("^http"));
    assert!(listing.contains("default"));
}

#[test]
fn test_registry_listing() {
    let (registry, _provider) = registry_with_tree();
    registry
        .create_group_provider(
            "groups",
            GroupProviderConfig::new(vec![GroupRule::new(".*").unwrap()]),
        )
        .unwrap();

    let (output, lines) = captured();
    registry.control().with_output(output).show_providers();
    let text = lines.lock()[0].clone();
    assert!(text.contains("[ 0] app (category)"));
    assert!(text.contains("[ 1] groups (group)"));
}
