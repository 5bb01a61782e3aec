use tablekit_settings::{Config, SettingsError};
use tempfile::TempDir;

#[test]
fn test_json_and_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::new();
    config.geometry.board_width = 2200.0;
    config.editor.snap_enabled = false;
    config.renderer.default_zoom = 1.4;
    config.storage.data_dir = dir.path().join("tables");
    config.storage.public_base_url = Some("https://cdn.example".to_string());

    for name in ["config.json", "nested/config.toml"] {
        let path = dir.path().join(name);
        config.save_to_file(&path).unwrap();
        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}

#[test]
fn test_invalid_config_is_not_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = Config::new();
    config.renderer.default_zoom = 0.1;
    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_load_rejects_out_of_range_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"geometry": {"device_width": -1.0}}"#).unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Geometry(_))
    ));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());

    assert!(Config::load_from_file(&dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    assert!(matches!(
        Config::new().save_to_file(&path),
        Err(SettingsError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_loaded_config_drives_renderer_and_editor() {
    use std::sync::Arc;
    use tablekit_core::EventBus;
    use tablekit_layout::{render_svg, MissingDeviceMatcher, Table, TableType};

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[editor]
snap_enabled = false

[renderer]
default_zoom = 0.5

[renderer.style]
surface_fill = "#abcdef"
"##,
    )
    .unwrap();
    let config = Config::load_from_file(&path).unwrap();

    let table = Table::new("t1", "Launch", TableType::Single);
    let renderer = config.renderer();
    assert_eq!(renderer.zoom().level(), 0.5);
    let svg = render_svg(&renderer.render(&table, &MissingDeviceMatcher::default()), renderer.style());
    assert!(svg.contains("#abcdef"));

    let editor = config.open_editor(table, Arc::new(EventBus::new()));
    assert!(!editor.snap_enabled());
}
