use std::sync::Arc;

use tablekit_core::{AppEvent, EventBus, EventBusConfig, Point, StorageEvent};
use tablekit_layout::{Device, GeometryConfig, Spawn, Table, TableEditor, TableType};
use tablekit_store::{JsonDirectoryStore, TableStore, TableSync};
use tempfile::TempDir;

fn recording_bus() -> Arc<EventBus> {
    Arc::new(EventBus::with_config(EventBusConfig {
        enable_history: true,
        ..EventBusConfig::default()
    }))
}

#[tokio::test]
async fn test_edit_save_reload_through_directory() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(JsonDirectoryStore::new(dir.path()));
    backend
        .save_table(&Table::new("front", "Front", TableType::Single))
        .await
        .unwrap();

    let bus = recording_bus();
    let sync = TableSync::with_backend(backend.clone(), bus.clone());
    let table = sync.load("front").await.unwrap();
    let mut editor = TableEditor::with_bus(table, GeometryConfig::default(), bus.clone());

    editor
        .add_device(
            Device::new("ipad", "iPad Air", "iPad"),
            Spawn::At(Point::new(300.0, 50.0)),
        )
        .unwrap();
    editor
        .add_device(Device::new("pencil", "Apple Pencil", "Accessories"), Spawn::NextLane)
        .unwrap();
    editor.attach("pencil", "ipad").unwrap();

    sync.save_editor(&mut editor).unwrap();
    sync.flush().await;

    let reloaded = backend.load_table("front").await.unwrap();
    assert_eq!(reloaded.devices.len(), 2);
    let pencil = reloaded.device("pencil").unwrap();
    assert_eq!(pencil.attached_to.as_deref(), Some("ipad"));
    assert_eq!(pencil.position, editor.table().device("pencil").unwrap().position);

    assert!(bus.history().iter().any(|e| matches!(
        e,
        AppEvent::Storage(StorageEvent::TableSaved { table_id }) if table_id == "front"
    )));
}

#[tokio::test]
async fn test_saving_a_missing_table_is_reported() {
    let dir = TempDir::new().unwrap();
    let bus = recording_bus();
    let sync = TableSync::with_backend(Arc::new(JsonDirectoryStore::new(dir.path())), bus.clone());

    let update = Table::new("ghost", "Ghost", TableType::Single).to_update();
    sync.save("ghost", update).unwrap();
    sync.flush().await;

    assert!(bus.history().iter().any(|e| matches!(
        e,
        AppEvent::Storage(StorageEvent::SaveFailed { table_id, .. }) if table_id == "ghost"
    )));
}
