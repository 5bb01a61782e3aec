use std::sync::Arc;

use tablekit_core::EventBus;
use tablekit_layout::{
    Device, GeometryConfig, Issue, MissingDeviceMatcher, ReadOnlyRenderer, RenderStyle, Table,
    TableType,
};
use tablekit_store::{MemoryBackend, TableSync};

fn store() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::default());

    let mut front = Table::new("front", "Front", TableType::Single);
    front.devices = vec![
        Device::new("w1", "Apple Watch", "Watch").with_color("Midnight"),
        Device::new("w2", "Apple Watch", "Watch").with_color("Starlight"),
    ];
    backend.insert_table(front);
    backend.insert_table(Table::new("back", "Back", TableType::FreeStandingDouble));
    backend.link("store-9", "front");
    backend.link("store-9", "back");

    backend.add_issue("store-9", Issue::missing_device("Apple Watch (Midnight) - not on table"));
    backend.add_issue(
        "store-9",
        Issue::missing_device("Apple Watch (Starlight) - not on table").with_status("Resolved"),
    );
    backend
}

#[tokio::test]
async fn test_overview_marks_only_open_missing_devices() {
    let sync = TableSync::with_backend(store(), Arc::new(EventBus::new()));
    let overview = sync.store_overview("store-9").await.unwrap();

    let ids: Vec<&str> = overview.tables.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["front", "back"]);
    assert_eq!(overview.missing.len(), 1);

    let renderer = ReadOnlyRenderer::new(GeometryConfig::default(), RenderStyle::default());
    let scene = renderer.render(&overview.tables[0], &overview.missing);
    assert_eq!(scene.device("w1").map(|d| d.missing), Some(true));
    assert_eq!(scene.device("w2").map(|d| d.missing), Some(false));

    let empty = renderer.render(&overview.tables[1], &MissingDeviceMatcher::default());
    assert_eq!(empty.missing_count(), 0);
}

#[tokio::test]
async fn test_overview_of_unknown_store_is_empty() {
    let sync = TableSync::with_backend(store(), Arc::new(EventBus::new()));
    let overview = sync.store_overview("nowhere").await.unwrap();
    assert!(overview.tables.is_empty());
}
