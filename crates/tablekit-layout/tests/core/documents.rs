use tablekit_layout::{Table, TableType, TableUpdate};
use tablekit_core::Point;

const STORED: &str = r##"{
    "id": "tbl-7",
    "name": "Window display",
    "table_type": "double_back_to_back",
    "devices": [
        {"id": "a", "name": "iPhone 16", "type": "iPhone", "color": "Ultramarine",
         "quantity": 2, "position": {"x": 120, "y": 80}},
        {"id": "b", "name": "Clear Case", "type": "Case", "quantity": 0,
         "position": {"x": "oops"}, "attachedToDevice": "a"},
        {"id": "c", "name": "Apple Watch", "type": "Watch"}
    ],
    "slots": [{"id": "s1", "position": {"x": 10, "y": 20}, "deviceId": "a"}]
}"##;

#[test]
fn test_stored_document_is_read_leniently() {
    let table: Table = serde_json::from_str(STORED).unwrap();
    assert_eq!(table.table_type, TableType::BackToBackDouble);
    assert_eq!(table.devices.len(), 3);

    let case = table.device("b").unwrap();
    assert_eq!(case.quantity, 1);
    assert_eq!(case.position, Point::zero());
    assert_eq!(case.attached_to.as_deref(), Some("a"));
    assert_eq!(table.device("c").unwrap().position, Point::zero());
    assert_eq!(table.slots[0].device_id.as_deref(), Some("a"));
}

#[test]
fn test_unknown_table_type_survives_round_trip() {
    let json = r#"{"id": "t", "table_type": "horseshoe"}"#;
    let table: Table = serde_json::from_str(json).unwrap();
    assert_eq!(table.table_type, TableType::Unsupported("horseshoe".to_string()));
    let back = serde_json::to_value(&table).unwrap();
    assert_eq!(back["table_type"], "horseshoe");
}

#[test]
fn test_update_document_uses_stored_field_names() {
    let table: Table = serde_json::from_str(STORED).unwrap();
    let update: TableUpdate = table.to_update();
    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(value["devices"][1]["attachedToDevice"], "a");
    assert_eq!(value["slots"][0]["deviceId"], "a");
    assert!(value["devices"][0]["position"]["x"].is_number());
}
