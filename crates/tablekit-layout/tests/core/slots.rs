use tablekit_layout::{Device, GeometryConfig, SlotMapper, Table, TableType};
use tablekit_core::{Point, Rect, Size};

fn wall() -> Table {
    let mut table = Table::new("wall", "Wall", TableType::ImageBoard);
    table.image_url = Some("https://cdn.example/wall.jpg".to_string());
    table.image_natural_size = Some(Size::new(1200.0, 800.0));
    table.image_scale = 0.5;
    table.devices = vec![Device::new("d", "iPhone 16", "iPhone")];
    table
}

#[test]
fn test_slot_is_independent_of_rendered_zoom() {
    let config = GeometryConfig::default();
    let mapper = SlotMapper::new(&config);
    let table = wall();

    // the same image point clicked at two zoom levels
    let small = Rect::new(10.0, 10.0, 300.0, 200.0);
    let large = Rect::new(40.0, 40.0, 600.0, 400.0);
    let a = mapper
        .click_to_logical(&table, &small, Point::new(10.0 + 75.0, 10.0 + 150.0))
        .unwrap();
    let b = mapper
        .click_to_logical(&table, &large, Point::new(40.0 + 150.0, 40.0 + 300.0))
        .unwrap();
    assert_eq!(a, b);
    // board 800 x 600 with padding, centre (400, 300)
    assert_eq!(a, Point::new(400.0 - 0.25 * 800.0, 300.0 + 0.25 * 600.0));
}

#[test]
fn test_replacing_image_resets_only_slots() {
    let config = GeometryConfig::default();
    let mapper = SlotMapper::new(&config);
    let mut table = wall();
    let rendered = Rect::new(0.0, 0.0, 600.0, 400.0);
    let slot = mapper
        .create_slot(&mut table, &rendered, Point::new(300.0, 200.0))
        .unwrap();
    mapper.bind_device(&mut table, &slot.id, "d").unwrap();
    let device_before = table.devices.clone();

    mapper
        .replace_image(&mut table, "https://cdn.example/new.jpg", Size::new(500.0, 500.0))
        .unwrap();
    assert!(table.slots.is_empty());
    assert_eq!(table.devices, device_before);
    assert_eq!(table.image_url.as_deref(), Some("https://cdn.example/new.jpg"));
}
