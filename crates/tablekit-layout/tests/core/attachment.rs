use tablekit_layout::{
    remove_with_accessories, AttachmentResolver, Device, GeometryConfig, PlacementEngine, Table,
    TableType,
};
use tablekit_core::Point;

#[test]
fn test_north_parent_two_accessories() {
    let config = GeometryConfig::default();
    let resolver = AttachmentResolver::new(&config);
    let mut table = Table::new("t1", "Front", TableType::Single);
    table.devices = vec![
        Device::new("ipad", "iPad Air", "iPad").with_position(200.0, 50.0),
        Device::new("pencil", "Apple Pencil Pro", "Accessories"),
        Device::new("kb", "Magic Keyboard", "Accessories"),
    ];

    let first = resolver.attach(&mut table, "pencil", "ipad").unwrap();
    let second = resolver.attach(&mut table, "kb", "ipad").unwrap();

    // "Apple Pencil Pro" is 16 characters, so its slot gains one label line
    assert_eq!(first, Point::new(205.0, 50.0 - 45.0 - (35.0 + 15.0 + 5.0)));
    assert_eq!(second, Point::new(205.0, first.y - (35.0 + 5.0)));
}

#[test]
fn test_free_standing_lower_surface_side() {
    let config = GeometryConfig::default();
    let resolver = AttachmentResolver::new(&config);
    let mut table = Table::new("t1", "Island", TableType::FreeStandingDouble);
    // lower surface starts at 605; local y 400 is in its south half
    table.devices = vec![
        Device::new("mac", "MacBook Air", "Mac").with_position(100.0, 1005.0),
        Device::new("case", "Leather Case", "Case"),
    ];
    let pos = resolver.attach(&mut table, "case", "mac").unwrap();
    assert_eq!(pos, Point::new(105.0, 1050.0));
}

#[test]
fn test_parent_drag_keeps_offsets() {
    let config = GeometryConfig::default();
    let mut table = Table::new("t1", "Front", TableType::Single);
    table.devices = vec![
        Device::new("iphone", "iPhone 16", "iPhone").with_position(600.0, 350.0),
        Device::new("c1", "Clear Case", "Case"),
        Device::new("c2", "Silicone Case", "Case"),
    ];
    let resolver = AttachmentResolver::new(&config);
    resolver.attach(&mut table, "c1", "iphone").unwrap();
    resolver.attach(&mut table, "c2", "iphone").unwrap();
    let offsets: Vec<Point> = ["c1", "c2"]
        .iter()
        .map(|id| table.device(id).unwrap().position - Point::new(600.0, 350.0))
        .collect();

    let mut engine = PlacementEngine::new(config.clone());
    engine.begin_drag(&table, "iphone", Point::new(600.0, 350.0)).unwrap();
    let parent = engine.drag_to(&mut table, Point::new(1400.0, 420.0)).unwrap();
    engine.end_drag(&mut table, Point::new(1400.0, 420.0)).unwrap();

    for (id, offset) in ["c1", "c2"].iter().zip(offsets) {
        assert_eq!(table.device(id).unwrap().position - parent, offset);
    }
}

#[test]
fn test_cascade_remove_leaves_no_dangling_links() {
    let config = GeometryConfig::default();
    let resolver = AttachmentResolver::new(&config);
    let mut table = Table::new("t1", "Front", TableType::Single);
    table.devices = vec![
        Device::new("a", "iPad", "iPad").with_position(100.0, 100.0),
        Device::new("b", "iPad mini", "iPad").with_position(600.0, 100.0),
        Device::new("p1", "Apple Pencil", "Accessories"),
        Device::new("p2", "Apple Pencil", "Accessories"),
    ];
    resolver.attach(&mut table, "p1", "a").unwrap();
    resolver.attach(&mut table, "p2", "b").unwrap();

    let removed = remove_with_accessories(&mut table, "a");
    assert_eq!(
        removed.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
        ["a", "p1"]
    );
    for device in &table.devices {
        if let Some(parent) = &device.attached_to {
            assert!(table.device(parent).is_some());
        }
    }
}
