use tablekit_layout::{Device, DropOutcome, GeometryConfig, PlacementEngine, Table, TableType};
use tablekit_core::Point;

fn table(table_type: TableType, devices: Vec<Device>) -> Table {
    let mut table = Table::new("t1", "Launch", table_type);
    table.devices = devices;
    table
}

#[test]
fn test_drop_far_below_clamps_to_surface_bottom() {
    let mut table = table(
        TableType::Single,
        vec![Device::new("d", "iPhone 16", "iPhone").with_position(400.0, 100.0)],
    );
    let mut engine = PlacementEngine::new(GeometryConfig::default());
    engine.begin_drag(&table, "d", Point::new(410.0, 110.0)).unwrap();
    engine.drag_to(&mut table, Point::new(410.0, 5000.0)).unwrap();
    let outcome = engine.end_drag(&mut table, Point::new(410.0, 5000.0)).unwrap();
    assert_eq!(
        outcome,
        DropOutcome::Placed {
            position: Point::new(400.0, 465.0)
        }
    );
}

#[test]
fn test_long_name_shrinks_vertical_range() {
    // 31-character name grows the box by two label lines
    let name = "iPad Pro 13-inch (M4) Wi-Fi Cel";
    let mut table = table(
        TableType::Single,
        vec![Device::new("d", name, "iPad").with_position(0.0, 0.0)],
    );
    let mut engine = PlacementEngine::new(GeometryConfig::default());
    engine.begin_drag(&table, "d", Point::zero()).unwrap();
    let pos = engine.drag_to(&mut table, Point::new(0.0, 900.0)).unwrap();
    assert_eq!(pos.y, 505.0 - 70.0);
}

#[test]
fn test_x_96_snaps_to_neighbour_at_100() {
    let mut table = table(
        TableType::Single,
        vec![
            Device::new("n", "Mac mini", "Mac").with_position(100.0, 300.0),
            Device::new("d", "iPhone", "iPhone").with_position(700.0, 50.0),
        ],
    );
    let mut engine = PlacementEngine::new(GeometryConfig::default());
    engine.begin_drag(&table, "d", Point::new(700.0, 50.0)).unwrap();
    let pos = engine.drag_to(&mut table, Point::new(96.0, 50.0)).unwrap();
    assert_eq!(pos, Point::new(100.0, 50.0));
}

#[test]
fn test_far_off_surface_candidate_ignores_near_edge_neighbour() {
    let mut table = table(
        TableType::Single,
        vec![
            Device::new("n", "Mac mini", "Mac").with_position(5.0, 400.0),
            Device::new("d", "iPhone", "iPhone").with_position(700.0, 50.0),
        ],
    );
    let mut engine = PlacementEngine::new(GeometryConfig::default());
    engine.begin_drag(&table, "d", Point::new(700.0, 50.0)).unwrap();

    // 35 from the neighbour's left edge, beyond the 15 threshold
    let pos = engine.drag_to(&mut table, Point::new(-30.0, 50.0)).unwrap();
    assert_eq!(pos, Point::new(0.0, 50.0));
    assert!(engine.guides().is_empty());

    // within threshold even though the candidate is off the surface
    let pos = engine.drag_to(&mut table, Point::new(-8.0, 50.0)).unwrap();
    assert_eq!(pos, Point::new(5.0, 50.0));
    assert_eq!(engine.guides().len(), 1);
}

#[test]
fn test_back_to_back_right_surface_local_coordinates() {
    let mut table = table(
        TableType::BackToBackDouble,
        vec![Device::new("d", "Watch", "Watch").with_position(1200.0, 100.0)],
    );
    let mut engine = PlacementEngine::new(GeometryConfig::default());
    engine.begin_drag(&table, "d", Point::new(1200.0, 100.0)).unwrap();
    let pos = engine.drag_to(&mut table, Point::new(2500.0, 100.0)).unwrap();
    // right surface spans 1000..2000
    assert_eq!(pos.x, 2000.0 - 140.0);
}

#[test]
fn test_snap_toggle() {
    let mut table = table(
        TableType::Single,
        vec![
            Device::new("n", "Mac mini", "Mac").with_position(100.0, 300.0),
            Device::new("d", "iPhone", "iPhone").with_position(700.0, 50.0),
        ],
    );
    let mut engine = PlacementEngine::new(GeometryConfig::default());
    engine.set_snap_enabled(false);
    engine.begin_drag(&table, "d", Point::new(700.0, 50.0)).unwrap();
    let pos = engine.drag_to(&mut table, Point::new(96.0, 50.0)).unwrap();
    assert_eq!(pos, Point::new(96.0, 50.0));
    assert!(engine.guides().is_empty());
}
