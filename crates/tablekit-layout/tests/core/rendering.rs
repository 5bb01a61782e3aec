use tablekit_layout::{
    render_svg, GeometryConfig, Issue, MissingDeviceMatcher, ReadOnlyRenderer, RenderStyle, Table,
    TableGeometry,
};

const TABLE: &str = r##"{
    "id": "launch-1",
    "name": "Launch table",
    "table_type": "double_free_standing",
    "devices": [
        {"id": "p", "name": "iPhone 16 Pro", "type": "iPhone", "color": "Desert Titanium",
         "position": {"x": 100, "y": 60}},
        {"id": "m", "name": "MacBook Air", "type": "Mac", "position": {"x": 400, "y": 700}}
    ]
}"##;

#[test]
fn test_stored_table_renders_with_missing_marker() {
    let table: Table = serde_json::from_str(TABLE).unwrap();
    let matcher = MissingDeviceMatcher::new(vec![Issue::missing_device(
        "iPhone 16 Pro (Desert Titanium) - taken",
    )]);
    let style = RenderStyle {
        missing_stroke: "#ff0000".to_string(),
        ..RenderStyle::default()
    };

    let mut renderer = ReadOnlyRenderer::new(GeometryConfig::default(), style);
    renderer.zoom_mut().set(0.5);
    let scene = renderer.render(&table, &matcher);
    assert_eq!(scene.missing_count(), 1);

    let svg = render_svg(&scene, renderer.style());
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("#ff0000"));
    assert!(svg.contains("MacBook Air"));
}

#[test]
fn test_locate_devices_on_both_surfaces() {
    let table: Table = serde_json::from_str(TABLE).unwrap();
    let geometry = TableGeometry::for_table(&table, &GeometryConfig::default()).unwrap();

    let top = geometry.locate(&table.device("p").unwrap().position);
    let bottom = geometry.locate(&table.device("m").unwrap().position);
    assert_eq!(top.surface, 0);
    assert_eq!(bottom.surface, 1);
    assert_eq!(bottom.local.y, 700.0 - 605.0);
}
