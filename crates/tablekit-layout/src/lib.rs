//! # TableKit Layout
//!
//! Geometry engine behind the table layout editor:
//! - `surface`: table types, surfaces and local/global coordinates
//! - `placement` and `snapping`: drag gestures with clamping and edge snapping
//! - `attachment`: one-level accessory stacking
//! - `slots`: image-board slot mapping
//! - `renderer` and `svg_renderer`: read-only scenes and SVG export
//! - `editor`: the working copy that ties the above together
//!
//! All positions are logical board units; zoom is display-only.

pub mod attachment;
pub mod config;
pub mod editor;
pub mod issues;
pub mod model;
pub mod placement;
pub mod renderer;
pub mod sizing;
pub mod slots;
pub mod snapping;
pub mod surface;
pub mod svg_renderer;
pub mod viewport;

pub use attachment::{remove_with_accessories, AttachmentResolver, Side};
pub use config::GeometryConfig;
pub use editor::{Spawn, TableEditor};
pub use issues::{
    open_missing_device_issues, parse_missing_title, Issue, MissingDeviceMatcher, MissingTitle,
};
pub use model::{Device, Slot, Table, TableType, TableUpdate, ACCESSORY_KEYWORDS};
pub use placement::{DropOutcome, Placement, PlacementEngine};
pub use renderer::{DeviceBox, ReadOnlyRenderer, RenderScene, RenderStyle, SlotMarker, SurfaceBox};
pub use sizing::{device_footprint, label_height};
pub use slots::{render_position, Connector, SlotMapper};
pub use snapping::{snap_axis, Axis, GuideLine};
pub use surface::{ImageBoard, Surface, SurfaceLocation, TableGeometry};
pub use svg_renderer::render_svg;
pub use viewport::{Viewport, ZoomControl, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
