//! Read-only scene construction.
//!
//! A `RenderScene` is a flat, logical-unit description of one table: the
//! surfaces, the device boxes with their fill and status flags, and slot
//! markers. It is what the SVG exporter and any other front end draw from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tablekit_core::{Point, Rect, Size};
use tracing::debug;

use crate::config::GeometryConfig;
use crate::issues::MissingDeviceMatcher;
use crate::model::{Device, Table, TableType};
use crate::sizing::{accessory_slot_height, device_footprint};
use crate::slots::SlotMapper;
use crate::snapping::GuideLine;
use crate::surface::{ImageBoard, TableGeometry};
use crate::viewport::ZoomControl;

/// Colours used by scenes and the SVG exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub background: String,
    pub surface_fill: String,
    pub surface_stroke: String,
    pub default_fill: String,
    pub accessory_fill: String,
    pub missing_stroke: String,
    pub connector_stroke: String,
    pub text_color: String,
    /// Lowercase category keyword to fill colour; first match in key order.
    pub category_fills: BTreeMap<String, String>,
}

impl Default for RenderStyle {
    fn default() -> Self {
        let category_fills = [
            ("airpods", "#e3e3e3"),
            ("ipad", "#cfe8ff"),
            ("iphone", "#d9f2d9"),
            ("mac", "#ffe3c2"),
            ("watch", "#f6d5f0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            background: "#ffffff".to_string(),
            surface_fill: "#f4efe6".to_string(),
            surface_stroke: "#9c8f7a".to_string(),
            default_fill: "#eeeeee".to_string(),
            accessory_fill: "#fff7c2".to_string(),
            missing_stroke: "#d62d20".to_string(),
            connector_stroke: "#2d7dd6".to_string(),
            text_color: "#1d1d1f".to_string(),
            category_fills,
        }
    }
}

impl RenderStyle {
    /// Fill colour for a device by category.
    pub fn fill_for(&self, device: &Device) -> &str {
        if device.is_accessory() {
            return &self.accessory_fill;
        }
        let category = device.category.to_lowercase();
        self.category_fills
            .iter()
            .find(|(keyword, _)| category.contains(keyword.as_str()))
            .map(|(_, fill)| fill.as_str())
            .unwrap_or(&self.default_fill)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceBox {
    pub index: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceBox {
    pub id: String,
    pub label: String,
    pub quantity: u32,
    pub rect: Rect,
    pub surface: usize,
    pub fill: String,
    pub missing: bool,
    pub accessory: bool,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotMarker {
    pub id: String,
    pub position: Point,
    pub device_id: Option<String>,
    /// Present once the image has been measured.
    pub connector: Option<GuideLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayer {
    pub url: String,
    pub rect: Rect,
}

/// Everything needed to draw one table, in logical units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderScene {
    pub table_id: String,
    pub table_name: String,
    pub table_type: String,
    pub unsupported: bool,
    pub placeholder: Option<String>,
    pub board: Size,
    pub zoom: f64,
    pub surfaces: Vec<SurfaceBox>,
    pub image: Option<ImageLayer>,
    pub devices: Vec<DeviceBox>,
    pub slots: Vec<SlotMarker>,
}

impl RenderScene {
    /// Rendered pixel size of the board.
    pub fn pixel_size(&self) -> Size {
        self.board.scaled(self.zoom)
    }

    pub fn missing_count(&self) -> usize {
        self.devices.iter().filter(|d| d.missing).count()
    }

    pub fn device(&self, id: &str) -> Option<&DeviceBox> {
        self.devices.iter().find(|d| d.id == id)
    }
}

/// Builds scenes for display without ever mutating the table.
#[derive(Debug, Clone)]
pub struct ReadOnlyRenderer {
    config: GeometryConfig,
    style: RenderStyle,
    zoom: ZoomControl,
}

impl ReadOnlyRenderer {
    pub fn new(config: GeometryConfig, style: RenderStyle) -> Self {
        Self {
            config,
            style,
            zoom: ZoomControl::default(),
        }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn zoom(&self) -> &ZoomControl {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomControl {
        &mut self.zoom
    }

    pub fn render(&self, table: &Table, issues: &MissingDeviceMatcher) -> RenderScene {
        let geometry = match TableGeometry::for_table(table, &self.config) {
            Ok(geometry) => geometry,
            Err(err) => {
                debug!("Rendering placeholder for {}: {}", table.id, err);
                return self.placeholder(table);
            }
        };

        let image_board = match table.table_type {
            TableType::ImageBoard => ImageBoard::for_table(table, &self.config).ok(),
            _ => None,
        };
        let image = table
            .image_url
            .as_ref()
            .zip(image_board.as_ref())
            .map(|(url, board)| ImageLayer {
                url: url.clone(),
                rect: board.image_rect(),
            });

        let mut missing = issues.missing_device_ids(table);
        let devices = table
            .devices
            .iter()
            .map(|device| {
                let accessory = device.is_accessory();
                let size = if accessory && device.is_attached() {
                    Size::new(
                        self.config.device_width,
                        accessory_slot_height(device, &self.config) - self.config.accessory_gutter,
                    )
                } else {
                    device_footprint(device, &self.config)
                };
                DeviceBox {
                    id: device.id.clone(),
                    label: device.label(),
                    quantity: device.quantity,
                    rect: Rect::from_origin_size(device.position, size),
                    surface: geometry.surface_index_of(&device.position),
                    fill: self.style.fill_for(device).to_string(),
                    missing: missing.remove(&device.id),
                    accessory,
                    parent_id: device.attached_to.clone(),
                }
            })
            .collect();

        let mapper = SlotMapper::new(&self.config);
        let slots = table
            .slots
            .iter()
            .map(|slot| SlotMarker {
                id: slot.id.clone(),
                position: slot.position,
                device_id: slot.device_id.clone(),
                connector: image_board
                    .as_ref()
                    .map(|board| mapper.connector(board, slot).line),
            })
            .collect();

        RenderScene {
            table_id: table.id.clone(),
            table_name: table.name.clone(),
            table_type: table.table_type.as_str().to_string(),
            unsupported: false,
            placeholder: None,
            board: geometry.board_size(),
            zoom: self.zoom.level(),
            surfaces: geometry
                .surfaces()
                .iter()
                .map(|s| SurfaceBox {
                    index: s.index,
                    rect: s.rect(),
                })
                .collect(),
            image,
            devices,
            slots,
        }
    }

    fn placeholder(&self, table: &Table) -> RenderScene {
        RenderScene {
            table_id: table.id.clone(),
            table_name: table.name.clone(),
            table_type: table.table_type.as_str().to_string(),
            unsupported: true,
            placeholder: Some(format!("Unsupported table type: {}", table.table_type.as_str())),
            board: Size::new(self.config.board_width, self.config.surface_height),
            zoom: self.zoom.level(),
            surfaces: Vec::new(),
            image: None,
            devices: Vec::new(),
            slots: Vec::new(),
        }
    }
}
