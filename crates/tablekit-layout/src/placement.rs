//! Pointer-drag placement of devices.
//!
//! A drag is a `begin -> move* -> end` gesture over global board
//! coordinates. Every move clamps the device into the surface under the
//! candidate position and snaps it to neighbour edges. Accessories follow
//! their parent rigidly; they are never dragged themselves.

use tablekit_core::{Point, PlacementError, Rect};
use tracing::debug;

use crate::attachment::AttachmentResolver;
use crate::config::GeometryConfig;
use crate::model::Table;
use crate::sizing::device_footprint;
use crate::snapping::{snap_axis, Axis, GuideLine, SnapTargets};
use crate::surface::TableGeometry;

/// Clamped and snapped outcome for one candidate position.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Final global position.
    pub position: Point,
    pub surface: usize,
    pub guides: Vec<GuideLine>,
}

/// What happened when the pointer was released.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// The device stays at a free position.
    Placed { position: Point },
    /// The accessory was dropped on a device and now follows it.
    Attached { parent_id: String, position: Point },
}

#[derive(Debug, Clone)]
struct DragState {
    device_id: String,
    grab_offset: Point,
}

/// Drag gesture state machine.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    config: GeometryConfig,
    snap_enabled: bool,
    drag: Option<DragState>,
    guides: Vec<GuideLine>,
}

impl PlacementEngine {
    pub fn new(config: GeometryConfig) -> Self {
        Self {
            config,
            snap_enabled: true,
            drag: None,
            guides: Vec::new(),
        }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    /// Id of the device being dragged.
    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.device_id.as_str())
    }

    /// Guide lines of the active snap targets.
    pub fn guides(&self) -> &[GuideLine] {
        &self.guides
    }

    /// Starts dragging `device_id` from `pointer`.
    pub fn begin_drag(
        &mut self,
        table: &Table,
        device_id: &str,
        pointer: Point,
    ) -> Result<(), PlacementError> {
        let device = table
            .device(device_id)
            .ok_or_else(|| PlacementError::UnknownDevice {
                id: device_id.to_string(),
            })?;
        if let Some(parent) = &device.attached_to {
            return Err(PlacementError::AttachedDevice {
                id: device_id.to_string(),
                parent: parent.clone(),
            });
        }
        TableGeometry::for_table(table, &self.config)?;

        let grab_offset = pointer - device.position;
        debug!("Drag start {} grab offset {}", device_id, grab_offset);
        self.drag = Some(DragState {
            device_id: device_id.to_string(),
            grab_offset,
        });
        self.guides.clear();
        Ok(())
    }

    /// Moves the dragged device under `pointer` and drags its accessories along.
    pub fn drag_to(&mut self, table: &mut Table, pointer: Point) -> Result<Point, PlacementError> {
        let drag = self.drag.clone().ok_or(PlacementError::NoActiveDrag)?;
        let candidate = pointer - drag.grab_offset;
        let placement = self.constrain(table, &drag.device_id, candidate)?;

        let device = table
            .device_mut(&drag.device_id)
            .ok_or_else(|| PlacementError::UnknownDevice {
                id: drag.device_id.clone(),
            })?;
        device.position = placement.position;
        self.guides = placement.guides;

        AttachmentResolver::new(&self.config).restack(table, &drag.device_id)?;

        Ok(placement.position)
    }

    /// Releases the pointer.
    ///
    /// An accessory released over an independent non-accessory device is
    /// attached to it; everything else keeps its last dragged position.
    pub fn end_drag(
        &mut self,
        table: &mut Table,
        pointer: Point,
    ) -> Result<DropOutcome, PlacementError> {
        let drag = self.drag.take().ok_or(PlacementError::NoActiveDrag)?;
        self.guides.clear();

        let device = table
            .device(&drag.device_id)
            .ok_or_else(|| PlacementError::UnknownDevice {
                id: drag.device_id.clone(),
            })?;
        let position = device.position;

        if device.is_accessory() {
            if let Some(parent_id) = self.drop_target(table, &drag.device_id, pointer) {
                let resolver = AttachmentResolver::new(&self.config);
                resolver.attach(table, &drag.device_id, &parent_id)?;
                let position = table
                    .device(&drag.device_id)
                    .map(|d| d.position)
                    .unwrap_or(pointer);
                debug!("Drop attached {} to {}", drag.device_id, parent_id);
                return Ok(DropOutcome::Attached {
                    parent_id,
                    position,
                });
            }
        }

        debug!("Drag end {} at {}", drag.device_id, position);
        Ok(DropOutcome::Placed { position })
    }

    /// Abandons the gesture; the device keeps its last position.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
        self.guides.clear();
    }

    /// First independent non-accessory device whose footprint contains `pointer`.
    pub fn drop_target(&self, table: &Table, dragged_id: &str, pointer: Point) -> Option<String> {
        table
            .independent_devices()
            .filter(|d| d.id != dragged_id && !d.is_accessory())
            .find(|d| {
                Rect::from_origin_size(d.position, device_footprint(d, &self.config))
                    .contains(&pointer)
            })
            .map(|d| d.id.clone())
    }

    /// Clamps and snaps `candidate` (global top-left) for `device_id`.
    pub fn constrain(
        &self,
        table: &Table,
        device_id: &str,
        candidate: Point,
    ) -> Result<Placement, PlacementError> {
        let geometry = TableGeometry::for_table(table, &self.config)?;
        let device = table
            .device(device_id)
            .ok_or_else(|| PlacementError::UnknownDevice {
                id: device_id.to_string(),
            })?;
        let footprint = device_footprint(device, &self.config);

        let surface = *geometry.surface_of(&candidate);
        let local = surface.to_local(Point::new(
            finite_or_zero(candidate.x),
            finite_or_zero(candidate.y),
        ));
        let max_x = (surface.size.width - footprint.width).max(0.0);
        let max_y = (surface.size.height - footprint.height).max(0.0);
        let clamped = Point::new(local.x.clamp(0.0, max_x), local.y.clamp(0.0, max_y));

        if !self.snap_enabled {
            return Ok(Placement {
                position: surface.to_global(clamped),
                surface: surface.index,
                guides: Vec::new(),
            });
        }

        let neighbours: Vec<Rect> = table
            .independent_devices()
            .filter(|d| d.id != device_id)
            .filter(|d| geometry.surface_index_of(&d.position) == surface.index)
            .map(|d| {
                Rect::from_origin_size(
                    surface.to_local(d.position),
                    device_footprint(d, &self.config),
                )
            })
            .collect();
        let targets = SnapTargets::from_rects(&neighbours);
        let threshold = self.config.scaled_snap_threshold();

        let snap_x = snap_axis(local.x, footprint.width, max_x, &targets.x, threshold);
        let snap_y = snap_axis(local.y, footprint.height, max_y, &targets.y, threshold);

        let surface_rect = surface.rect();
        let guides = [
            snap_x.target.map(|t| GuideLine::across(Axis::X, t, &surface_rect)),
            snap_y.target.map(|t| GuideLine::across(Axis::Y, t, &surface_rect)),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Placement {
            position: surface.to_global(Point::new(snap_x.position, snap_y.position)),
            surface: surface.index,
            guides,
        })
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
