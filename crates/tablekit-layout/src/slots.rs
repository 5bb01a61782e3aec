//! Image-board slots.
//!
//! Slots live in logical board units, so they survive zoom and pan. A click
//! on the rendered image is converted to an image fraction first and then to
//! logical units around the board centre:
//!
//! ```text
//! fraction = (click - rendered.origin) / rendered.size        (0..1)
//! logical  = centre + (fraction - 0.5) * image_extent
//! ```

use tablekit_core::{new_id, GeometryError, Point, Rect, Size, SlotError};
use tracing::{debug, warn};

use crate::config::GeometryConfig;
use crate::model::{Slot, Table, TableType};
use crate::snapping::{Axis, GuideLine};
use crate::surface::ImageBoard;

/// Derived line from the image edge to a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub slot_id: String,
    pub line: GuideLine,
}

/// Slot operations on image-board tables.
#[derive(Debug, Clone, Copy)]
pub struct SlotMapper<'a> {
    config: &'a GeometryConfig,
}

impl<'a> SlotMapper<'a> {
    pub fn new(config: &'a GeometryConfig) -> Self {
        Self { config }
    }

    /// Board dimensions of an image-board table with a measured image.
    pub fn board(&self, table: &Table) -> Result<ImageBoard, SlotError> {
        if table.table_type != TableType::ImageBoard {
            return Err(SlotError::NotAnImageBoard);
        }
        Ok(ImageBoard::for_table(table, self.config)?)
    }

    /// Logical position for a click on the image as rendered at `rendered`.
    pub fn click_to_logical(
        &self,
        table: &Table,
        rendered: &Rect,
        click: Point,
    ) -> Result<Point, SlotError> {
        let board = self.board(table)?;
        if !rendered.size().is_positive() {
            return Err(SlotError::Geometry(GeometryError::InvalidDimension {
                name: "rendered_image".to_string(),
                value: rendered.width.min(rendered.height),
            }));
        }

        let fx = (click.x - rendered.x) / rendered.width;
        let fy = (click.y - rendered.y) / rendered.height;
        let inside = |f: f64| (0.0..=1.0).contains(&f);
        if !inside(fx) || !inside(fy) {
            warn!("Slot click at {} outside rendered image", click);
            return Err(SlotError::OutsideImage {
                x: click.x,
                y: click.y,
            });
        }

        let logical = board.logical_size();
        let centre = board.center();
        Ok(Point::new(
            centre.x + (fx - 0.5) * logical.width,
            centre.y + (fy - 0.5) * logical.height,
        ))
    }

    /// Adds a slot at the clicked point; returns the new slot.
    pub fn create_slot(
        &self,
        table: &mut Table,
        rendered: &Rect,
        click: Point,
    ) -> Result<Slot, SlotError> {
        let position = self.click_to_logical(table, rendered, click)?;
        let slot = Slot::new(new_id(), position);
        debug!("Created slot {} at {}", slot.id, position);
        table.slots.push(slot.clone());
        Ok(slot)
    }

    /// Fixed lane position for the device bound to the `index`-th slot.
    pub fn lane_position(&self, index: usize) -> Point {
        Point::new(
            self.config.slot_lane_x,
            self.config.slot_lane_y + index as f64 * self.config.slot_lane_step,
        )
    }

    /// Binds `device_id` to `slot_id`, moving the device to the slot's lane.
    ///
    /// A device is bound to at most one slot; binding it elsewhere releases
    /// the previous slot.
    pub fn bind_device(
        &self,
        table: &mut Table,
        slot_id: &str,
        device_id: &str,
    ) -> Result<Point, SlotError> {
        let index = table
            .slots
            .iter()
            .position(|s| s.id == slot_id)
            .ok_or_else(|| SlotError::UnknownSlot {
                id: slot_id.to_string(),
            })?;
        if table.device(device_id).is_none() {
            return Err(SlotError::UnknownDevice {
                id: device_id.to_string(),
            });
        }

        self.release_device(table, device_id);
        table.slots[index].device_id = Some(device_id.to_string());

        let lane = self.lane_position(index);
        if let Some(device) = table.device_mut(device_id) {
            device.position = lane;
        }
        debug!("Bound {} to slot {}", device_id, slot_id);
        Ok(lane)
    }

    /// Clears the slot's binding; the device keeps its lane position.
    pub fn unbind(&self, table: &mut Table, slot_id: &str) -> Result<Option<String>, SlotError> {
        let slot = table.slot_mut(slot_id).ok_or_else(|| SlotError::UnknownSlot {
            id: slot_id.to_string(),
        })?;
        Ok(slot.device_id.take())
    }

    /// Clears every binding that references `device_id`.
    pub fn release_device(&self, table: &mut Table, device_id: &str) -> usize {
        let mut released = 0;
        for slot in table
            .slots
            .iter_mut()
            .filter(|s| s.device_id.as_deref() == Some(device_id))
        {
            slot.device_id = None;
            released += 1;
        }
        released
    }

    pub fn remove_slot(&self, table: &mut Table, slot_id: &str) -> Result<Slot, SlotError> {
        let index = table
            .slots
            .iter()
            .position(|s| s.id == slot_id)
            .ok_or_else(|| SlotError::UnknownSlot {
                id: slot_id.to_string(),
            })?;
        Ok(table.slots.remove(index))
    }

    /// Vertical connector from the nearer of the image's top or bottom edge.
    pub fn connector(&self, board: &ImageBoard, slot: &Slot) -> Connector {
        let image = board.image_rect();
        let edge_y = if (slot.position.y - image.top()).abs() <= (image.bottom() - slot.position.y).abs()
        {
            image.top()
        } else {
            image.bottom()
        };
        Connector {
            slot_id: slot.id.clone(),
            line: GuideLine {
                axis: Axis::X,
                from: Point::new(slot.position.x, edge_y),
                to: slot.position,
            },
        }
    }

    /// Connectors for every slot of `table`.
    pub fn connectors(&self, table: &Table) -> Result<Vec<Connector>, SlotError> {
        let board = self.board(table)?;
        Ok(table
            .slots
            .iter()
            .map(|slot| self.connector(&board, slot))
            .collect())
    }

    /// Swaps the reference image. Slots are cleared; devices keep their
    /// positions. Returns the number of slots removed.
    pub fn replace_image(
        &self,
        table: &mut Table,
        image_url: impl Into<String>,
        natural: Size,
    ) -> Result<usize, SlotError> {
        if table.table_type != TableType::ImageBoard {
            return Err(SlotError::NotAnImageBoard);
        }
        ImageBoard::new(natural, table.image_scale, self.config.image_padding)?;

        let cleared = table.slots.len();
        table.slots.clear();
        table.image_url = Some(image_url.into());
        table.image_natural_size = Some(natural);
        debug!("Replaced image, cleared {} slots", cleared);
        Ok(cleared)
    }

    /// Changes the image scale; stored slot positions are untouched.
    pub fn set_image_scale(&self, table: &mut Table, scale: f64) -> Result<ImageBoard, SlotError> {
        if table.table_type != TableType::ImageBoard {
            return Err(SlotError::NotAnImageBoard);
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SlotError::Geometry(GeometryError::InvalidDimension {
                name: "image_scale".to_string(),
                value: scale,
            }));
        }
        table.image_scale = scale;
        self.board(table)
    }
}

/// Rendered pixel position of a logical point.
pub fn render_position(logical: Point, zoom: f64) -> Point {
    logical.scaled(zoom)
}
