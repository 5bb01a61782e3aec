//! Reference image and slot operations.

use tablekit_core::{EditorEvent, Error, GeometryError, Point, Rect, Result, Size, SlotError};
use tracing::info;

use super::TableEditor;
use crate::model::Slot;
use crate::slots::{Connector, SlotMapper};
use crate::surface::ImageBoard;

impl TableEditor {
    /// Points the table at a freshly uploaded image; existing slots are reset.
    pub fn replace_image(&mut self, image_url: impl Into<String>, natural: Size) -> Result<usize> {
        let image_url = image_url.into();
        let cleared = SlotMapper::new(self.engine.config()).replace_image(
            &mut self.table,
            image_url.clone(),
            natural,
        )?;
        self.refit_viewport();
        info!(
            "Replaced image of {} ({} slots cleared)",
            self.table.id, cleared
        );
        self.touch();
        self.publish(EditorEvent::ImageReplaced {
            table_id: self.table.id.clone(),
            image_url,
        });
        Ok(cleared)
    }

    /// Rescales the image; slot positions stay in logical units.
    pub fn set_image_scale(&mut self, scale: f64) -> Result<ImageBoard> {
        let board = SlotMapper::new(self.engine.config()).set_image_scale(&mut self.table, scale)?;
        self.refit_viewport();
        self.touch();
        Ok(board)
    }

    /// Creates a slot from a click on the image drawn at `rendered`.
    ///
    /// Clicks outside the image publish a warning and leave the table as is.
    pub fn create_slot(&mut self, rendered: &Rect, click: Point) -> Result<Slot> {
        let slot = match SlotMapper::new(self.engine.config()).create_slot(
            &mut self.table,
            rendered,
            click,
        ) {
            Ok(slot) => slot,
            Err(err) => {
                let code = slot_rejection_code(&err);
                let err = Error::from(err);
                self.reject(code, &err);
                return Err(err);
            }
        };
        self.touch();
        self.publish(EditorEvent::SlotCreated {
            table_id: self.table.id.clone(),
            slot_id: slot.id.clone(),
        });
        Ok(slot)
    }

    pub fn bind_slot(&mut self, slot_id: &str, device_id: &str) -> Result<Point> {
        let lane = SlotMapper::new(self.engine.config())
            .bind_device(&mut self.table, slot_id, device_id)?;
        self.touch();
        Ok(lane)
    }

    pub fn unbind_slot(&mut self, slot_id: &str) -> Result<Option<String>> {
        let previous = SlotMapper::new(self.engine.config()).unbind(&mut self.table, slot_id)?;
        self.touch();
        Ok(previous)
    }

    pub fn remove_slot(&mut self, slot_id: &str) -> Result<Slot> {
        let slot = SlotMapper::new(self.engine.config()).remove_slot(&mut self.table, slot_id)?;
        self.touch();
        Ok(slot)
    }

    /// Connector lines for every slot of a measured image board.
    pub fn connectors(&self) -> Result<Vec<Connector>> {
        Ok(SlotMapper::new(self.engine.config()).connectors(&self.table)?)
    }

    fn refit_viewport(&mut self) {
        if let Ok(geometry) = self.geometry() {
            let board = geometry.board_size();
            self.viewport.set_canvas_size(board.width, board.height);
        }
    }
}

fn slot_rejection_code(err: &SlotError) -> &'static str {
    match err {
        SlotError::OutsideImage { .. } => "slot_outside_image",
        SlotError::NotAnImageBoard => "not_an_image_board",
        SlotError::Geometry(GeometryError::ImageNotMeasured) => "image_not_measured",
        _ => "slot_rejected",
    }
}
