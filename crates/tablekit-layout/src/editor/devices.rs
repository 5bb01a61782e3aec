//! Device lifecycle operations.

use tablekit_core::{new_id, EditorEvent, Error, PlacementError, Point, Result};
use tracing::{debug, info};

use super::TableEditor;
use crate::attachment::{remove_with_accessories, AttachmentResolver};
use crate::model::Device;
use crate::placement::DropOutcome;
use crate::slots::SlotMapper;

/// Where a newly added device goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spawn {
    /// Clamped and snapped at a board position.
    At(Point),
    /// Next free position in the left-hand lane.
    NextLane,
}

impl TableEditor {
    /// Adds a device and returns its id.
    ///
    /// Devices without an id, or with one already on the table, get a fresh
    /// id. A parent link on the incoming device is honoured through the
    /// attachment resolver.
    pub fn add_device(&mut self, mut device: Device, spawn: Spawn) -> Result<String> {
        if device.id.trim().is_empty() || self.table.device(&device.id).is_some() {
            device.id = new_id();
        }
        let parent = device.attached_to.take();
        let id = device.id.clone();

        let position = match spawn {
            Spawn::At(point) => point,
            Spawn::NextLane => {
                let lane = self.table.independent_devices().count();
                SlotMapper::new(self.engine.config()).lane_position(lane)
            }
        };
        device.position = position;
        self.table.devices.push(device);

        let placed = self.engine.constrain(&self.table, &id, position)?;
        if let Some(device) = self.table.device_mut(&id) {
            device.position = placed.position;
        }

        if let Some(parent) = parent {
            if let Err(err) = self.attach(&id, &parent) {
                debug!("Added {} unattached: {}", id, err);
            }
        }

        info!("Added device {} to {}", id, self.table.id);
        self.touch();
        self.publish(EditorEvent::DeviceMoved {
            table_id: self.table.id.clone(),
            device_id: id.clone(),
            x: placed.position.x,
            y: placed.position.y,
        });
        Ok(id)
    }

    /// Removes a device and everything attached to it.
    pub fn remove_device(&mut self, id: &str) -> Result<Vec<Device>> {
        if self.engine.dragging() == Some(id) {
            self.engine.cancel_drag();
        }
        let removed = remove_with_accessories(&mut self.table, id);
        if removed.is_empty() {
            return Err(PlacementError::UnknownDevice { id: id.to_string() }.into());
        }

        let mapper = SlotMapper::new(self.engine.config());
        for device in &removed {
            mapper.release_device(&mut self.table, &device.id);
        }

        info!(
            "Removed device {} with {} accessories",
            id,
            removed.len() - 1
        );
        self.touch();
        self.publish(EditorEvent::DeviceRemoved {
            table_id: self.table.id.clone(),
            device_id: id.to_string(),
            cascaded: removed.len() - 1,
        });
        Ok(removed)
    }

    /// Changes a device's quantity; zero is raised to one.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) -> Result<()> {
        let device = self
            .table
            .device_mut(id)
            .ok_or_else(|| PlacementError::UnknownDevice { id: id.to_string() })?;
        device.quantity = quantity.max(1);
        self.touch();
        Ok(())
    }

    /// Starts a drag at a board position.
    pub fn begin_drag(&mut self, id: &str, pointer: Point) -> Result<()> {
        self.engine
            .begin_drag(&self.table, id, pointer)
            .map_err(Error::from)
            .inspect_err(|err| self.reject("drag_rejected", err))
    }

    pub fn drag_to(&mut self, pointer: Point) -> Result<Point> {
        let position = self.engine.drag_to(&mut self.table, pointer)?;
        self.touch();
        Ok(position)
    }

    pub fn end_drag(&mut self, pointer: Point) -> Result<DropOutcome> {
        let Some(device_id) = self.engine.dragging().map(str::to_string) else {
            return Err(PlacementError::NoActiveDrag.into());
        };
        let outcome = self
            .engine
            .end_drag(&mut self.table, pointer)
            .map_err(Error::from)
            .inspect_err(|err| self.reject("attach_rejected", err))?;

        self.touch();
        let table_id = self.table.id.clone();
        match &outcome {
            DropOutcome::Placed { position } => self.publish(EditorEvent::DeviceMoved {
                table_id,
                device_id,
                x: position.x,
                y: position.y,
            }),
            DropOutcome::Attached { parent_id, .. } => {
                self.publish(EditorEvent::AccessoryAttached {
                    table_id,
                    device_id,
                    parent_id: parent_id.clone(),
                })
            }
        }
        Ok(outcome)
    }

    pub fn cancel_drag(&mut self) {
        self.engine.cancel_drag();
    }

    /// Attaches an accessory to a parent explicitly.
    pub fn attach(&mut self, accessory_id: &str, parent_id: &str) -> Result<Point> {
        let position = AttachmentResolver::new(self.engine.config())
            .attach(&mut self.table, accessory_id, parent_id)
            .map_err(Error::from)
            .inspect_err(|err| self.reject("attach_rejected", err))?;
        self.touch();
        self.publish(EditorEvent::AccessoryAttached {
            table_id: self.table.id.clone(),
            device_id: accessory_id.to_string(),
            parent_id: parent_id.to_string(),
        });
        Ok(position)
    }

    /// Detaches an accessory; it stays where it was drawn.
    pub fn detach(&mut self, accessory_id: &str) -> Result<()> {
        AttachmentResolver::new(self.engine.config()).detach(&mut self.table, accessory_id)?;
        self.touch();
        Ok(())
    }
}
