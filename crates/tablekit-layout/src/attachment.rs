//! Accessory attachment and stacking.
//!
//! An accessory bound to a parent is positioned from the parent alone:
//! accessories of one parent stack in device-array order, outward from the
//! parent away from the surface midline.
//!
//! ```text
//! North parent (upper half)        South parent (lower half)
//!   [acc 2]   ^                      [parent]
//!   [acc 1]   | stacks upward          | first gap
//!     | first gap                    [acc 1]   | stacks downward
//!   [parent]                         [acc 2]   v
//! ```

use tablekit_core::{AttachmentError, Point};
use tracing::debug;

use crate::config::GeometryConfig;
use crate::model::{Device, Table};
use crate::sizing::accessory_slot_height;
use crate::surface::TableGeometry;

/// Which half of its surface a parent sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    North,
    South,
}

/// Computes accessory offsets and maintains parent links.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentResolver<'a> {
    config: &'a GeometryConfig,
}

impl<'a> AttachmentResolver<'a> {
    pub fn new(config: &'a GeometryConfig) -> Self {
        Self { config }
    }

    /// Side of the parent relative to its surface midline.
    pub fn side_of(&self, geometry: &TableGeometry, parent: &Device) -> Side {
        let surface = geometry.surface_of(&parent.position);
        if surface.to_local(parent.position).y < surface.midline() {
            Side::North
        } else {
            Side::South
        }
    }

    /// Stacked positions for `accessories` (in order) around `parent`.
    pub fn stack_positions(&self, parent: &Device, side: Side, accessories: &[&Device]) -> Vec<Point> {
        let x = parent.position.x + self.config.accessory_x_offset;
        let mut positions = Vec::with_capacity(accessories.len());
        match side {
            Side::South => {
                let mut y = parent.position.y + self.config.accessory_first_gap;
                for accessory in accessories {
                    positions.push(Point::new(x, y));
                    y += accessory_slot_height(accessory, self.config);
                }
            }
            Side::North => {
                let mut y = parent.position.y - self.config.accessory_first_gap;
                for accessory in accessories {
                    y -= accessory_slot_height(accessory, self.config);
                    positions.push(Point::new(x, y));
                }
            }
        }
        positions
    }

    /// Recomputes the positions of every accessory of `parent_id`.
    pub fn restack(&self, table: &mut Table, parent_id: &str) -> Result<(), AttachmentError> {
        if !table.has_accessories(parent_id) {
            return Ok(());
        }
        let parent = table
            .device(parent_id)
            .ok_or_else(|| AttachmentError::UnknownDevice {
                id: parent_id.to_string(),
            })?;
        let geometry = TableGeometry::for_table(table, self.config)?;
        let side = self.side_of(&geometry, parent);
        let accessories: Vec<&Device> = table.accessories_of(parent_id).collect();
        let updates: Vec<(String, Point)> = accessories
            .iter()
            .map(|d| d.id.clone())
            .zip(self.stack_positions(parent, side, &accessories))
            .collect();

        for (id, position) in updates {
            if let Some(device) = table.device_mut(&id) {
                device.position = position;
            }
        }
        Ok(())
    }

    /// Binds `accessory_id` to `parent_id` and returns its stacked position.
    ///
    /// Reattaching to the current parent only recomputes the stack. Moving
    /// to a new parent appends the accessory to that parent's stack and
    /// closes the gap in the old one.
    pub fn attach(
        &self,
        table: &mut Table,
        accessory_id: &str,
        parent_id: &str,
    ) -> Result<Point, AttachmentError> {
        let accessory = table
            .device(accessory_id)
            .ok_or_else(|| AttachmentError::UnknownDevice {
                id: accessory_id.to_string(),
            })?;
        let parent = table
            .device(parent_id)
            .ok_or_else(|| AttachmentError::UnknownDevice {
                id: parent_id.to_string(),
            })?;

        if accessory_id == parent_id {
            return Err(AttachmentError::SelfAttachment {
                id: accessory_id.to_string(),
            });
        }
        if !accessory.is_accessory() {
            return Err(AttachmentError::NotAnAccessory {
                id: accessory_id.to_string(),
            });
        }
        if table.has_accessories(accessory_id) {
            return Err(AttachmentError::HasAccessories {
                id: accessory_id.to_string(),
            });
        }
        if parent.is_accessory() || parent.is_attached() {
            return Err(AttachmentError::InvalidParent {
                parent: parent_id.to_string(),
            });
        }

        let previous = accessory.attached_to.clone();
        if previous.as_deref() != Some(parent_id) {
            if let Some(index) = table.device_index(accessory_id) {
                let mut moved = table.devices.remove(index);
                moved.attached_to = Some(parent_id.to_string());
                table.devices.push(moved);
            }
            if let Some(old_parent) = previous.as_deref() {
                self.restack(table, old_parent)?;
            }
            debug!("Attached {} to {}", accessory_id, parent_id);
        }

        self.restack(table, parent_id)?;
        table
            .device(accessory_id)
            .map(|d| d.position)
            .ok_or_else(|| AttachmentError::UnknownDevice {
                id: accessory_id.to_string(),
            })
    }

    /// Unbinds an accessory; it keeps its current position.
    pub fn detach(&self, table: &mut Table, accessory_id: &str) -> Result<(), AttachmentError> {
        let device =
            table
                .device_mut(accessory_id)
                .ok_or_else(|| AttachmentError::UnknownDevice {
                    id: accessory_id.to_string(),
                })?;
        if let Some(parent) = device.attached_to.take() {
            debug!("Detached {} from {}", accessory_id, parent);
            self.restack(table, &parent)?;
        }
        Ok(())
    }

    /// Clears parent links that point at missing devices, at the device
    /// itself, or at devices that are attached themselves. Returns the
    /// number of links cleared.
    pub fn repair_links(table: &mut Table) -> usize {
        let parents: Vec<(String, bool)> = table
            .devices
            .iter()
            .map(|d| (d.id.clone(), d.is_attached()))
            .collect();
        let mut cleared = 0;
        for device in &mut table.devices {
            let Some(parent) = device.attached_to.as_deref() else {
                continue;
            };
            let valid = parent != device.id
                && parents
                    .iter()
                    .any(|(id, attached)| id == parent && !attached);
            if !valid {
                debug!("Clearing dangling parent link {} -> {}", device.id, parent);
                device.attached_to = None;
                cleared += 1;
            }
        }
        cleared
    }
}

/// Removes `id` and every device attached to it. Returns the removed devices,
/// the requested one first.
pub fn remove_with_accessories(table: &mut Table, id: &str) -> Vec<Device> {
    let Some(index) = table.device_index(id) else {
        return Vec::new();
    };
    let mut removed = vec![table.devices.remove(index)];
    let (accessories, kept): (Vec<Device>, Vec<Device>) = std::mem::take(&mut table.devices)
        .into_iter()
        .partition(|d| d.attached_to.as_deref() == Some(id));
    table.devices = kept;
    removed.extend(accessories);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableType;

    fn table() -> Table {
        let mut table = Table::new("t1", "Launch", TableType::Single);
        table.devices = vec![
            Device::new("ipad", "iPad Pro", "iPad").with_position(300.0, 50.0),
            Device::new("mac", "MacBook Air", "Mac").with_position(800.0, 400.0),
            Device::new("pencil", "Apple Pencil", "Accessories"),
            Device::new("kb", "Magic Keyboard", "Accessories"),
        ];
        table
    }

    #[test]
    fn test_north_stack_offsets() {
        let config = GeometryConfig::default();
        let resolver = AttachmentResolver::new(&config);
        let mut table = table();

        let first = resolver.attach(&mut table, "pencil", "ipad").expect("attach");
        assert_eq!(first, Point::new(305.0, 50.0 - 45.0 - 35.0 - 5.0));

        let second = resolver.attach(&mut table, "kb", "ipad").expect("attach");
        assert_eq!(second, Point::new(305.0, first.y - 40.0));
    }

    #[test]
    fn test_south_stack_offsets() {
        let config = GeometryConfig::default();
        let resolver = AttachmentResolver::new(&config);
        let mut table = table();

        let first = resolver.attach(&mut table, "pencil", "mac").expect("attach");
        assert_eq!(first, Point::new(805.0, 445.0));
        let second = resolver.attach(&mut table, "kb", "mac").expect("attach");
        assert_eq!(second, Point::new(805.0, 485.0));
    }

    #[test]
    fn test_reattach_is_idempotent() {
        let config = GeometryConfig::default();
        let resolver = AttachmentResolver::new(&config);
        let mut table = table();

        resolver.attach(&mut table, "pencil", "ipad").expect("attach");
        resolver.attach(&mut table, "kb", "ipad").expect("attach");
        let before = table.clone();
        resolver.attach(&mut table, "pencil", "ipad").expect("reattach");
        assert_eq!(table, before);
        assert_eq!(table.accessories_of("ipad").count(), 2);
    }

    #[test]
    fn test_moving_to_new_parent_closes_gap() {
        let config = GeometryConfig::default();
        let resolver = AttachmentResolver::new(&config);
        let mut table = table();

        let first = resolver.attach(&mut table, "pencil", "ipad").expect("attach");
        resolver.attach(&mut table, "kb", "ipad").expect("attach");
        resolver.attach(&mut table, "pencil", "mac").expect("move");

        assert_eq!(table.device("kb").map(|d| d.position), Some(first));
        assert_eq!(table.devices.last().map(|d| d.id.as_str()), Some("pencil"));
    }

    #[test]
    fn test_rejections() {
        let config = GeometryConfig::default();
        let resolver = AttachmentResolver::new(&config);
        let mut table = table();

        assert!(matches!(
            resolver.attach(&mut table, "ipad", "mac"),
            Err(AttachmentError::NotAnAccessory { .. })
        ));
        assert!(matches!(
            resolver.attach(&mut table, "pencil", "pencil"),
            Err(AttachmentError::SelfAttachment { .. })
        ));
        assert!(matches!(
            resolver.attach(&mut table, "pencil", "kb"),
            Err(AttachmentError::InvalidParent { .. })
        ));
        assert!(matches!(
            resolver.attach(&mut table, "pencil", "nope"),
            Err(AttachmentError::UnknownDevice { .. })
        ));
    }

    #[test]
    fn test_detach_keeps_position() {
        let config = GeometryConfig::default();
        let resolver = AttachmentResolver::new(&config);
        let mut table = table();
        let pos = resolver.attach(&mut table, "pencil", "mac").expect("attach");
        resolver.detach(&mut table, "pencil").expect("detach");
        let pencil = table.device("pencil").expect("still there");
        assert!(pencil.attached_to.is_none());
        assert_eq!(pencil.position, pos);
    }

    #[test]
    fn test_cascade_removal() {
        let config = GeometryConfig::default();
        let resolver = AttachmentResolver::new(&config);
        let mut table = table();
        resolver.attach(&mut table, "pencil", "ipad").expect("attach");
        resolver.attach(&mut table, "kb", "ipad").expect("attach");

        let removed = remove_with_accessories(&mut table, "ipad");
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0].id, "ipad");
        assert_eq!(table.devices.len(), 1);
        assert!(table
            .devices
            .iter()
            .all(|d| d.attached_to.as_deref() != Some("ipad")));
    }

    #[test]
    fn test_repair_links() {
        let mut table = table();
        table.devices[2].attached_to = Some("ghost".to_string());
        table.devices[3].attached_to = Some("pencil".to_string());
        // pencil -> ghost is dangling; kb -> pencil points at an attached device
        assert_eq!(AttachmentResolver::repair_links(&mut table), 2);
        assert!(table.devices.iter().all(|d| d.attached_to.is_none()));
    }
}
