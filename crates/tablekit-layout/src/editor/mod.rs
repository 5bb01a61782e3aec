//! Editor state for one table.
//!
//! `TableEditor` owns the working copy of a table and routes every change
//! through the placement engine, the attachment resolver or the slot
//! mapper. It is split into submodules:
//! - `devices`: add, remove, drag, attach and detach
//! - `image`: reference image and slot operations

mod devices;
mod image;

use std::sync::Arc;

use tablekit_core::{event_bus, AppEvent, EditorEvent, EventBus, Notification, Point};
use tracing::{info, warn};

use crate::attachment::AttachmentResolver;
use crate::config::GeometryConfig;
use crate::model::{Table, TableUpdate};
use crate::placement::PlacementEngine;
use crate::snapping::GuideLine;
use crate::surface::TableGeometry;
use crate::viewport::Viewport;

pub use devices::Spawn;

/// Working copy of a table plus gesture and view state.
#[derive(Clone)]
pub struct TableEditor {
    table: Table,
    engine: PlacementEngine,
    viewport: Viewport,
    is_modified: bool,
    bus: Arc<EventBus>,
}

impl TableEditor {
    /// Opens `table` for editing, publishing on the global event bus.
    pub fn open(table: Table, config: GeometryConfig) -> Self {
        Self::with_bus(table, config, event_bus())
    }

    /// Opens `table` for editing.
    ///
    /// Dangling parent links are cleared and every accessory stack is
    /// recomputed so the working copy starts out consistent.
    pub fn with_bus(mut table: Table, config: GeometryConfig, bus: Arc<EventBus>) -> Self {
        let repaired = AttachmentResolver::repair_links(&mut table);
        if repaired > 0 {
            warn!("Cleared {} dangling accessory links in {}", repaired, table.id);
            bus.notify(Notification::warning(
                "links_repaired",
                format!("{} accessories lost their parent and were detached", repaired),
            ));
        }

        let resolver = AttachmentResolver::new(&config);
        let parents: Vec<String> = table
            .devices
            .iter()
            .filter_map(|d| d.attached_to.clone())
            .collect();
        for parent in parents {
            if let Err(err) = resolver.restack(&mut table, &parent) {
                warn!("Could not restack accessories of {}: {}", parent, err);
            }
        }

        let board = TableGeometry::for_table(&table, &config)
            .map(|g| g.board_size())
            .unwrap_or_default();
        let viewport = Viewport::new(board.width, board.height);

        info!("Opened table {} with {} devices", table.id, table.devices.len());
        Self {
            table,
            engine: PlacementEngine::new(config),
            viewport,
            is_modified: repaired > 0,
            bus,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn config(&self) -> &GeometryConfig {
        self.engine.config()
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Clears the dirty flag after a save was issued.
    pub fn mark_saved(&mut self) {
        self.is_modified = false;
    }

    /// The document to persist.
    pub fn to_update(&self) -> TableUpdate {
        self.table.to_update()
    }

    pub fn geometry(&self) -> tablekit_core::Result<TableGeometry> {
        Ok(TableGeometry::for_table(&self.table, self.engine.config())?)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Converts a canvas pixel position to board units.
    pub fn screen_to_board(&self, screen: Point) -> Point {
        self.viewport.screen_to_board(screen)
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.engine.set_snap_enabled(enabled);
    }

    pub fn snap_enabled(&self) -> bool {
        self.engine.snap_enabled()
    }

    /// Guide lines of the drag in progress.
    pub fn guides(&self) -> &[GuideLine] {
        self.engine.guides()
    }

    fn touch(&mut self) {
        self.is_modified = true;
    }

    fn publish(&self, event: EditorEvent) {
        self.bus.publish(AppEvent::Editor(event));
    }

    fn reject(&self, code: &str, err: &tablekit_core::Error) {
        warn!("Rejected {}: {}", code, err);
        self.bus
            .notify(Notification::warning(code, err.to_string()));
    }
}

impl std::fmt::Debug for TableEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEditor")
            .field("table", &self.table.id)
            .field("devices", &self.table.devices.len())
            .field("is_modified", &self.is_modified)
            .finish()
    }
}
