//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Layout editor events
    Editor(EditorEvent),
    /// Persistence and upload events
    Storage(StorageEvent),
    /// Transient user-visible notifications
    Notice(Notification),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Editor(_) => EventCategory::Editor,
            AppEvent::Storage(_) => EventCategory::Storage,
            AppEvent::Notice(_) => EventCategory::Notice,
        }
    }

    /// Table the event concerns; notices are not tied to a table.
    pub fn table_id(&self) -> Option<&str> {
        match self {
            AppEvent::Editor(e) => Some(match e {
                EditorEvent::DeviceMoved { table_id, .. }
                | EditorEvent::AccessoryAttached { table_id, .. }
                | EditorEvent::DeviceRemoved { table_id, .. }
                | EditorEvent::SlotCreated { table_id, .. }
                | EditorEvent::ImageReplaced { table_id, .. } => table_id.as_str(),
            }),
            AppEvent::Storage(e) => Some(match e {
                StorageEvent::TableLoaded { table_id, .. }
                | StorageEvent::TableSaved { table_id }
                | StorageEvent::SaveFailed { table_id, .. }
                | StorageEvent::SaveAbandoned { table_id }
                | StorageEvent::ImageUploaded { table_id, .. } => table_id.as_str(),
            }),
            AppEvent::Notice(_) => None,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Editor(e) => e.description(),
            AppEvent::Storage(e) => e.description(),
            AppEvent::Notice(n) => format!("{} [{}]: {}", n.level, n.code, n.message),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Layout editor events.
    Editor,
    /// Persistence events.
    Storage,
    /// Notifications.
    Notice,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Editor => write!(f, "Editor"),
            EventCategory::Storage => write!(f, "Storage"),
            EventCategory::Notice => write!(f, "Notice"),
        }
    }
}

/// Layout editor events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EditorEvent {
    /// A device was placed or moved.
    DeviceMoved {
        table_id: String,
        device_id: String,
        x: f64,
        y: f64,
    },
    /// An accessory was attached to a parent device.
    AccessoryAttached {
        table_id: String,
        device_id: String,
        parent_id: String,
    },
    /// A device and its accessories were removed.
    DeviceRemoved {
        table_id: String,
        device_id: String,
        cascaded: usize,
    },
    /// A slot was created on an image board.
    SlotCreated { table_id: String, slot_id: String },
    /// The reference image was replaced and slots were reset.
    ImageReplaced { table_id: String, image_url: String },
}

impl EditorEvent {
    fn description(&self) -> String {
        match self {
            EditorEvent::DeviceMoved {
                device_id, x, y, ..
            } => format!("Device {} moved to ({:.1}, {:.1})", device_id, x, y),
            EditorEvent::AccessoryAttached {
                device_id,
                parent_id,
                ..
            } => format!("Accessory {} attached to {}", device_id, parent_id),
            EditorEvent::DeviceRemoved {
                device_id,
                cascaded,
                ..
            } => format!("Device {} removed ({} accessories)", device_id, cascaded),
            EditorEvent::SlotCreated { slot_id, .. } => format!("Slot {} created", slot_id),
            EditorEvent::ImageReplaced { image_url, .. } => {
                format!("Image replaced: {}", image_url)
            }
        }
    }
}

/// Persistence events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageEvent {
    /// A table document was loaded.
    TableLoaded { table_id: String, devices: usize },
    /// A save completed.
    TableSaved { table_id: String },
    /// A save failed; in-memory state is kept.
    SaveFailed { table_id: String, reason: String },
    /// A save was abandoned before completion.
    SaveAbandoned { table_id: String },
    /// An image upload completed.
    ImageUploaded { table_id: String, url: String },
}

impl StorageEvent {
    fn description(&self) -> String {
        match self {
            StorageEvent::TableLoaded { table_id, devices } => {
                format!("Table {} loaded with {} devices", table_id, devices)
            }
            StorageEvent::TableSaved { table_id } => format!("Table {} saved", table_id),
            StorageEvent::SaveFailed { table_id, reason } => {
                format!("Saving table {} failed: {}", table_id, reason)
            }
            StorageEvent::SaveAbandoned { table_id } => {
                format!("Save of table {} abandoned", table_id)
            }
            StorageEvent::ImageUploaded { table_id, url } => {
                format!("Image for table {} uploaded to {}", table_id, url)
            }
        }
    }
}

/// Notification severity levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational message.
    Info,
    /// Rejected input or degraded behaviour.
    Warning,
    /// Failed operation; state was kept.
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "Info"),
            NotificationLevel::Warning => write!(f, "Warning"),
            NotificationLevel::Error => write!(f, "Error"),
        }
    }
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Stable machine-readable code, e.g. `"save_failed"`.
    pub code: String,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, code, message)
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, code, message)
    }
}
