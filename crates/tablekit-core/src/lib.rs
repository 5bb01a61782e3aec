//! # TableKit Core
//!
//! Core types and utilities shared by every TableKit crate.
//! Provides geometry primitives, the unified error hierarchy, and the
//! notification event bus used to surface transient messages to users.

pub mod error;
pub mod event_bus;
pub mod geometry;

pub use error::{
    AttachmentError, Error, GeometryError, PlacementError, Result, SlotError, StoreError,
};

pub use event_bus::{
    event_bus, AppEvent, EditorEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    Notification, NotificationLevel, StorageEvent, SubscriptionId,
};

pub use geometry::{Point, Rect, Size};

/// Generates a fresh identifier for devices, slots and tables.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
