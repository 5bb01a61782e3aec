//! Error handling for TableKit
//!
//! Provides error types for every layer of the layout engine:
//! - Geometry errors (surface lookup, board dimensions)
//! - Placement errors (drag gestures)
//! - Attachment errors (accessory linkage)
//! - Slot errors (image-board slot mapping)
//! - Store errors (persistence and blob collaborators)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised when a table type cannot answer a geometric query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The table type has no surfaces the engine understands
    #[error("Unsupported table type: {table_type}")]
    UnsupportedTableType {
        /// The raw table type value.
        table_type: String,
    },

    /// A surface index outside the table's surface list
    #[error("Surface {index} does not exist on a {table_type} table")]
    NoSuchSurface {
        /// The requested surface index.
        index: usize,
        /// The table type that was queried.
        table_type: String,
    },

    /// An image board was queried before an image was measured
    #[error("Image board has no measured image")]
    ImageNotMeasured,

    /// A dimension that must be positive was not
    #[error("Invalid dimension '{name}': {value}")]
    InvalidDimension {
        /// The dimension name.
        name: String,
        /// The offending value.
        value: f64,
    },
}

/// Placement error type
///
/// Represents rejected drag gestures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// The device id is not on the table
    #[error("Device not found: {id}")]
    UnknownDevice {
        /// The missing device id.
        id: String,
    },

    /// Attached accessories follow their parent and cannot be dragged
    #[error("Device {id} is attached to {parent} and cannot be dragged")]
    AttachedDevice {
        /// The dragged device id.
        id: String,
        /// The parent it is attached to.
        parent: String,
    },

    /// Move or end was called without a drag in progress
    #[error("No drag in progress")]
    NoActiveDrag,

    /// The table type has no draggable surfaces
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Dropping an accessory onto a device failed
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// Attachment error type
///
/// Represents violations of the one-level accessory invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttachmentError {
    /// The accessory or parent is not on the table
    #[error("Device not found: {id}")]
    UnknownDevice {
        /// The missing device id.
        id: String,
    },

    /// A device cannot be attached to itself
    #[error("Device {id} cannot be attached to itself")]
    SelfAttachment {
        /// The device id.
        id: String,
    },

    /// The proposed parent is itself an accessory or attached
    #[error("Device {parent} cannot carry accessories")]
    InvalidParent {
        /// The rejected parent id.
        parent: String,
    },

    /// The device has accessories of its own and cannot become one
    #[error("Device {id} has attached accessories and cannot be attached")]
    HasAccessories {
        /// The device id.
        id: String,
    },

    /// The device is not an accessory type
    #[error("Device {id} is not an accessory")]
    NotAnAccessory {
        /// The device id.
        id: String,
    },

    /// Geometry lookup failed while computing offsets
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Slot error type
///
/// Represents rejected image-board slot operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    /// Slots only exist on image boards
    #[error("Slots are only available on image boards")]
    NotAnImageBoard,

    /// A click landed outside the rendered image
    #[error("Click at ({x:.1}, {y:.1}) is outside the image")]
    OutsideImage {
        /// The click x coordinate.
        x: f64,
        /// The click y coordinate.
        y: f64,
    },

    /// The slot id is not on the table
    #[error("Slot not found: {id}")]
    UnknownSlot {
        /// The missing slot id.
        id: String,
    },

    /// The device id is not on the table
    #[error("Device not found: {id}")]
    UnknownDevice {
        /// The missing device id.
        id: String,
    },

    /// Geometry lookup failed while mapping coordinates
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Store error type
///
/// Represents failures of the persistence, blob and issue collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The record does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The record kind ("table", "store", ...).
        kind: String,
        /// The record id.
        id: String,
    },

    /// The stored document could not be decoded
    #[error("Malformed {kind} document {id}: {reason}")]
    Malformed {
        /// The record kind.
        kind: String,
        /// The record id.
        id: String,
        /// Decoder message.
        reason: String,
    },

    /// The backend could not be reached or failed the request
    #[error("Storage backend error: {reason}")]
    Backend {
        /// The reason for the failure.
        reason: String,
    },

    /// Blob upload rejected
    #[error("Upload of {file_name} failed: {reason}")]
    Upload {
        /// The uploaded file name.
        file_name: String,
        /// The reason for the failure.
        reason: String,
    },
}

/// Main error type for TableKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Placement error
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Attachment error
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Slot error
    #[error(transparent)]
    Slot(#[from] SlotError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error came from user input that was rejected
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            Error::Placement(PlacementError::AttachedDevice { .. })
                | Error::Slot(SlotError::OutsideImage { .. })
                | Error::Attachment(_)
        )
    }

    /// Check if this is a store error
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_error_display() {
        let err = PlacementError::AttachedDevice {
            id: "pencil-1".to_string(),
            parent: "ipad-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Device pencil-1 is attached to ipad-1 and cannot be dragged"
        );
    }

    #[test]
    fn test_slot_error_display() {
        let err = SlotError::OutsideImage { x: 12.0, y: -3.0 };
        assert_eq!(err.to_string(), "Click at (12.0, -3.0) is outside the image");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = GeometryError::ImageNotMeasured.into();
        assert!(matches!(err, Error::Geometry(_)));

        let err: Error = StoreError::NotFound {
            kind: "table".to_string(),
            id: "t1".to_string(),
        }
        .into();
        assert!(err.is_store_error());
        assert_eq!(err.to_string(), "table not found: t1");
    }

    #[test]
    fn test_rejected_input_classification() {
        let err: Error = SlotError::OutsideImage { x: 0.0, y: 0.0 }.into();
        assert!(err.is_rejected_input());

        let err: Error = PlacementError::NoActiveDrag.into();
        assert!(!err.is_rejected_input());
    }
}
