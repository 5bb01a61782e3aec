//! # TableKit Store
//!
//! Persistence for table layouts. The [`TableStore`], [`BlobStore`] and
//! [`IssueSource`] traits are the seams; [`JsonDirectoryStore`] and
//! [`MemoryBackend`] implement all three. [`TableSync`] drives saves in the
//! background and reports their outcome on the event bus.

pub mod blob;
pub mod json_dir;
pub mod memory;
pub mod sync;
pub mod traits;

pub use blob::{object_name, MAX_UPLOAD_BYTES};
pub use json_dir::{JsonDirectoryStore, StoreTableRow};
pub use memory::MemoryBackend;
pub use sync::{StoreOverview, TableSync};
pub use traits::{BlobStore, IssueSource, TableStore};
