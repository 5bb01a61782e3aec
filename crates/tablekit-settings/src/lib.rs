//! TableKit Settings Crate
//!
//! Application configuration: board geometry overrides, editor and renderer
//! preferences, and storage location.

pub mod config;
pub mod error;

pub use config::{Config, ConfigFormat, EditorSettings, RendererSettings, StorageSettings};
pub use error::{SettingsError, SettingsResult};
