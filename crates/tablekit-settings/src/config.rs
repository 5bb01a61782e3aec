//! Configuration for TableKit
//!
//! Sections:
//! - `geometry`: board constants, see [`GeometryConfig`]
//! - `editor`: snapping and display scale, applied by [`Config::open_editor`]
//! - `renderer`: default zoom and SVG colours
//! - `storage`: where table documents live
//!
//! Files are JSON or TOML, chosen by extension. Missing sections and keys
//! fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tablekit_core::EventBus;
use tablekit_layout::{
    GeometryConfig, ReadOnlyRenderer, RenderStyle, Table, TableEditor, MAX_ZOOM, MIN_ZOOM,
};
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from a path's extension.
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Editor behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub snap_enabled: bool,
    /// Device pixel ratio of the display; overrides `geometry.display_scale`.
    pub display_scale: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            display_scale: 1.0,
        }
    }
}

/// Read-only renderer and SVG export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub default_zoom: f64,
    pub style: RenderStyle,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            default_zoom: 1.0,
            style: RenderStyle::default(),
        }
    }
}

/// Local persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Root of the JSON document directory.
    pub data_dir: PathBuf,
    /// Base URL uploaded images are served from, if not `file://`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .map(|d| d.join("tablekit"))
                .unwrap_or_else(|| PathBuf::from("tablekit-data")),
            public_base_url: None,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub geometry: GeometryConfig,
    pub editor: EditorSettings,
    pub renderer: RendererSettings,
    pub storage: StorageSettings,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config file location, e.g. `~/.config/tablekit/config.toml`.
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("tablekit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        self.geometry.validate()?;

        let scale = self.editor.display_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SettingsError::OutOfRange {
                key: "editor.display_scale".to_string(),
                reason: format!("must be > 0, got {}", scale),
            });
        }

        let zoom = self.renderer.default_zoom;
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(SettingsError::OutOfRange {
                key: "renderer.default_zoom".to_string(),
                reason: format!("must be between {} and {}, got {}", MIN_ZOOM, MAX_ZOOM, zoom),
            });
        }

        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(SettingsError::OutOfRange {
                key: "storage.data_dir".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Board constants with the editor's display scale applied.
    pub fn effective_geometry(&self) -> GeometryConfig {
        GeometryConfig {
            display_scale: self.editor.display_scale,
            ..self.geometry.clone()
        }
    }

    /// Opens `table` with the configured geometry and snapping.
    pub fn open_editor(&self, table: Table, bus: Arc<EventBus>) -> TableEditor {
        let mut editor = TableEditor::with_bus(table, self.effective_geometry(), bus);
        editor.set_snap_enabled(self.editor.snap_enabled);
        editor
    }

    /// Read-only renderer at the configured zoom and style.
    pub fn renderer(&self) -> ReadOnlyRenderer {
        let mut renderer =
            ReadOnlyRenderer::new(self.effective_geometry(), self.renderer.style.clone());
        renderer.zoom_mut().set(self.renderer.default_zoom);
        renderer
    }
}
