//! Settings failures.

use std::io;
use tablekit_core::GeometryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// A value is out of range; `key` is the dotted path, e.g. `editor.display_scale`.
    #[error("Setting {key} {reason}")]
    OutOfRange { key: String, reason: String },

    /// The file extension is neither `.json` nor `.toml`.
    #[error("Config files must be .json or .toml, not {0}")]
    UnsupportedFormat(String),

    #[error("No config directory: {0}")]
    ConfigDirectory(String),

    /// Board constants are out of range.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Config file I/O: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Cannot encode TOML config: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}

impl From<SettingsError> for tablekit_core::Error {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Geometry(e) => tablekit_core::Error::Geometry(e),
            SettingsError::Io(e) => tablekit_core::Error::Io(e),
            SettingsError::Json(e) => tablekit_core::Error::Json(e),
            other => tablekit_core::Error::other(other.to_string()),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SettingsError::OutOfRange {
            key: "renderer.default_zoom".to_string(),
            reason: "must be between 0.5 and 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Setting renderer.default_zoom must be between 0.5 and 2"
        );
        assert_eq!(
            SettingsError::UnsupportedFormat("yaml".to_string()).to_string(),
            "Config files must be .json or .toml, not yaml"
        );
    }

    #[test]
    fn test_into_core_error() {
        let missing: SettingsError = io::Error::from(io::ErrorKind::NotFound).into();
        assert!(matches!(
            tablekit_core::Error::from(missing),
            tablekit_core::Error::Io(_)
        ));

        let geometry = SettingsError::Geometry(GeometryError::InvalidDimension {
            name: "board_width".to_string(),
            value: 0.0,
        });
        assert!(matches!(
            tablekit_core::Error::from(geometry),
            tablekit_core::Error::Geometry(_)
        ));

        let format: tablekit_core::Error = SettingsError::UnsupportedFormat("ini".to_string()).into();
        assert!(matches!(format, tablekit_core::Error::Other(_)));
    }
}
