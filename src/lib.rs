//! # TableKit
//!
//! Layout planning for retail display tables: devices are placed on one or
//! two table surfaces, accessories stack under their parent device, and
//! image boards carry price-tag slots over a reference photo.
//!
//! ## Architecture
//!
//! 1. **tablekit-core** - geometry primitives, errors, event bus
//! 2. **tablekit-layout** - geometry model, placement, attachments, slots, rendering
//! 3. **tablekit-store** - async persistence seams and background saves
//! 4. **tablekit-settings** - JSON/TOML configuration
//! 5. **tablekit** - this crate: logging setup and the `tablekit` CLI

pub use tablekit_core::{
    event_bus, AppEvent, EditorEvent, Error, EventBus, Notification, NotificationLevel, Point,
    Rect, Result, Size, StorageEvent,
};
pub use tablekit_layout::{
    render_svg, Device, GeometryConfig, Issue, MissingDeviceMatcher, ReadOnlyRenderer,
    RenderScene, RenderStyle, Slot, Table, TableEditor, TableGeometry, TableType,
};
pub use tablekit_settings::Config;
pub use tablekit_store::{JsonDirectoryStore, MemoryBackend, TableSync};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date and time, set by build.rs
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with tracing
///
/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
