//! Label-driven device sizing.
//!
//! Device boxes grow vertically when their name or color label would wrap.
//! The rule is a pure function of the label text so it can be swapped
//! without touching placement or stacking.

use tablekit_core::Size;

use crate::config::GeometryConfig;
use crate::model::Device;

/// Number of extra label lines for a name and optional color.
pub fn label_growth_steps(name: &str, color: Option<&str>, config: &GeometryConfig) -> u32 {
    let name_len = name.chars().count();
    let mut steps = 0;
    if name_len > config.name_wrap_chars {
        steps += 1;
    }
    if name_len > config.name_second_wrap_chars {
        steps += 1;
    }
    if color.is_some_and(|c| c.chars().count() > config.color_wrap_chars) {
        steps += 1;
    }
    steps
}

/// Unscaled height of a device box: `(name, color) -> height`.
pub fn label_height(name: &str, color: Option<&str>, config: &GeometryConfig) -> f64 {
    config.device_height + label_growth_steps(name, color, config) as f64 * config.label_growth
}

/// Footprint used for clamping, snapping and hit-testing, after display scaling.
pub fn device_footprint(device: &Device, config: &GeometryConfig) -> Size {
    Size::new(
        config.device_width * config.display_scale,
        label_height(&device.name, device.color.as_deref(), config) * config.display_scale,
    )
}

/// Vertical space one accessory reserves in a stack, gutter included.
pub fn accessory_slot_height(device: &Device, config: &GeometryConfig) -> f64 {
    config.accessory_base_height
        + label_growth_steps(&device.name, device.color.as_deref(), config) as f64
            * config.label_growth
        + config.accessory_gutter
}
