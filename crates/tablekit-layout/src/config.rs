//! Board constants for every table type.
//!
//! `GeometryConfig` is the single source of truth for surface dimensions,
//! device footprints, snapping and accessory stacking distances. All values
//! are logical board units unless stated otherwise.

use serde::{Deserialize, Serialize};
use tablekit_core::GeometryError;

/// Logical board constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Full board width W. Back-to-back surfaces are W/2 each.
    pub board_width: f64,
    /// Height H of one surface.
    pub surface_height: f64,
    /// Vertical gap between the two free-standing surfaces.
    pub free_standing_gap: f64,
    /// Tolerance below the top free-standing surface that still counts as top.
    pub surface_margin: f64,
    /// Device footprint width before display scaling.
    pub device_width: f64,
    /// Device footprint height for short labels before display scaling.
    pub device_height: f64,
    pub snap_threshold: f64,
    /// Height added per extra label line.
    pub label_growth: f64,
    /// Name length above which the label wraps once.
    pub name_wrap_chars: usize,
    /// Name length above which the label wraps twice.
    pub name_second_wrap_chars: usize,
    /// Color length above which the color line wraps.
    pub color_wrap_chars: usize,
    pub accessory_base_height: f64,
    /// Distance between the parent's y and the first stacked accessory.
    pub accessory_first_gap: f64,
    pub accessory_gutter: f64,
    pub accessory_x_offset: f64,
    /// Padding added to the scaled image on each axis of an image board.
    pub image_padding: f64,
    pub slot_lane_x: f64,
    pub slot_lane_y: f64,
    pub slot_lane_step: f64,
    /// Device pixel ratio applied to footprints and the snap threshold.
    pub display_scale: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            board_width: 2000.0,
            surface_height: 505.0,
            free_standing_gap: 100.0,
            surface_margin: 50.0,
            device_width: 140.0,
            device_height: 40.0,
            snap_threshold: 15.0,
            label_growth: 15.0,
            name_wrap_chars: 15,
            name_second_wrap_chars: 30,
            color_wrap_chars: 20,
            accessory_base_height: 35.0,
            accessory_first_gap: 45.0,
            accessory_gutter: 5.0,
            accessory_x_offset: 5.0,
            image_padding: 200.0,
            slot_lane_x: 20.0,
            slot_lane_y: 20.0,
            slot_lane_step: 60.0,
            display_scale: 1.0,
        }
    }
}

impl GeometryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snap threshold after display scaling.
    pub fn scaled_snap_threshold(&self) -> f64 {
        self.snap_threshold * self.display_scale
    }

    /// Rejects dimensions that would make the board degenerate.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let positive = [
            ("board_width", self.board_width),
            ("surface_height", self.surface_height),
            ("device_width", self.device_width),
            ("device_height", self.device_height),
            ("accessory_base_height", self.accessory_base_height),
            ("display_scale", self.display_scale),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GeometryError::InvalidDimension {
                    name: name.to_string(),
                    value,
                });
            }
        }

        let non_negative = [
            ("free_standing_gap", self.free_standing_gap),
            ("surface_margin", self.surface_margin),
            ("snap_threshold", self.snap_threshold),
            ("label_growth", self.label_growth),
            ("accessory_first_gap", self.accessory_first_gap),
            ("accessory_gutter", self.accessory_gutter),
            ("image_padding", self.image_padding),
            ("slot_lane_step", self.slot_lane_step),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(GeometryError::InvalidDimension {
                    name: name.to_string(),
                    value,
                });
            }
        }

        if self.name_second_wrap_chars < self.name_wrap_chars {
            return Err(GeometryError::InvalidDimension {
                name: "name_second_wrap_chars".to_string(),
                value: self.name_second_wrap_chars as f64,
            });
        }

        Ok(())
    }
}
