//! Table documents: tables, placed devices and image-board slots.
//!
//! The serde shapes match the stored JSON documents. Device and slot
//! records use the camelCase keys of existing data (`attachedToDevice`,
//! `deviceId`); table records use the snake_case column names.
//! Malformed positions load as `(0, 0)` and malformed quantities as `1`
//! so a damaged record never prevents a table from rendering.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tablekit_core::{Point, Size};

/// Substrings (lower-case) that mark a device as an accessory.
pub const ACCESSORY_KEYWORDS: [&str; 4] = ["accessori", "pencil", "keyboard", "case"];

/// Physical layout of a display table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TableType {
    /// One surface.
    #[default]
    Single,
    /// Two half-width surfaces side by side.
    BackToBackDouble,
    /// Two full-width surfaces stacked vertically.
    FreeStandingDouble,
    /// A board sized from an uploaded reference image.
    ImageBoard,
    /// A stored value this engine does not understand.
    Unsupported(String),
}

impl TableType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Single => "single",
            Self::BackToBackDouble => "double_back_to_back",
            Self::FreeStandingDouble => "double_free_standing",
            Self::ImageBoard => "image_board",
            Self::Unsupported(raw) => raw,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    pub fn surface_count(&self) -> usize {
        match self {
            Self::Single | Self::ImageBoard => 1,
            Self::BackToBackDouble | Self::FreeStandingDouble => 2,
            Self::Unsupported(_) => 0,
        }
    }
}

impl From<String> for TableType {
    fn from(value: String) -> Self {
        let key = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "single" | "single_table" => Self::Single,
            "double_back_to_back" | "back_to_back" | "back_to_back_double" => {
                Self::BackToBackDouble
            }
            "double_free_standing" | "free_standing" | "free_standing_double" => {
                Self::FreeStandingDouble
            }
            "image_board" | "image" | "custom_image" => Self::ImageBoard,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<TableType> for String {
    fn from(value: TableType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "Single"),
            Self::BackToBackDouble => write!(f, "Back-to-back double"),
            Self::FreeStandingDouble => write!(f, "Free-standing double"),
            Self::ImageBoard => write!(f, "Image board"),
            Self::Unsupported(raw) => write!(f, "Unsupported ({})", raw),
        }
    }
}

/// A placed product or accessory instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Product family used for color-coding and accessory detection.
    #[serde(default, alias = "type")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_quantity", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    /// Global board position of the top-left corner.
    #[serde(default, deserialize_with = "lenient_position")]
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    /// Parent device id for attached accessories.
    #[serde(
        default,
        rename = "attachedToDevice",
        skip_serializing_if = "Option::is_none"
    )]
    pub attached_to: Option<String>,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            color: None,
            quantity: 1,
            position: Point::zero(),
            catalog_id: None,
            attached_to: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// True when the name or category carries an accessory keyword.
    pub fn is_accessory(&self) -> bool {
        let name = self.name.to_lowercase();
        let category = self.category.to_lowercase();
        ACCESSORY_KEYWORDS
            .iter()
            .any(|k| name.contains(k) || category.contains(k))
    }

    /// True when this device follows a parent.
    pub fn is_attached(&self) -> bool {
        self.attached_to.is_some()
    }

    /// `"Name (Color)"` or just the name.
    pub fn label(&self) -> String {
        match self.color.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(color) => format!("{} ({})", self.name, color),
            None => self.name.clone(),
        }
    }
}

/// Image-board marker binding a logical position to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    /// Logical board position; independent of zoom and pan.
    #[serde(default, deserialize_with = "lenient_position")]
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Slot {
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            device_id: None,
        }
    }
}

/// A display table and everything placed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub table_type: TableType,
    /// Render order is irrelevant; accessory stacking follows this order.
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_image_scale")]
    pub image_scale: f64,
    /// Natural pixel size of the uploaded image, recorded at upload time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_natural_size: Option<Size>,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(id: impl Into<String>, name: impl Into<String>, table_type: TableType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            table_type,
            devices: Vec::new(),
            image_url: None,
            image_scale: default_image_scale(),
            image_natural_size: None,
            slots: Vec::new(),
        }
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn device_mut(&mut self, id: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    pub fn device_index(&self, id: &str) -> Option<usize> {
        self.devices.iter().position(|d| d.id == id)
    }

    /// Accessories attached to `parent_id`, in stacking order.
    pub fn accessories_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a Device> + 'a {
        self.devices
            .iter()
            .filter(move |d| d.attached_to.as_deref() == Some(parent_id))
    }

    pub fn has_accessories(&self, id: &str) -> bool {
        self.accessories_of(id).next().is_some()
    }

    /// Devices that position themselves (no parent).
    pub fn independent_devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| !d.is_attached())
    }

    pub fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn slot_mut(&mut self, id: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }

    /// The persisted subset of this table.
    pub fn to_update(&self) -> TableUpdate {
        TableUpdate {
            devices: self.devices.clone(),
            slots: self.slots.clone(),
            image_url: self.image_url.clone(),
            image_scale: self.image_scale,
            image_natural_size: self.image_natural_size,
        }
    }

    /// Overwrites the persisted fields with `update`.
    pub fn apply_update(&mut self, update: TableUpdate) {
        self.devices = update.devices;
        self.slots = update.slots;
        self.image_url = update.image_url;
        self.image_scale = update.image_scale;
        self.image_natural_size = update.image_natural_size;
    }
}

/// Per-table update document: `{devices, slots, image_url, image_scale}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableUpdate {
    pub devices: Vec<Device>,
    pub slots: Vec<Slot>,
    pub image_url: Option<String>,
    pub image_scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_natural_size: Option<Size>,
}

fn default_quantity() -> u32 {
    1
}

fn default_image_scale() -> f64 {
    1.0
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn lenient_position<'de, D>(deserializer: D) -> Result<Point, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let x = value.get("x").and_then(number);
    let y = value.get("y").and_then(number);
    Ok(match (x, y) {
        (Some(x), Some(y)) => Point::new(x, y),
        _ => {
            tracing::debug!("Malformed position {} defaulted to origin", value);
            Point::zero()
        }
    })
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let quantity = number(&value).unwrap_or(1.0).floor();
    Ok(if quantity < 1.0 {
        1
    } else {
        quantity.min(u32::MAX as f64) as u32
    })
}
