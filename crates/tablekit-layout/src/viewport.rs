//! Zoom and pan between screen pixels and logical board units.
//!
//! Board and screen share orientation (+y down), so the mapping is a plain
//! scale plus translation:
//!
//! ```text
//! screen = board * zoom + pan
//! board  = (screen - pan) / zoom
//! ```

use tablekit_core::{Point, Rect, Size};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.2;

/// Display-only zoom between 0.5x and 2.0x in 0.2 steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomControl {
    level: f64,
}

impl Default for ZoomControl {
    fn default() -> Self {
        Self { level: 1.0 }
    }
}

impl ZoomControl {
    pub fn new(level: f64) -> Self {
        let mut zoom = Self::default();
        zoom.set(level);
        zoom
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Sets the level, clamped into range. Non-finite values are ignored.
    pub fn set(&mut self, level: f64) {
        if level.is_finite() {
            self.level = round_step(level).clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set(self.level + ZOOM_STEP);
        self.level
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set(self.level - ZOOM_STEP);
        self.level
    }

    pub fn reset(&mut self) {
        self.level = 1.0;
    }

    pub fn can_zoom_in(&self) -> bool {
        self.level < MAX_ZOOM
    }

    pub fn can_zoom_out(&self) -> bool {
        self.level > MIN_ZOOM
    }

    /// `"120%"`
    pub fn percent_label(&self) -> String {
        format!("{:.0}%", self.level * 100.0)
    }
}

// Keeps repeated steps from drifting off one-decimal levels.
fn round_step(level: f64) -> f64 {
    (level * 10.0).round() / 10.0
}

/// Screen transform of the editor canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: ZoomControl,
    pan: Point,
    canvas: Size,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            zoom: ZoomControl::default(),
            pan: Point::zero(),
            canvas: Size::new(canvas_width, canvas_height),
        }
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas = Size::new(width, height);
    }

    pub fn zoom(&self) -> f64 {
        self.zoom.level()
    }

    pub fn zoom_control(&self) -> &ZoomControl {
        &self.zoom
    }

    pub fn zoom_control_mut(&mut self) -> &mut ZoomControl {
        &mut self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom.set(zoom);
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = Point::new(x, y);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = Point::new(self.pan.x + dx, self.pan.y + dy);
    }

    pub fn reset(&mut self) {
        self.zoom.reset();
        self.pan = Point::zero();
    }

    /// Converts a pointer position in canvas pixels to board units.
    pub fn screen_to_board(&self, screen: Point) -> Point {
        let z = self.zoom();
        Point::new((screen.x - self.pan.x) / z, (screen.y - self.pan.y) / z)
    }

    pub fn board_to_screen(&self, board: Point) -> Point {
        board.scaled(self.zoom()) + self.pan
    }

    /// Screen rectangle of a board rectangle.
    pub fn board_rect_to_screen(&self, rect: &Rect) -> Rect {
        rect.scaled(self.zoom()).translated(self.pan)
    }

    /// Centres `board` in the canvas at the largest zoom step that fits.
    pub fn fit_to_board(&mut self, board: Size) {
        if !board.is_positive() || !self.canvas.is_positive() {
            return;
        }
        let fit = (self.canvas.width / board.width).min(self.canvas.height / board.height);
        // round down to a step so the board is never cropped
        let stepped = (fit * 10.0).floor() / 10.0;
        self.zoom.set(stepped);
        let z = self.zoom();
        self.pan = Point::new(
            (self.canvas.width - board.width * z) / 2.0,
            (self.canvas.height - board.height * z) / 2.0,
        );
    }
}
