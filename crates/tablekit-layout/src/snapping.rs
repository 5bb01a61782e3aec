//! Edge snapping for dragged devices.
//!
//! Each axis snaps independently. Targets are scanned in device order and
//! the first one within the threshold of the unclamped candidate wins, not
//! the nearest. A position already exactly aligned with a target is left
//! alone, so snapping a snapped position again is a no-op.

use serde::Serialize;
use tablekit_core::{Point, Rect};

/// Axis a guide line is perpendicular to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Vertical line at a fixed x.
    X,
    /// Horizontal line at a fixed y.
    Y,
}

/// An active alignment guide, in global board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuideLine {
    pub axis: Axis,
    pub from: Point,
    pub to: Point,
}

impl GuideLine {
    /// Guide spanning `surface` at a surface-local edge coordinate.
    pub fn across(axis: Axis, local_edge: f64, surface: &Rect) -> Self {
        match axis {
            Axis::X => {
                let x = surface.left() + local_edge;
                Self {
                    axis,
                    from: Point::new(x, surface.top()),
                    to: Point::new(x, surface.bottom()),
                }
            }
            Axis::Y => {
                let y = surface.top() + local_edge;
                Self {
                    axis,
                    from: Point::new(surface.left(), y),
                    to: Point::new(surface.right(), y),
                }
            }
        }
    }
}

/// Result of snapping one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSnap {
    pub position: f64,
    /// Edge coordinate that was aligned to, if any.
    pub target: Option<f64>,
}

/// Edge coordinates of neighbouring devices on one surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapTargets {
    /// Left and right edges, neighbour by neighbour.
    pub x: Vec<f64>,
    /// Top and bottom edges, neighbour by neighbour.
    pub y: Vec<f64>,
}

impl SnapTargets {
    /// Collects targets from neighbour rectangles (surface-local).
    pub fn from_rects<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Self {
        let mut targets = Self::default();
        for rect in rects {
            targets.x.push(rect.left());
            targets.x.push(rect.right());
            targets.y.push(rect.top());
            targets.y.push(rect.bottom());
        }
        targets
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty()
    }
}

const ALIGNED_EPSILON: f64 = 1e-9;

/// Snaps an unclamped candidate on one axis.
///
/// `extent` is the dragged device's size on the axis and `max` the largest
/// in-bounds position. Distances are measured from `candidate` as given; a
/// target can be met by the leading edge (`position = t`) or the trailing
/// edge (`position = t - extent`), and snaps that would leave `[0, max]`
/// are skipped. Without a match the candidate clamped into `[0, max]` is
/// returned.
pub fn snap_axis(candidate: f64, extent: f64, max: f64, targets: &[f64], threshold: f64) -> AxisSnap {
    let in_bounds = |p: f64| p >= 0.0 && p <= max;

    for &t in targets {
        for aligned in [t, t - extent] {
            if (candidate - aligned).abs() <= ALIGNED_EPSILON && in_bounds(aligned) {
                return AxisSnap {
                    position: aligned,
                    target: Some(t),
                };
            }
        }
    }

    for &t in targets {
        for aligned in [t, t - extent] {
            if in_bounds(aligned) && (candidate - aligned).abs() <= threshold {
                return AxisSnap {
                    position: aligned,
                    target: Some(t),
                };
            }
        }
    }

    AxisSnap {
        position: candidate.clamp(0.0, max.max(0.0)),
        target: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        // neighbours at x=100 and x=250, width 140
        let targets = [100.0, 240.0, 250.0, 390.0];
        let snap = snap_axis(96.0, 140.0, 1860.0, &targets, 15.0);
        assert_eq!(snap.position, 100.0);
        assert_eq!(snap.target, Some(100.0));
    }

    #[test]
    fn test_order_beats_distance() {
        // 110 is first and within the threshold even though 100 is closer to 101
        let snap = snap_axis(101.0, 140.0, 1860.0, &[110.0, 100.0], 15.0);
        assert_eq!(snap.position, 110.0);
    }

    #[test]
    fn test_trailing_edge_alignment() {
        // right edge 96 + 140 = 236 meets a left edge at 240
        let snap = snap_axis(96.0, 140.0, 1860.0, &[240.0], 15.0);
        assert_eq!(snap.position, 100.0);
        assert_eq!(snap.target, Some(240.0));
    }

    #[test]
    fn test_no_target_in_range() {
        let snap = snap_axis(500.0, 140.0, 1860.0, &[100.0, 240.0], 15.0);
        assert_eq!(snap, AxisSnap { position: 500.0, target: None });
    }

    #[test]
    fn test_out_of_bounds_snap_skipped() {
        // aligning the leading edge to 1870 would exceed max 1860
        let snap = snap_axis(1860.0, 140.0, 1860.0, &[1870.0], 15.0);
        assert_eq!(snap.position, 1860.0);
        assert_eq!(snap.target, None);
    }

    #[test]
    fn test_distance_measured_before_clamping() {
        // neighbour left edge at 5; -30 is 35 away, so the clamp wins
        let far = snap_axis(-30.0, 140.0, 1860.0, &[5.0, 145.0], 15.0);
        assert_eq!(far, AxisSnap { position: 0.0, target: None });

        let near = snap_axis(-8.0, 140.0, 1860.0, &[5.0, 145.0], 15.0);
        assert_eq!(near, AxisSnap { position: 5.0, target: Some(5.0) });

        let past_end = snap_axis(2100.0, 140.0, 1860.0, &[1850.0], 15.0);
        assert_eq!(past_end.position, 1860.0);
        assert_eq!(past_end.target, None);
    }

    #[test]
    fn test_exact_alignment_is_fixed_point() {
        let targets = [114.0, 100.0];
        let first = snap_axis(96.0, 140.0, 1860.0, &targets, 15.0);
        assert_eq!(first.position, 100.0);
        let second = snap_axis(first.position, 140.0, 1860.0, &targets, 15.0);
        assert_eq!(second.position, 100.0);
    }

    #[test]
    fn test_guide_across_surface() {
        let surface = Rect::new(1000.0, 0.0, 1000.0, 505.0);
        let guide = GuideLine::across(Axis::X, 100.0, &surface);
        assert_eq!(guide.from, Point::new(1100.0, 0.0));
        assert_eq!(guide.to, Point::new(1100.0, 505.0));
    }
}
