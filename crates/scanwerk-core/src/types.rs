// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk scanning engine.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// A point in image space (pixels, origin top-left, y pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A straight line segment reported by a line source.
///
/// `angle` (degrees, `-180..=180`) and `length` are derived from the
/// endpoints when the segment is created and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub p1: Point,
    pub p2: Point,
    pub angle: f64,
    pub length: f64,
}

impl LineSegment {
    pub fn new(p1: Point, p2: Point) -> Self {
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        Self {
            p1,
            p2,
            angle: dy.atan2(dx).to_degrees(),
            length: dx.hypot(dy),
        }
    }

    pub fn midpoint(&self) -> Point {
        Point::new((self.p1.x + self.p2.x) / 2.0, (self.p1.y + self.p2.y) / 2.0)
    }
}

/// A four-cornered document outline.
///
/// Once normalized the corners are ordered top-left, top-right,
/// bottom-right, bottom-left. Quads built by the candidate builder are
/// always convex; quads coming from outside the engine must be validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Build a quad from an arbitrary point list, rejecting anything that is
    /// not exactly four finite points. Corner order is left untouched.
    pub fn try_from_points(points: &[Point]) -> Result<Self> {
        let corners: [Point; 4] = points.try_into().map_err(|_| {
            ScanError::InvalidQuad(format!("expected 4 corners, got {}", points.len()))
        })?;
        let quad = Self { corners };
        if !quad.is_finite() {
            return Err(ScanError::InvalidQuad(
                "corner coordinates must be finite".into(),
            ));
        }
        Ok(quad)
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    pub fn is_finite(&self) -> bool {
        self.corners.iter().all(Point::is_finite)
    }

    /// Arithmetic mean of the four corners.
    pub fn centroid(&self) -> Point {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }
}

/// Per-factor scores of a quad candidate, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rectangularity: f64,
    pub area: f64,
    pub aspect: f64,
    pub side_consistency: f64,
    pub center: f64,
    pub edge_penalty: f64,
    /// Weighted sum; exactly 0 when any hard rejection rule fired.
    pub total: f64,
}

/// Counters describing the work done for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectionStats {
    pub candidates_considered: usize,
    pub lines_horizontal: usize,
    pub lines_vertical: usize,
}

/// Outcome of running the detector on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub quad: Option<Quad>,
    pub score: f64,
    pub stats: DetectionStats,
    /// Score factors of the selected quad, when there is one.
    pub breakdown: Option<ScoreBreakdown>,
}

impl DetectionResult {
    /// A result carrying no quad, as produced when nothing qualified.
    pub fn empty(stats: DetectionStats) -> Self {
        Self {
            quad: None,
            score: 0.0,
            stats,
            breakdown: None,
        }
    }
}

/// Lifecycle states of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingState {
    /// No document is being followed.
    #[default]
    Searching,
    /// A document is being followed but has not settled yet.
    Tracking,
    /// The document area has had low variance for the configured duration.
    Stable,
}

/// What the tracker reports after each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerOutput {
    pub smoothed_quad: Option<Quad>,
    /// Safe to capture: the tracker is `Stable` and this frame's detection
    /// was accepted. A missed frame reports `false` even while `state` is
    /// still `Stable`.
    pub stable: bool,
    pub state: TrackingState,
}

/// Geometry needed to unwarp a quad into an upright rectangle.
///
/// `destination` holds the output rectangle corners in the same order as
/// `source_quad`: `(0,0), (w,0), (w,h), (0,h)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectifiedPlan {
    pub source_quad: Quad,
    pub output_width: u32,
    pub output_height: u32,
    pub destination: [Point; 4],
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait orientation.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Pixel dimensions (width, height) at the given resolution.
    pub fn dimensions_px(&self, dpi: u32) -> (u32, u32) {
        let (w_mm, h_mm) = self.dimensions_mm();
        let to_px = |mm: u32| (mm as f64 * dpi as f64 / 25.4).round() as u32;
        (to_px(w_mm), to_px(h_mm))
    }
}
