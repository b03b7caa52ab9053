// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quad candidate building — turns raw line segments (or contour polygons)
// into convex four-corner hypotheses.

use scanwerk_core::config::DetectorConfig;
use scanwerk_core::types::{DetectionStats, LineSegment, Point, Quad};
use tracing::{debug, trace};

use crate::geometry::{intersect, is_convex, order_corners};

/// Angle bands (degrees, applied to `|angle|`) used to split segments into
/// horizontal-like and vertical-like classes.
#[derive(Debug, Clone, Copy)]
struct OrientationBands {
    /// Horizontal-like when `|angle| < near` or `|angle| > 180 - near`.
    horizontal_near: f64,
    /// Vertical-like when `vertical_min < |angle| < vertical_max`.
    vertical_min: f64,
    vertical_max: f64,
}

const STRICT_BANDS: OrientationBands = OrientationBands {
    horizontal_near: 30.0,
    vertical_min: 60.0,
    vertical_max: 120.0,
};

const RELAXED_BANDS: OrientationBands = OrientationBands {
    horizontal_near: 40.0,
    vertical_min: 50.0,
    vertical_max: 130.0,
};

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateSource {
    /// Four intersecting segments.
    LinePairs {
        top: LineSegment,
        bottom: LineSegment,
        left: LineSegment,
        right: LineSegment,
    },
    /// A polygon reported by a contour source (index into its input list).
    Polygon { index: usize },
}

/// A convex quad hypothesis awaiting scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCandidate {
    pub quad: Quad,
    pub source: CandidateSource,
}

/// Candidates for one frame plus the counters reported with the result.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub candidates: Vec<QuadCandidate>,
    pub stats: DetectionStats,
}

/// Build quad candidates from line segments in a `frame_width x frame_height`
/// frame.
///
/// An empty candidate list is the normal outcome when fewer than two lines
/// exist in either orientation class.
pub fn build_candidates(
    lines: &[LineSegment],
    frame_width: f64,
    frame_height: f64,
    config: &DetectorConfig,
) -> CandidateSet {
    let (mut horizontal, mut vertical) = classify(lines, STRICT_BANDS);
    if horizontal.len() < 2 || vertical.len() < 2 {
        debug!(
            horizontal = horizontal.len(),
            vertical = vertical.len(),
            "too few lines in strict bands; relaxing"
        );
        (horizontal, vertical) = classify(lines, RELAXED_BANDS);
    }

    let mut stats = DetectionStats {
        candidates_considered: 0,
        lines_horizontal: horizontal.len(),
        lines_vertical: vertical.len(),
    };
    if horizontal.len() < 2 || vertical.len() < 2 {
        return CandidateSet {
            candidates: Vec::new(),
            stats,
        };
    }

    let keep = config.max_lines_per_orientation;
    horizontal.sort_by(|a, b| b.length.total_cmp(&a.length));
    vertical.sort_by(|a, b| b.length.total_cmp(&a.length));
    horizontal.truncate(keep);
    vertical.truncate(keep);

    let horizontal_pairs = ordered_pairs(&horizontal, |s| s.midpoint().y);
    let vertical_pairs = ordered_pairs(&vertical, |s| s.midpoint().x);

    let mut candidates = Vec::new();
    for &(top, bottom) in &horizontal_pairs {
        for &(left, right) in &vertical_pairs {
            stats.candidates_considered += 1;
            let Some(corners) = corners_of(&top, &bottom, &left, &right) else {
                trace!("near-parallel pair; hypothesis dropped");
                continue;
            };
            if !corners
                .iter()
                .all(|p| within_frame(p, frame_width, frame_height, config.bounds_tolerance_px))
            {
                trace!(?corners, "corner outside frame; hypothesis dropped");
                continue;
            }
            if !is_convex(&corners) {
                trace!(?corners, "non-convex hypothesis dropped");
                continue;
            }
            candidates.push(QuadCandidate {
                quad: Quad::new(corners),
                source: CandidateSource::LinePairs {
                    top,
                    bottom,
                    left,
                    right,
                },
            });
        }
    }

    debug!(
        considered = stats.candidates_considered,
        kept = candidates.len(),
        "line-pair candidates built"
    );
    CandidateSet { candidates, stats }
}

/// Turn contour polygons into candidates. Only four-point polygons that are
/// finite, inside the frame tolerance, and convex once ordered survive.
pub fn candidates_from_polygons(
    polygons: &[Vec<Point>],
    frame_width: f64,
    frame_height: f64,
    config: &DetectorConfig,
) -> CandidateSet {
    let candidates: Vec<QuadCandidate> = polygons
        .iter()
        .enumerate()
        .filter_map(|(index, polygon)| {
            let corners: [Point; 4] = polygon.as_slice().try_into().ok()?;
            if !corners.iter().all(|p| {
                p.is_finite()
                    && within_frame(p, frame_width, frame_height, config.bounds_tolerance_px)
            }) {
                return None;
            }
            let ordered = order_corners(corners);
            is_convex(&ordered).then(|| QuadCandidate {
                quad: Quad::new(ordered),
                source: CandidateSource::Polygon { index },
            })
        })
        .collect();

    debug!(
        polygons = polygons.len(),
        kept = candidates.len(),
        "polygon candidates built"
    );
    CandidateSet {
        candidates,
        stats: DetectionStats {
            candidates_considered: polygons.len(),
            ..DetectionStats::default()
        },
    }
}

fn classify(lines: &[LineSegment], bands: OrientationBands) -> (Vec<LineSegment>, Vec<LineSegment>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();

    for line in lines {
        let angle = line.angle.abs();
        if angle < bands.horizontal_near || angle > 180.0 - bands.horizontal_near {
            horizontal.push(*line);
        } else if angle > bands.vertical_min && angle < bands.vertical_max {
            vertical.push(*line);
        }
    }

    (horizontal, vertical)
}

/// Every unordered pair of lines, each pair ordered so that the first has
/// the smaller `key` (the top or left line).
fn ordered_pairs(
    lines: &[LineSegment],
    key: impl Fn(&LineSegment) -> f64,
) -> Vec<(LineSegment, LineSegment)> {
    let mut pairs = Vec::new();
    for (i, a) in lines.iter().enumerate() {
        for b in &lines[i + 1..] {
            if key(a) <= key(b) {
                pairs.push((*a, *b));
            } else {
                pairs.push((*b, *a));
            }
        }
    }
    pairs
}

/// Corners in top-left, top-right, bottom-right, bottom-left order.
fn corners_of(
    top: &LineSegment,
    bottom: &LineSegment,
    left: &LineSegment,
    right: &LineSegment,
) -> Option<[Point; 4]> {
    Some([
        intersect(top, left)?,
        intersect(top, right)?,
        intersect(bottom, right)?,
        intersect(bottom, left)?,
    ])
}

fn within_frame(p: &Point, width: f64, height: f64, tolerance: f64) -> bool {
    p.x >= -tolerance && p.x <= width + tolerance && p.y >= -tolerance && p.y <= height + tolerance
}
