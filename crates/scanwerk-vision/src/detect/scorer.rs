// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quad scoring and selection.
//
// Each candidate gets a weighted score from its shape (rectangularity,
// aspect, opposite-side consistency), its size relative to the frame, and its
// position. Hard rejections score exactly zero.

use scanwerk_core::config::{DetectorConfig, ValidityGate};
use scanwerk_core::types::{Quad, ScoreBreakdown};
use tracing::trace;

use crate::detect::candidates::QuadCandidate;
use crate::geometry::{interior_angles, quad_area, side_lengths};

const WEIGHT_RECTANGULARITY: f64 = 0.40;
const WEIGHT_AREA: f64 = 0.30;
const WEIGHT_ASPECT: f64 = 0.10;
const WEIGHT_SIDES: f64 = 0.10;
const WEIGHT_CENTER: f64 = 0.10;

/// Slack on the area bounds so a quad at exactly the configured percentage
/// is not lost to rounding.
const AREA_EPSILON: f64 = 1e-9;

/// Total angle deviation (degrees) at which rectangularity reaches zero.
const DEVIATION_SCALE: f64 = 80.0;

/// Long/short ratios typical of paper in either orientation.
const DOCUMENT_ASPECT_MIN: f64 = 1.1;
const DOCUMENT_ASPECT_MAX: f64 = 1.8;
/// Score for near-square outlines.
const SQUARE_ASPECT_SCORE: f64 = 0.8;
/// Score at `max_aspect_ratio`.
const ELONGATED_ASPECT_FLOOR: f64 = 0.2;

/// Shape-only scores of a quad that passed a `ValidityGate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeScores {
    pub rectangularity: f64,
    pub aspect: f64,
    pub side_consistency: f64,
}

/// Score the shape of `quad`, or `None` if it fails any gate threshold.
pub fn shape_scores(quad: &Quad, gate: &ValidityGate) -> Option<ShapeScores> {
    let angles = interior_angles(quad);
    let mut total_deviation = 0.0;
    for angle in angles {
        let deviation = (angle - 90.0).abs();
        if deviation > gate.max_angle_deviation {
            trace!(angle, "interior angle out of range");
            return None;
        }
        total_deviation += deviation;
    }
    let rectangularity = (1.0 - total_deviation / DEVIATION_SCALE).max(0.0);
    if rectangularity < gate.min_rectangularity {
        trace!(rectangularity, "not rectangular enough");
        return None;
    }

    let [top, right, bottom, left] = side_lengths(quad);
    if [top, right, bottom, left].iter().any(|&side| side <= 0.0) {
        return None;
    }
    let horizontal_consistency = top.min(bottom) / top.max(bottom);
    let vertical_consistency = left.min(right) / left.max(right);
    if horizontal_consistency < gate.min_side_consistency
        || vertical_consistency < gate.min_side_consistency
    {
        trace!(
            horizontal_consistency,
            vertical_consistency,
            "opposite sides differ too much"
        );
        return None;
    }

    let width = (top + bottom) / 2.0;
    let height = (left + right) / 2.0;
    let ratio = width.max(height) / width.min(height);
    if ratio > gate.max_aspect_ratio {
        trace!(ratio, "too elongated");
        return None;
    }

    Some(ShapeScores {
        rectangularity,
        aspect: aspect_score(ratio, gate.max_aspect_ratio),
        side_consistency: (horizontal_consistency + vertical_consistency) / 2.0,
    })
}

fn aspect_score(ratio: f64, max_ratio: f64) -> f64 {
    if ratio < DOCUMENT_ASPECT_MIN {
        SQUARE_ASPECT_SCORE
    } else if ratio <= DOCUMENT_ASPECT_MAX {
        1.0
    } else {
        let span = max_ratio - DOCUMENT_ASPECT_MAX;
        let t = ((ratio - DOCUMENT_ASPECT_MAX) / span).clamp(0.0, 1.0);
        1.0 - t * (1.0 - ELONGATED_ASPECT_FLOOR)
    }
}

/// Score a quad inside a `frame_width x frame_height` frame.
pub fn score_quad(
    quad: &Quad,
    frame_width: f64,
    frame_height: f64,
    config: &DetectorConfig,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();

    let frame_area = frame_width * frame_height;
    if frame_area.is_nan() || frame_area <= 0.0 || !quad.is_finite() {
        return breakdown;
    }

    let area_fraction = quad_area(quad) / frame_area;
    breakdown.area = area_fraction;
    if area_fraction + AREA_EPSILON < config.min_area_percent / 100.0
        || area_fraction - AREA_EPSILON > config.max_area_percent / 100.0
    {
        trace!(area_fraction, "area out of range");
        return breakdown;
    }

    let Some(shape) = shape_scores(quad, &config.gate()) else {
        return breakdown;
    };
    breakdown.rectangularity = shape.rectangularity;
    breakdown.aspect = shape.aspect;
    breakdown.side_consistency = shape.side_consistency;

    let centroid = quad.centroid();
    let half_diagonal = frame_width.hypot(frame_height) / 2.0;
    let offset = (centroid.x - frame_width / 2.0).hypot(centroid.y - frame_height / 2.0);
    breakdown.center = (1.0 - offset / half_diagonal).clamp(0.0, 1.0);

    if near_border(quad, frame_width, frame_height, config.edge_margin_px) {
        breakdown.edge_penalty = config.edge_penalty;
    }

    let weighted = WEIGHT_RECTANGULARITY * breakdown.rectangularity
        + WEIGHT_AREA * breakdown.area
        + WEIGHT_ASPECT * breakdown.aspect
        + WEIGHT_SIDES * breakdown.side_consistency
        + WEIGHT_CENTER * breakdown.center;
    breakdown.total = (weighted - breakdown.edge_penalty).max(0.0);
    breakdown
}

fn near_border(quad: &Quad, frame_width: f64, frame_height: f64, margin: f64) -> bool {
    quad.corners.iter().any(|p| {
        p.x < margin || p.y < margin || p.x > frame_width - margin || p.y > frame_height - margin
    })
}

/// Pick the best-scoring candidate at or above `config.min_score`.
///
/// Ties keep the earliest candidate. Returns its index and score breakdown.
pub fn select_best(
    candidates: &[QuadCandidate],
    frame_width: f64,
    frame_height: f64,
    config: &DetectorConfig,
) -> Option<(usize, ScoreBreakdown)> {
    let mut best: Option<(usize, ScoreBreakdown)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let breakdown = score_quad(&candidate.quad, frame_width, frame_height, config);
        trace!(index, total = breakdown.total, "candidate scored");
        if best.is_none_or(|(_, current)| breakdown.total > current.total) {
            best = Some((index, breakdown));
        }
    }
    best.filter(|(_, breakdown)| breakdown.total > 0.0 && breakdown.total >= config.min_score)
}
