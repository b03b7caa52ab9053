// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame detector — runs candidate building and selection for one frame and
// packages the outcome as a `DetectionResult`.

use scanwerk_core::config::DetectorConfig;
use scanwerk_core::types::{DetectionResult, LineSegment, Point};
use tracing::{debug, instrument};

use crate::detect::candidates::{CandidateSet, build_candidates, candidates_from_polygons};
use crate::detect::scorer::select_best;

/// Stateless per-frame detector.
///
/// Failures never surface as errors: a frame without a usable document
/// yields a result whose `quad` is `None`.
#[derive(Debug, Clone, Default)]
pub struct FrameDetector {
    config: DetectorConfig,
}

impl FrameDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect the document quad from line segments.
    #[instrument(level = "debug", skip(self, lines), fields(line_count = lines.len()))]
    pub fn process_frame(
        &self,
        lines: &[LineSegment],
        frame_width: u32,
        frame_height: u32,
    ) -> DetectionResult {
        let (w, h) = (frame_width as f64, frame_height as f64);
        let set = build_candidates(lines, w, h, &self.config);
        self.select(set, w, h)
    }

    /// Detect the document quad from contour polygons.
    #[instrument(level = "debug", skip(self, polygons), fields(polygon_count = polygons.len()))]
    pub fn process_polygons(
        &self,
        polygons: &[Vec<Point>],
        frame_width: u32,
        frame_height: u32,
    ) -> DetectionResult {
        let (w, h) = (frame_width as f64, frame_height as f64);
        let set = candidates_from_polygons(polygons, w, h, &self.config);
        self.select(set, w, h)
    }

    fn select(&self, set: CandidateSet, w: f64, h: f64) -> DetectionResult {
        match select_best(&set.candidates, w, h, &self.config) {
            Some((index, breakdown)) => {
                let quad = set.candidates[index].quad;
                debug!(score = breakdown.total, ?quad, "document quad selected");
                DetectionResult {
                    quad: Some(quad),
                    score: breakdown.total,
                    stats: set.stats,
                    breakdown: Some(breakdown),
                }
            }
            None => {
                debug!(
                    candidates = set.candidates.len(),
                    "no candidate cleared the threshold"
                );
                DetectionResult::empty(set.stats)
            }
        }
    }
}

/// Run detection with the default configuration.
pub fn process_frame(lines: &[LineSegment], frame_width: u32, frame_height: u32) -> DetectionResult {
    FrameDetector::default().process_frame(lines, frame_width, frame_height)
}
