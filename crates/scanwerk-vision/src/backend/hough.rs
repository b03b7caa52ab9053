// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hough line source — blur, Canny edges, then a Hough transform. Each polar
// line is clipped to the frame and reported as a segment.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::hough::{LineDetectionOptions, PolarLine, detect_lines};
use scanwerk_bridge::traits::LineSource;
use scanwerk_core::error::Result;
use scanwerk_core::types::{LineSegment, Point};
use tracing::{debug, instrument, warn};

/// Line extraction with `imageproc`'s Hough transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughLineSource {
    /// Gaussian blur sigma applied before edge detection.
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Votes required per line, as a fraction of the shorter frame side.
    pub vote_fraction: f64,
    /// Lower bound on the vote threshold for small frames.
    pub min_votes: u32,
    /// Radius (in accumulator cells) of non-maximum suppression.
    pub suppression_radius: u32,
}

impl Default for HoughLineSource {
    fn default() -> Self {
        Self {
            blur_sigma: 2.0,
            canny_low: 50.0,
            canny_high: 150.0,
            vote_fraction: 0.15,
            min_votes: 80,
            suppression_radius: 8,
        }
    }
}

impl HoughLineSource {
    fn vote_threshold(&self, width: u32, height: u32) -> u32 {
        let short_side = width.min(height) as f64;
        ((short_side * self.vote_fraction) as u32).max(self.min_votes)
    }
}

impl LineSource for HoughLineSource {
    fn name(&self) -> &str {
        "hough"
    }

    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    fn detect_lines(&self, frame: &GrayImage) -> Result<Vec<LineSegment>> {
        let (w, h) = frame.dimensions();
        if w < 3 || h < 3 {
            warn!("Frame too small for edge detection");
            return Ok(Vec::new());
        }

        let blurred = gaussian_blur_f32(frame, self.blur_sigma);
        let edges = canny(&blurred, self.canny_low, self.canny_high);

        let vote_threshold = self.vote_threshold(w, h);
        let options = LineDetectionOptions {
            vote_threshold,
            suppression_radius: self.suppression_radius,
        };
        let polar = detect_lines(&edges, options);

        let segments: Vec<LineSegment> = polar
            .iter()
            .filter_map(|line| polar_to_segment(line, w as f64, h as f64))
            .collect();
        debug!(
            polar = polar.len(),
            segments = segments.len(),
            vote_threshold,
            "Hough lines detected"
        );
        Ok(segments)
    }
}

/// Clip the polar line `x·cos θ + y·sin θ = r` to a `width x height` frame.
///
/// Returns `None` when the line misses the frame or only touches a corner.
pub fn polar_to_segment(line: &PolarLine, width: f64, height: f64) -> Option<LineSegment> {
    const EPS: f64 = 1e-6;
    let theta = (line.angle_in_degrees as f64).to_radians();
    let (sin, cos) = theta.sin_cos();
    let r = line.r as f64;

    let mut hits: Vec<Point> = Vec::with_capacity(4);
    if sin.abs() > EPS {
        hits.push(Point::new(0.0, r / sin));
        hits.push(Point::new(width, (r - width * cos) / sin));
    }
    if cos.abs() > EPS {
        hits.push(Point::new(r / cos, 0.0));
        hits.push(Point::new((r - height * sin) / cos, height));
    }
    hits.retain(|p| {
        p.is_finite() && p.x >= -EPS && p.x <= width + EPS && p.y >= -EPS && p.y <= height + EPS
    });

    let mut best: Option<(Point, Point, f64)> = None;
    for (i, a) in hits.iter().enumerate() {
        for b in &hits[i + 1..] {
            let d = a.distance_to(b);
            if best.is_none_or(|(_, _, current)| d > current) {
                best = Some((*a, *b, d));
            }
        }
    }

    let (a, b, length) = best?;
    (length > 1.0).then(|| LineSegment::new(a, b))
}
