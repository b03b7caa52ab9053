// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour polygon source — Otsu binarization, border following, and
// Douglas-Peucker simplification down to four-point outlines.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as PixelPoint;
use scanwerk_bridge::traits::PolygonSource;
use scanwerk_core::error::Result;
use scanwerk_core::types::Point;
use tracing::{debug, instrument};

use crate::frame::processor::binarize_otsu;

/// Finds bright, roughly quadrilateral regions (a page on a darker desk).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourPolygonSource {
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub epsilon_fraction: f64,
    /// Contours shorter than this (pixels) are ignored.
    pub min_perimeter: f64,
}

impl Default for ContourPolygonSource {
    fn default() -> Self {
        Self {
            epsilon_fraction: 0.02,
            min_perimeter: 40.0,
        }
    }
}

impl PolygonSource for ContourPolygonSource {
    fn name(&self) -> &str {
        "contour"
    }

    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    fn detect_polygons(&self, frame: &GrayImage) -> Result<Vec<Vec<Point>>> {
        let (darkest, brightest) = frame
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
        if darkest >= brightest {
            debug!("Uniform frame; no contours");
            return Ok(Vec::new());
        }

        let mask = binarize_otsu(frame);
        let contours = find_contours::<i32>(&mask);

        let polygons: Vec<Vec<Point>> = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .filter_map(|c| self.simplify(&c.points))
            .collect();

        debug!(
            contours = contours.len(),
            quads = polygons.len(),
            "Contour polygons extracted"
        );
        Ok(polygons)
    }
}

impl ContourPolygonSource {
    /// Reduce a closed contour to four corners, or `None` if it does not
    /// simplify to a quadrilateral.
    fn simplify(&self, points: &[PixelPoint<i32>]) -> Option<Vec<Point>> {
        if points.len() < 4 {
            return None;
        }
        let perimeter = arc_length(points, true);
        if perimeter < self.min_perimeter {
            return None;
        }

        let mut approx = approximate_polygon_dp(points, perimeter * self.epsilon_fraction, true);
        if approx.len() > 1 && approx.first() == approx.last() {
            approx.pop();
        }
        (approx.len() == 4).then(|| {
            approx
                .iter()
                .map(|p| Point::new(p.x as f64, p.y as f64))
                .collect()
        })
    }
}
