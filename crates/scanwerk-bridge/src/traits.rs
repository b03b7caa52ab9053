// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend-agnostic trait definitions for the vision collaborators.
//
// The scanning engine never looks at pixels itself. Whatever finds edges
// (a Hough transform, a contour tracer, a neural edge model) sits behind
// these traits and hands the engine plain geometry.

use image::{DynamicImage, GrayImage};
use scanwerk_core::error::Result;
use scanwerk_core::types::{LineSegment, Point, RectifiedPlan};

/// Extracts straight line segments from a frame.
pub trait LineSource: Send + Sync {
    /// Short backend name for logs (e.g. "hough").
    fn name(&self) -> &str;

    /// Detect line segments in a grayscale frame.
    fn detect_lines(&self, frame: &GrayImage) -> Result<Vec<LineSegment>>;
}

/// Extracts closed polygon outlines (typically 4-point approximations of
/// contours) from a frame.
pub trait PolygonSource: Send + Sync {
    fn name(&self) -> &str;

    fn detect_polygons(&self, frame: &GrayImage) -> Result<Vec<Vec<Point>>>;
}

/// Resamples the region described by a plan into an upright image.
pub trait Resampler: Send + Sync {
    /// Warp `source` so that `plan.source_quad` maps onto the plan's output
    /// rectangle. The returned image is `output_width x output_height`.
    fn warp(&self, source: &DynamicImage, plan: &RectifiedPlan) -> Result<DynamicImage>;
}
