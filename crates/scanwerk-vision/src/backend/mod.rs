// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Default vision backends built on `imageproc`: Hough line extraction,
// contour polygons, and projective warping.

pub mod contour;
pub mod hough;
pub mod warp;

pub use contour::ContourPolygonSource;
pub use hough::HoughLineSource;
pub use warp::ProjectiveResampler;
