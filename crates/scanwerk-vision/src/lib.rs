// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-vision — Document quad detection, tracking, and rectification.
//
// Turns line segments (or contour polygons) into a scored document quad per
// frame, smooths quads across frames until the document is held still, and
// plans the perspective unwarp of the final capture. Default `imageproc`
// backends for line extraction and warping live under `backend`.

pub mod backend;
pub mod detect;
pub mod frame;
pub mod geometry;
pub mod rectify;
pub mod track;

// Re-export the primary entry points so callers can use
// `scanwerk_vision::FrameDetector` etc.
pub use backend::{ContourPolygonSource, HoughLineSource, ProjectiveResampler};
pub use detect::{FrameDetector, process_frame};
pub use frame::FrameProcessor;
pub use rectify::{Homography, build_rectification_plan, build_rectification_plan_for_paper};
pub use track::{QuadTracker, ema_quad};
