// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification planning.

pub mod homography;
pub mod plan;

pub use homography::Homography;
pub use plan::{build_rectification_plan, build_rectification_plan_for_paper};
