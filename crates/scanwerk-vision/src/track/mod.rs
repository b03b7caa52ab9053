// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Temporal tracking across frames.

pub mod smoothing;
pub mod tracker;

pub use smoothing::ema_quad;
pub use tracker::{QuadTracker, TrackerState};
