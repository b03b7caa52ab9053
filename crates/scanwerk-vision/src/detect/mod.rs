// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-frame document detection — candidate building, scoring, and selection.

pub mod candidates;
pub mod pipeline;
pub mod scorer;

pub use candidates::{CandidateSet, CandidateSource, QuadCandidate};
pub use pipeline::{FrameDetector, process_frame};
pub use scorer::{ShapeScores, score_quad, select_best, shape_scores};
