// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — Vision backend bridge.
//
// Defines the collaborator traits the engine consumes, a load-once holder for
// expensive backends, and the one-request-in-flight worker used to run
// detection off the frame loop.

pub mod lifecycle;
pub mod traits;
pub mod worker;

pub use lifecycle::BackendCell;
pub use traits::{LineSource, PolygonSource, Resampler};
pub use worker::{DetectionWorker, FeatureSource, FrameFeatures};
