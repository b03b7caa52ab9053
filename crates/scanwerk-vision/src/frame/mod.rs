// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame module — decoding, downscaling, and grayscale preparation of camera
// frames before line extraction.

pub mod processor;

pub use processor::{FrameProcessor, PreparedFrame, binarize_otsu};
