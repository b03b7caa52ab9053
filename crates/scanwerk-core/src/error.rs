// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
///
/// Per-frame detection failures are normally expressed as `None` or empty
/// results; these variants are only returned for structurally invalid calls
/// and for failures in the surrounding plumbing (images, backends, config).
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Geometry --
    #[error("no document candidates found")]
    NoCandidates,

    #[error("invalid quad: {0}")]
    InvalidQuad(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    // -- Images --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Vision backend --
    #[error("vision backend has not been initialised")]
    BackendNotReady,

    #[error("vision backend initialisation failed: {0}")]
    BackendInit(String),

    #[error("detection worker failed: {0}")]
    Worker(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
