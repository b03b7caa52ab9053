// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Off-loop feature detection with at most one request in flight.
//
// The frame loop posts a frame and awaits the features. While a request is
// running any further frame is dropped rather than queued, so results always
// come back in frame order.

use std::sync::Arc;

use image::GrayImage;
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::{LineSegment, Point};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::traits::{LineSource, PolygonSource};

/// The backend a worker drives.
#[derive(Clone)]
pub enum FeatureSource {
    Lines(Arc<dyn LineSource>),
    Polygons(Arc<dyn PolygonSource>),
}

impl FeatureSource {
    pub fn name(&self) -> &str {
        match self {
            Self::Lines(source) => source.name(),
            Self::Polygons(source) => source.name(),
        }
    }

    fn detect(&self, frame: &GrayImage) -> Result<FrameFeatures> {
        match self {
            Self::Lines(source) => source.detect_lines(frame).map(FrameFeatures::Lines),
            Self::Polygons(source) => source.detect_polygons(frame).map(FrameFeatures::Polygons),
        }
    }
}

/// Geometry extracted from one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameFeatures {
    Lines(Vec<LineSegment>),
    Polygons(Vec<Vec<Point>>),
}

impl FrameFeatures {
    pub fn len(&self) -> usize {
        match self {
            Self::Lines(lines) => lines.len(),
            Self::Polygons(polygons) => polygons.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs a line or polygon source on the blocking pool, one frame at a time.
#[derive(Clone)]
pub struct DetectionWorker {
    source: FeatureSource,
    in_flight: Arc<Semaphore>,
}

impl DetectionWorker {
    pub fn new(source: Arc<dyn LineSource>) -> Self {
        Self::with_source(FeatureSource::Lines(source))
    }

    pub fn with_polygons(source: Arc<dyn PolygonSource>) -> Self {
        Self::with_source(FeatureSource::Polygons(source))
    }

    pub fn with_source(source: FeatureSource) -> Self {
        Self {
            source,
            in_flight: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn source(&self) -> &FeatureSource {
        &self.source
    }

    /// Whether a request is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.available_permits() == 0
    }

    /// Extract features from `frame`.
    ///
    /// Returns `Ok(None)` when another request is still in flight and the
    /// frame was dropped.
    #[instrument(skip_all, fields(backend = self.source.name(), width = frame.width(), height = frame.height()))]
    pub async fn request(&self, frame: GrayImage) -> Result<Option<FrameFeatures>> {
        let permit = match Arc::clone(&self.in_flight).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                debug!("detector busy; frame dropped");
                return Ok(None);
            }
        };

        let source = self.source.clone();
        let features = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            source.detect(&frame)
        })
        .await
        .map_err(|err| ScanError::Worker(err.to_string()))??;

        debug!(features = features.len(), "detection finished");
        Ok(Some(features))
    }
}
