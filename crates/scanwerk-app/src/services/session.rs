// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan session — wires the feature backend, per-frame detector, tracker, and
// rectifier together for one capture.
//
// Detection runs on a downscaled working copy; every quad leaving this layer
// is in full-resolution frame coordinates.

use clap::ValueEnum;
use image::DynamicImage;
use scanwerk_bridge::{BackendCell, DetectionWorker, FrameFeatures, Resampler};
use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::Result;
use scanwerk_core::types::{DetectionResult, Point, RectifiedPlan, TrackerOutput};
use scanwerk_vision::{
    ContourPolygonSource, FrameDetector, FrameProcessor, HoughLineSource, ProjectiveResampler,
    QuadTracker, build_rectification_plan, build_rectification_plan_for_paper,
};
use tracing::{debug, info, instrument};

static LINE_BACKEND: BackendCell<HoughLineSource> = BackendCell::new();
static POLYGON_BACKEND: BackendCell<ContourPolygonSource> = BackendCell::new();

/// Which detector feeds candidate quads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    /// Straight edges from a Hough transform.
    #[default]
    Hough,
    /// Outlines of bright regions.
    Contour,
}

/// One camera session: frames in, a stable quad and a flattened page out.
pub struct ScanSession {
    config: ScanConfig,
    worker: DetectionWorker,
    detector: FrameDetector,
    tracker: QuadTracker,
    max_side: u32,
}

impl ScanSession {
    /// Start a session, loading the chosen backend on first use.
    pub async fn open(config: ScanConfig, max_side: u32, source: SourceKind) -> Result<Self> {
        let worker = match source {
            SourceKind::Hough => DetectionWorker::new(
                LINE_BACKEND
                    .initialize(|| async { Ok(HoughLineSource::default()) })
                    .await?,
            ),
            SourceKind::Contour => DetectionWorker::with_polygons(
                POLYGON_BACKEND
                    .initialize(|| async { Ok(ContourPolygonSource::default()) })
                    .await?,
            ),
        };
        info!(max_side, ?source, "scan session opened");
        Ok(Self {
            worker,
            detector: FrameDetector::new(config.detector),
            tracker: QuadTracker::new(config.tracker),
            config,
            max_side,
        })
    }

    /// Detect the document in one frame.
    ///
    /// `Ok(None)` means the frame was dropped because a previous one is still
    /// being processed.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub async fn detect(&self, frame: &FrameProcessor) -> Result<Option<DetectionResult>> {
        let prepared = frame.prepare(self.max_side);
        let (w, h) = (prepared.width(), prepared.height());
        let Some(features) = self.worker.request(prepared.luma.clone()).await? else {
            return Ok(None);
        };

        let mut result = match features {
            FrameFeatures::Lines(lines) => self.detector.process_frame(&lines, w, h),
            FrameFeatures::Polygons(polygons) => self.detector.process_polygons(&polygons, w, h),
        };
        result.quad = result.quad.map(|quad| prepared.to_source(&quad));
        debug!(found = result.quad.is_some(), score = result.score, "frame detected");
        Ok(Some(result))
    }

    /// Detect and feed the tracker. `Ok(None)` when the frame was dropped.
    pub async fn feed(&mut self, frame: &FrameProcessor, now_ms: f64) -> Result<Option<TrackerOutput>> {
        let Some(result) = self.detect(frame).await? else {
            return Ok(None);
        };
        Ok(Some(self.tracker.update(&result, now_ms)))
    }

    /// Plan the unwarp of `corners` using the configured output format.
    pub fn plan(&self, corners: &[Point]) -> Result<RectifiedPlan> {
        let rectify = &self.config.rectify;
        match rectify.paper_size {
            Some(paper) => build_rectification_plan_for_paper(corners, paper, rectify.dpi),
            None => build_rectification_plan(corners, rectify.output_width),
        }
    }

    /// Flatten the region outlined by `corners` (full-resolution coordinates).
    #[instrument(skip_all)]
    pub fn capture(&self, frame: &FrameProcessor, corners: &[Point]) -> Result<DynamicImage> {
        let plan = self.plan(corners)?;
        ProjectiveResampler.warp(frame.as_dynamic(), &plan)
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};
    use scanwerk_core::error::ScanError;
    use scanwerk_core::types::{PaperSize, TrackingState};

    use super::*;

    fn page_on_desk() -> FrameProcessor {
        FrameProcessor::from_dynamic(DynamicImage::ImageLuma8(GrayImage::from_fn(
            400,
            500,
            |x, y| {
                if (50..350).contains(&x) && (60..440).contains(&y) {
                    Luma([240u8])
                } else {
                    Luma([30u8])
                }
            },
        )))
    }

    #[tokio::test]
    async fn steady_frames_reach_stable() {
        let mut session = ScanSession::open(ScanConfig::default(), 1024, SourceKind::Hough)
            .await
            .expect("session");
        let frame = page_on_desk();

        let mut last = None;
        for i in 0..20 {
            last = session
                .feed(&frame, i as f64 * 100.0)
                .await
                .expect("feed");
        }
        let output = last.expect("frame processed");
        assert_eq!(output.state, TrackingState::Stable);

        let quad = output.smoothed_quad.expect("quad");
        let page = session.capture(&frame, &quad.corners).expect("capture");
        assert_eq!(page.width(), ScanConfig::default().rectify.output_width);
    }

    #[tokio::test]
    async fn downscaled_detection_reports_full_resolution() {
        let session = ScanSession::open(ScanConfig::default(), 200, SourceKind::Hough)
            .await
            .expect("session");
        let result = session
            .detect(&page_on_desk())
            .await
            .expect("detect")
            .expect("not dropped");
        let quad = result.quad.expect("page found");
        assert!(quad.bottom_right().x > 300.0, "{quad:?}");
    }

    #[tokio::test]
    async fn contour_source_finds_the_page() {
        let mut session = ScanSession::open(ScanConfig::default(), 1024, SourceKind::Contour)
            .await
            .expect("session");
        let frame = page_on_desk();

        let result = session
            .detect(&frame)
            .await
            .expect("detect")
            .expect("not dropped");
        let quad = result.quad.expect("page found");
        assert!(quad.top_left().distance_to(&Point::new(50.0, 60.0)) < 3.0, "{quad:?}");

        let mut last = None;
        for i in 0..20 {
            last = session.feed(&frame, i as f64 * 100.0).await.expect("feed");
        }
        assert_eq!(last.expect("frame processed").state, TrackingState::Stable);
    }

    #[tokio::test]
    async fn paper_size_drives_output() {
        let mut config = ScanConfig::default();
        config.rectify.paper_size = Some(PaperSize::A4);
        config.rectify.dpi = 100;
        let session = ScanSession::open(config, 1024, SourceKind::Hough).await.expect("session");

        let corners = [
            Point::new(50.0, 60.0),
            Point::new(350.0, 60.0),
            Point::new(350.0, 440.0),
            Point::new(50.0, 440.0),
        ];
        let page = session.capture(&page_on_desk(), &corners).expect("capture");
        assert_eq!((page.width(), page.height()), (827, 1169));
    }

    #[tokio::test]
    async fn rejected_corners_surface_as_invalid_quad() {
        let session = ScanSession::open(ScanConfig::default(), 1024, SourceKind::Hough)
            .await
            .expect("session");
        let corners = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!(matches!(
            session.capture(&page_on_desk(), &corners),
            Err(ScanError::InvalidQuad(_))
        ));
    }
}
