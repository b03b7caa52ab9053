// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quad tracker — smooths per-frame detections and decides when the document
// has been held still long enough to capture.
//
// State machine:
//
//   Searching --accepted quad--> Tracking --low area variance held--> Stable
//       ^                           |  ^                                 |
//       +----- too many misses -----+  +------ variance rises ----------+
//
// A large area jump restarts smoothing from the new quad in Tracking.

use std::collections::VecDeque;

use scanwerk_core::config::TrackerConfig;
use scanwerk_core::types::{DetectionResult, Quad, TrackerOutput, TrackingState};
use tracing::{debug, info, instrument};

use crate::detect::scorer::shape_scores;
use crate::geometry::quad_area;
use crate::track::smoothing::ema_quad;

/// Mutable per-session tracking state.
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    smoothed_quad: Option<Quad>,
    last_area: Option<f64>,
    area_history: VecDeque<f64>,
    missed_count: u32,
    stable_since: Option<f64>,
    phase: TrackingState,
}

impl TrackerState {
    pub fn smoothed_quad(&self) -> Option<&Quad> {
        self.smoothed_quad.as_ref()
    }

    pub fn phase(&self) -> TrackingState {
        self.phase
    }

    pub fn is_stable(&self) -> bool {
        self.phase == TrackingState::Stable
    }

    pub fn missed_count(&self) -> u32 {
        self.missed_count
    }

    /// Raw areas of recently accepted quads, oldest first.
    pub fn area_history(&self) -> impl Iterator<Item = f64> + '_ {
        self.area_history.iter().copied()
    }
}

/// Follows one document across a stream of detections.
///
/// Frames must be fed in arrival order. `now_ms` is any monotonic clock in
/// milliseconds.
#[derive(Debug, Clone, Default)]
pub struct QuadTracker {
    config: TrackerConfig,
    state: TrackerState,
}

impl QuadTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: TrackerState::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Return to a fresh `Searching` state.
    pub fn reset(&mut self) {
        if self.state.phase != TrackingState::Searching {
            info!(from = ?self.state.phase, "tracker reset");
        }
        self.state = TrackerState::default();
    }

    /// Feed the next frame's detection.
    #[instrument(level = "debug", skip(self, detection))]
    pub fn update(&mut self, detection: &DetectionResult, now_ms: f64) -> TrackerOutput {
        let detected = match detection.quad.filter(|quad| self.accepts(quad)) {
            Some(quad) => {
                self.accept(quad, now_ms);
                true
            }
            None => {
                self.miss();
                false
            }
        };
        self.output(detected)
    }

    fn output(&self, detected: bool) -> TrackerOutput {
        TrackerOutput {
            smoothed_quad: self.state.smoothed_quad,
            stable: detected && self.state.is_stable(),
            state: self.state.phase,
        }
    }

    fn accepts(&self, quad: &Quad) -> bool {
        quad.is_finite() && shape_scores(quad, &self.config.gate).is_some()
    }

    fn miss(&mut self) {
        if self.state.phase == TrackingState::Searching {
            return;
        }
        self.state.missed_count += 1;
        debug!(missed = self.state.missed_count, "frame missed");
        if self.state.missed_count >= self.config.max_missed_frames {
            info!(
                missed = self.state.missed_count,
                "document lost; searching again"
            );
            self.state = TrackerState::default();
        }
    }

    fn accept(&mut self, quad: Quad, now_ms: f64) {
        let area = quad_area(&quad);
        let state = &mut self.state;
        state.missed_count = 0;

        let scene_change = state.last_area.is_some_and(|last| {
            last > 0.0 && (area - last).abs() / last > self.config.significant_change_threshold
        });

        if state.phase == TrackingState::Searching || scene_change {
            if scene_change {
                info!(area, last = ?state.last_area, "scene change; tracking restarted");
            } else {
                info!(area, "document found");
            }
            state.smoothed_quad = Some(quad);
            state.area_history.clear();
            state.stable_since = None;
            state.phase = TrackingState::Tracking;
        } else {
            state.smoothed_quad = ema_quad(
                state.smoothed_quad.as_ref(),
                Some(&quad),
                self.config.smoothing_alpha,
            );
        }

        state.last_area = Some(area);
        state.area_history.push_back(area);
        while state.area_history.len() > self.config.history_capacity {
            state.area_history.pop_front();
        }

        self.update_stability(now_ms);
    }

    fn update_stability(&mut self, now_ms: f64) {
        let state = &mut self.state;
        if state.area_history.len() < self.config.min_history_samples {
            return;
        }

        let variation = coefficient_of_variation(&state.area_history);
        if variation.is_some_and(|cv| cv < self.config.stable_motion_threshold) {
            let since = *state.stable_since.get_or_insert(now_ms);
            if state.phase != TrackingState::Stable
                && now_ms - since >= self.config.stable_duration_ms
            {
                info!(held_ms = now_ms - since, "document stable");
                state.phase = TrackingState::Stable;
            }
        } else {
            state.stable_since = None;
            if state.phase == TrackingState::Stable {
                info!(?variation, "document moving again");
            }
            state.phase = TrackingState::Tracking;
        }
    }
}

/// Population standard deviation over mean; `None` for a non-positive mean.
fn coefficient_of_variation(samples: &VecDeque<f64>) -> Option<f64> {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    if mean.is_nan() || mean <= 0.0 {
        return None;
    }
    let variance = samples.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() / mean)
}

#[cfg(test)]
mod tests {
    use scanwerk_core::types::{DetectionStats, Point};

    use super::*;

    const FRAME_MS: f64 = 100.0;

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Quad {
        Quad::new([
            Point::new(x0, y0),
            Point::new(x0 + w, y0),
            Point::new(x0 + w, y0 + h),
            Point::new(x0, y0 + h),
        ])
    }

    fn detected(quad: Quad) -> DetectionResult {
        DetectionResult {
            quad: Some(quad),
            score: 0.9,
            stats: DetectionStats::default(),
            breakdown: None,
        }
    }

    fn nothing() -> DetectionResult {
        DetectionResult::empty(DetectionStats::default())
    }

    /// Feed the same quad `frames` times starting at `start_ms`.
    fn hold(tracker: &mut QuadTracker, quad: Quad, start_ms: f64, frames: usize) -> TrackerOutput {
        let mut output = tracker.update(&detected(quad), start_ms);
        for i in 1..frames {
            output = tracker.update(&detected(quad), start_ms + i as f64 * FRAME_MS);
        }
        output
    }

    #[test]
    fn first_detection_starts_tracking() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);
        let output = tracker.update(&detected(quad), 0.0);
        assert_eq!(output.state, TrackingState::Tracking);
        assert_eq!(output.smoothed_quad, Some(quad));
        assert!(!output.stable);
    }

    #[test]
    fn steady_quad_becomes_stable() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);

        // Variance is evaluated from the fifth sample (t = 400 ms) onwards.
        let output = hold(&mut tracker, quad, 0.0, 14);
        assert_eq!(output.state, TrackingState::Tracking, "held only 900 ms");

        let output = tracker.update(&detected(quad), 1400.0);
        assert_eq!(output.state, TrackingState::Stable);
        assert!(output.stable);
        assert_eq!(output.smoothed_quad, Some(quad));
    }

    #[test]
    fn too_few_samples_never_stable() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);
        tracker.update(&detected(quad), 0.0);
        let output = tracker.update(&detected(quad), 10_000.0);
        assert_eq!(output.state, TrackingState::Tracking);
    }

    #[test]
    fn larger_quad_restarts_tracking() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);
        let output = hold(&mut tracker, quad, 0.0, 20);
        assert!(output.stable);

        // 50% more area.
        let bigger = rect(100.0, 100.0, 300.0, 600.0);
        let output = tracker.update(&detected(bigger), 2000.0);
        assert_eq!(output.state, TrackingState::Tracking);
        assert!(!output.stable);
        assert_eq!(output.smoothed_quad, Some(bigger));
        assert_eq!(tracker.state().area_history().count(), 1);
    }

    #[test]
    fn smoothing_follows_small_moves() {
        let mut tracker = QuadTracker::default();
        tracker.update(&detected(rect(100.0, 100.0, 300.0, 400.0)), 0.0);
        let output = tracker.update(&detected(rect(110.0, 100.0, 300.0, 400.0)), FRAME_MS);
        let smoothed = output.smoothed_quad.expect("tracking");
        assert_eq!(smoothed.top_left(), Point::new(105.0, 100.0));
    }

    #[test]
    fn moving_quad_drops_stable() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);
        assert!(hold(&mut tracker, quad, 0.0, 20).stable);

        // Areas wobble by about 12% (under the scene-change threshold) until
        // the variance check trips.
        let mut t = 2000.0;
        let mut output = tracker.update(&detected(rect(100.0, 100.0, 300.0, 350.0)), t);
        for _ in 0..5 {
            t += FRAME_MS;
            output = tracker.update(&detected(quad), t);
            t += FRAME_MS;
            output = tracker.update(&detected(rect(100.0, 100.0, 300.0, 350.0)), t);
        }
        assert_eq!(output.state, TrackingState::Tracking);
        assert!(!output.stable);
    }

    #[test]
    fn misses_keep_quad_until_limit() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);
        tracker.update(&detected(quad), 0.0);

        let output = tracker.update(&nothing(), FRAME_MS);
        assert_eq!(output.state, TrackingState::Tracking);
        assert_eq!(output.smoothed_quad, Some(quad));
        assert_eq!(tracker.state().missed_count(), 1);

        tracker.update(&nothing(), 2.0 * FRAME_MS);
        let output = tracker.update(&nothing(), 3.0 * FRAME_MS);
        assert_eq!(output.state, TrackingState::Searching);
        assert_eq!(output.smoothed_quad, None);
        assert_eq!(tracker.state().area_history().count(), 0);
    }

    #[test]
    fn missed_frame_is_never_reported_stable() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);
        assert!(hold(&mut tracker, quad, 0.0, 20).stable);

        let output = tracker.update(&nothing(), 20.0 * FRAME_MS);
        assert!(!output.stable);
        assert_eq!(output.state, TrackingState::Stable);
        assert_eq!(output.smoothed_quad, Some(quad));

        let output = tracker.update(&detected(quad), 21.0 * FRAME_MS);
        assert!(output.stable);
    }

    #[test]
    fn detection_resets_miss_count() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);
        tracker.update(&detected(quad), 0.0);
        tracker.update(&nothing(), 100.0);
        tracker.update(&nothing(), 200.0);
        tracker.update(&detected(quad), 300.0);
        assert_eq!(tracker.state().missed_count(), 0);
        let output = tracker.update(&nothing(), 400.0);
        assert_eq!(output.state, TrackingState::Tracking);
    }

    #[test]
    fn non_finite_corners_count_as_miss() {
        let mut tracker = QuadTracker::default();
        let quad = rect(100.0, 100.0, 300.0, 400.0);
        tracker.update(&detected(quad), 0.0);

        let mut broken = quad;
        broken.corners[2] = Point::new(f64::NAN, 500.0);
        let output = tracker.update(&detected(broken), FRAME_MS);
        assert_eq!(output.smoothed_quad, Some(quad));
        assert_eq!(tracker.state().missed_count(), 1);
    }

    #[test]
    fn gate_rejects_skewed_quads() {
        let mut tracker = QuadTracker::default();
        // 35 degree deviation: fine for some detectors, not for the tracker.
        let skew = 300.0 / 55f64.to_radians().tan();
        let skewed = Quad::new([
            Point::new(100.0, 100.0),
            Point::new(400.0, 100.0),
            Point::new(400.0 + skew, 400.0),
            Point::new(100.0 + skew, 400.0),
        ]);
        let output = tracker.update(&detected(skewed), 0.0);
        assert_eq!(output.state, TrackingState::Searching);
        assert_eq!(output.smoothed_quad, None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = QuadTracker::default();
        hold(&mut tracker, rect(100.0, 100.0, 300.0, 400.0), 0.0, 20);
        tracker.reset();
        assert_eq!(tracker.state().phase(), TrackingState::Searching);
        assert!(tracker.state().smoothed_quad().is_none());
        assert_eq!(tracker.state().area_history().count(), 0);
    }
}
