// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration. Every field has a default so partial JSON files are
// accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, ScanError};
use crate::types::PaperSize;

/// Complete tunable surface of the scanning engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detector: DetectorConfig,
    pub tracker: TrackerConfig,
    pub rectify: RectifyConfig,
}

impl ScanConfig {
    /// Load and validate a configuration file (JSON).
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&raw)?;
        debug!("configuration loaded");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tunables outside their meaningful range.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detector;
        check(
            d.min_area_percent >= 0.0 && d.min_area_percent < d.max_area_percent,
            "min_area_percent must be >= 0 and below max_area_percent",
        )?;
        check(
            d.max_area_percent <= 100.0,
            "max_area_percent must not exceed 100",
        )?;
        check(d.max_lines_per_orientation >= 2, "max_lines_per_orientation must be >= 2")?;
        check(d.max_aspect_ratio >= 1.0, "max_aspect_ratio must be >= 1")?;
        d.gate().validate("detector")?;
        self.tracker.gate.validate("tracker.gate")?;

        let t = &self.tracker;
        check(
            (0.0..=1.0).contains(&t.smoothing_alpha),
            "smoothing_alpha must be within [0, 1]",
        )?;
        check(t.max_missed_frames >= 1, "max_missed_frames must be >= 1")?;
        check(
            t.history_capacity >= t.min_history_samples && t.min_history_samples >= 2,
            "history_capacity must be >= min_history_samples >= 2",
        )?;
        check(
            t.stable_motion_threshold > 0.0,
            "stable_motion_threshold must be positive",
        )?;
        check(
            t.significant_change_threshold > 0.0,
            "significant_change_threshold must be positive",
        )?;

        check(self.rectify.output_width > 0, "rectify.output_width must be positive")?;
        check(self.rectify.dpi > 0, "rectify.dpi must be positive")?;
        Ok(())
    }
}

fn check(ok: bool, message: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ScanError::InvalidConfig(message.to_string()))
    }
}

/// Shape tests shared by candidate scoring and the tracker's per-frame gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidityGate {
    /// Minimum rectangularity score in `[0, 1]`.
    pub min_rectangularity: f64,
    /// Largest tolerated deviation of any interior angle from 90 degrees.
    pub max_angle_deviation: f64,
    /// Minimum shorter/longer ratio of each pair of opposite sides.
    pub min_side_consistency: f64,
    /// Largest tolerated long/short side ratio.
    pub max_aspect_ratio: f64,
}

impl ValidityGate {
    fn validate(&self, scope: &str) -> Result<()> {
        check(
            (0.0..=1.0).contains(&self.min_rectangularity),
            &format!("{scope}: min_rectangularity must be within [0, 1]"),
        )?;
        check(
            self.max_angle_deviation > 0.0 && self.max_angle_deviation < 90.0,
            &format!("{scope}: max_angle_deviation must be within (0, 90)"),
        )?;
        check(
            (0.0..=1.0).contains(&self.min_side_consistency),
            &format!("{scope}: min_side_consistency must be within [0, 1]"),
        )?;
        check(
            self.max_aspect_ratio >= 1.0,
            &format!("{scope}: max_aspect_ratio must be >= 1"),
        )
    }
}

impl Default for ValidityGate {
    /// The stricter gate the tracker applies on every frame.
    fn default() -> Self {
        Self {
            min_rectangularity: 0.6,
            max_angle_deviation: 25.0,
            min_side_consistency: 0.75,
            max_aspect_ratio: 3.0,
        }
    }
}

/// Candidate building and scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Segments kept per orientation class (longest first).
    pub max_lines_per_orientation: usize,
    /// How far (pixels) a corner may lie outside the frame.
    pub bounds_tolerance_px: f64,
    /// Smallest accepted quad area, percent of the frame.
    pub min_area_percent: f64,
    /// Largest accepted quad area, percent of the frame.
    pub max_area_percent: f64,
    pub min_rectangularity: f64,
    pub max_aspect_ratio: f64,
    pub min_side_consistency: f64,
    pub max_angle_deviation: f64,
    /// Distance from the frame border that triggers the edge penalty.
    pub edge_margin_px: f64,
    pub edge_penalty: f64,
    /// Minimum combined score for a candidate to be selected.
    pub min_score: f64,
}

impl DetectorConfig {
    /// Shape thresholds used while scoring candidates.
    pub fn gate(&self) -> ValidityGate {
        ValidityGate {
            min_rectangularity: self.min_rectangularity,
            max_angle_deviation: self.max_angle_deviation,
            min_side_consistency: self.min_side_consistency,
            max_aspect_ratio: self.max_aspect_ratio,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_lines_per_orientation: 4,
            bounds_tolerance_px: 5.0,
            min_area_percent: 5.0,
            max_area_percent: 95.0,
            min_rectangularity: 0.5,
            max_aspect_ratio: 3.0,
            min_side_consistency: 0.7,
            max_angle_deviation: 30.0,
            edge_margin_px: 20.0,
            edge_penalty: 0.1,
            min_score: 0.4,
        }
    }
}

/// Temporal smoothing and stability parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// EMA weight of the newest detection (1.0 = no smoothing).
    pub smoothing_alpha: f64,
    /// How long the area must stay steady before the quad counts as stable.
    pub stable_duration_ms: f64,
    /// Upper bound on the coefficient of variation of recent areas.
    pub stable_motion_threshold: f64,
    /// Consecutive misses tolerated before the session resets.
    pub max_missed_frames: u32,
    /// Relative area jump treated as a scene change.
    pub significant_change_threshold: f64,
    /// Capacity of the rolling area history.
    pub history_capacity: usize,
    /// Samples required before variance is evaluated.
    pub min_history_samples: usize,
    pub gate: ValidityGate,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.5,
            stable_duration_ms: 1000.0,
            stable_motion_threshold: 0.05,
            max_missed_frames: 3,
            significant_change_threshold: 0.15,
            history_capacity: 10,
            min_history_samples: 5,
            gate: ValidityGate::default(),
        }
    }
}

/// Output sizing for rectified captures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyConfig {
    /// Output width in pixels when no paper size is requested.
    pub output_width: u32,
    /// Fixed paper format; overrides the measured aspect ratio when set.
    pub paper_size: Option<PaperSize>,
    pub dpi: u32,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self {
            output_width: 1240,
            paper_size: None,
            dpi: 150,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        ScanConfig::default().validate().expect("defaults must validate");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = ScanConfig::from_json(r#"{ "tracker": { "smoothing_alpha": 0.8 } }"#)
            .expect("parse");
        assert_eq!(config.tracker.smoothing_alpha, 0.8);
        assert_eq!(config.tracker.max_missed_frames, 3);
        assert_eq!(config.detector, DetectorConfig::default());
    }

    #[test]
    fn out_of_range_alpha_is_rejected() {
        let err = ScanConfig::from_json(r#"{ "tracker": { "smoothing_alpha": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));
    }

    #[test]
    fn inverted_area_bounds_are_rejected() {
        let mut config = ScanConfig::default();
        config.detector.min_area_percent = 60.0;
        config.detector.max_area_percent = 40.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = ScanConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ScanError::Serialization(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"{{ "rectify": {{ "output_width": 800, "paper_size": "A4" }} }}"#
        )
        .expect("write");

        let config = ScanConfig::load(file.path()).expect("load");
        assert_eq!(config.rectify.output_width, 800);
        assert_eq!(config.rectify.paper_size, Some(PaperSize::A4));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ScanConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ScanError::Io(_)));
    }
}
