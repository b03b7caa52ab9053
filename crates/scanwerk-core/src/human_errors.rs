// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable feedback for failed captures.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the caller presents it.

use crate::error::ScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing is wrong yet; keep the camera pointed at the page.
    Transient,
    /// The user must do something (adjust corners, reframe the page).
    ActionRequired,
    /// Cannot be fixed by retrying — broken file, bad setup.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether simply trying again on the next frame may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScanError` into feedback suitable for a capture prompt.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        ScanError::NoCandidates => HumanError {
            message: "We can't see a document yet.".into(),
            suggestion: "Place the page on a darker surface and make sure all four edges are in view.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::InvalidQuad(detail) => HumanError {
            message: "Those corners don't outline a page.".into(),
            suggestion: format!("Drag the four corner handles onto the corners of the document. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::DegenerateGeometry(_) => HumanError {
            message: "The document outline is too thin to flatten.".into(),
            suggestion: "Hold the camera more directly above the page and try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ScanError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::BackendNotReady => HumanError {
            message: "The scanner is still starting up.".into(),
            suggestion: "Wait a moment, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::BackendInit(_) => HumanError {
            message: "The scanner couldn't start.".into(),
            suggestion: "Try restarting the app. If this keeps happening, reinstall it.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::Worker(_) => HumanError {
            message: "A camera frame couldn't be analysed.".into(),
            suggestion: "Keep the camera steady; the next frame will be tried automatically.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::InvalidConfig(detail) => HumanError {
            message: "The scanner settings are invalid.".into(),
            suggestion: format!("Fix the settings file or delete it to use the defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or choose a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "Something went wrong reading or writing a file.".into(),
                    suggestion: "Make sure there's enough free space, then try again.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanError::Serialization(_) => HumanError {
            message: "A settings file is damaged.".into(),
            suggestion: "Delete the settings file to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
