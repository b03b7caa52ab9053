// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame processor — loads camera frames and prepares the downscaled grayscale
// copy the line and contour sources work on. Operates on in-memory images
// using the `image` crate.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::{Point, Quad};
use tracing::{debug, info, instrument};

/// A single camera frame or still photo.
///
/// ```ignore
/// let prepared = FrameProcessor::open("page.jpg")?.prepare(1024);
/// let lines = source.detect_lines(&prepared.luma)?;
/// ```
pub struct FrameProcessor {
    image: DynamicImage,
}

/// Grayscale working copy of a frame plus the factor that maps its
/// coordinates back to the full-resolution frame.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    pub luma: GrayImage,
    /// Full-resolution pixels per working pixel (`>= 1.0`).
    pub scale: f64,
}

impl PreparedFrame {
    pub fn width(&self) -> u32 {
        self.luma.width()
    }

    pub fn height(&self) -> u32 {
        self.luma.height()
    }

    /// Map a quad found in the working copy onto the full-resolution frame.
    pub fn to_source(&self, quad: &Quad) -> Quad {
        Quad::new(
            quad.corners
                .map(|p| Point::new(p.x * self.scale, p.y * self.scale)),
        )
    }
}

impl FrameProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load a frame from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            ScanError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Frame loaded");
        Ok(Self { image: img })
    }

    /// Decode a frame from encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| ScanError::ImageError(format!("failed to decode frame: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Frame decoded from bytes"
        );
        Ok(Self { image: img })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Preparation ----------------------------------------------------------

    /// Grayscale working copy whose longer side is at most `max_side`.
    ///
    /// Frames already within the limit are not resampled.
    #[instrument(skip(self), fields(max_side))]
    pub fn prepare(&self, max_side: u32) -> PreparedFrame {
        let (w, h) = (self.image.width(), self.image.height());
        let longest = w.max(h);
        if max_side == 0 || longest <= max_side {
            return PreparedFrame {
                luma: self.image.to_luma8(),
                scale: 1.0,
            };
        }

        let resized = self
            .image
            .resize(max_side, max_side, image::imageops::FilterType::Triangle);
        let scale = w as f64 / resized.width() as f64;
        debug!(
            from_w = w,
            from_h = h,
            new_w = resized.width(),
            new_h = resized.height(),
            scale,
            "Frame downscaled for detection"
        );
        PreparedFrame {
            luma: resized.to_luma8(),
            scale,
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current frame as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Write the frame to a file. The format is inferred from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            ScanError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Encode a `DynamicImage` into the specified format.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| ScanError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Binary mask: 255 where the pixel is brighter than the Otsu level.
pub fn binarize_otsu(gray: &GrayImage) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    let level = otsu_level(gray);
    debug!(level, "Otsu level computed");
    threshold(gray, level, ThresholdType::Binary)
}
