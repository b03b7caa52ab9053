// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanwerk_bridge::traits::Resampler;
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::RectifiedPlan;
use tracing::{info, instrument};

use crate::rectify::homography::Homography;

/// Bilinear projective warp onto a white page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectiveResampler;

impl Resampler for ProjectiveResampler {
    #[instrument(skip_all, fields(out_w = plan.output_width, out_h = plan.output_height))]
    fn warp(&self, source: &DynamicImage, plan: &RectifiedPlan) -> Result<DynamicImage> {
        let homography = Homography::from_plan(plan)?;
        let projection = Projection::from_matrix(homography.to_row_major().map(|v| v as f32))
            .ok_or_else(|| {
                ScanError::DegenerateGeometry("projective transform is not invertible".into())
            })?;

        let rgba_input = source.to_rgba8();
        let default_pixel = Rgba([255u8, 255, 255, 255]);
        let mut output = RgbaImage::new(plan.output_width, plan.output_height);
        warp_into(
            &rgba_input,
            &projection,
            Interpolation::Bilinear,
            default_pixel,
            &mut output,
        );

        info!(
            out_w = plan.output_width,
            out_h = plan.output_height,
            "Perspective correction applied"
        );
        Ok(DynamicImage::ImageRgba8(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rectify::build_rectification_plan;
    use image::{GrayImage, Luma};
    use scanwerk_core::types::{Point, Quad};

    #[test]
    fn output_matches_plan_size() {
        let source = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 200, Luma([90u8])));
        let corners = [
            Point::new(20.0, 20.0),
            Point::new(280.0, 30.0),
            Point::new(270.0, 180.0),
            Point::new(30.0, 170.0),
        ];
        let plan = build_rectification_plan(&corners, 520).expect("plan");
        let out = ProjectiveResampler.warp(&source, &plan).expect("warp");
        assert_eq!(out.width(), plan.output_width);
        assert_eq!(out.height(), plan.output_height);
    }

    #[test]
    fn page_interior_fills_output() {
        // Dark desk with a bright page; warping the page region should
        // produce an almost uniformly bright image.
        let source = DynamicImage::ImageLuma8(GrayImage::from_fn(400, 500, |x, y| {
            if (50..350).contains(&x) && (60..440).contains(&y) {
                Luma([240u8])
            } else {
                Luma([30u8])
            }
        }));
        let corners = [
            Point::new(55.0, 65.0),
            Point::new(345.0, 65.0),
            Point::new(345.0, 435.0),
            Point::new(55.0, 435.0),
        ];
        let plan = build_rectification_plan(&corners, 290).expect("plan");
        let out = ProjectiveResampler.warp(&source, &plan).expect("warp").to_luma8();
        let center = out.get_pixel(out.width() / 2, out.height() / 2).0[0];
        assert!(center > 200, "center {center}");
    }

    #[test]
    fn collapsed_corners_are_degenerate() {
        let source = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
        let point = Point::new(5.0, 5.0);
        let plan = RectifiedPlan {
            source_quad: Quad::new([point; 4]),
            output_width: 10,
            output_height: 10,
            destination: [
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
        };
        assert!(matches!(
            ProjectiveResampler.warp(&source, &plan),
            Err(ScanError::DegenerateGeometry(_))
        ));
    }
}
