// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification plans — output size and destination corners for unwarping a
// document quad.

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::{PaperSize, Point, Quad, RectifiedPlan};
use tracing::{debug, instrument};

use crate::geometry::{is_convex, order_corners};

/// A validated quad in canonical order with its longest horizontal and
/// vertical edges.
struct Measured {
    quad: Quad,
    max_width: f64,
    max_height: f64,
}

fn measure(points: &[Point]) -> Result<Measured> {
    let raw = Quad::try_from_points(points)?;
    let corners = order_corners(raw.corners);
    if !is_convex(&corners) {
        return Err(ScanError::InvalidQuad(
            "corners do not form a convex outline".into(),
        ));
    }
    let quad = Quad::new(corners);

    let top = quad.top_left().distance_to(&quad.top_right());
    let bottom = quad.bottom_left().distance_to(&quad.bottom_right());
    let left = quad.top_left().distance_to(&quad.bottom_left());
    let right = quad.top_right().distance_to(&quad.bottom_right());

    let max_width = top.max(bottom);
    let max_height = left.max(right);
    if !(max_width.is_finite() && max_height.is_finite()) || max_width <= 0.0 || max_height <= 0.0
    {
        return Err(ScanError::InvalidQuad(format!(
            "edge lengths {max_width}x{max_height} are unusable"
        )));
    }

    Ok(Measured {
        quad,
        max_width,
        max_height,
    })
}

fn plan_for(quad: Quad, width: u32, height: u32) -> Result<RectifiedPlan> {
    if width == 0 || height == 0 {
        return Err(ScanError::InvalidQuad(format!(
            "output size {width}x{height} is empty"
        )));
    }
    let (w, h) = (width as f64, height as f64);
    Ok(RectifiedPlan {
        source_quad: quad,
        output_width: width,
        output_height: height,
        destination: [
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ],
    })
}

/// Plan an unwarp of `points` into an image `output_width` pixels wide,
/// keeping the quad's measured aspect ratio.
///
/// Corners may arrive in any order; they are normalised to top-left,
/// top-right, bottom-right, bottom-left.
///
/// ```
/// use scanwerk_core::types::Point;
/// use scanwerk_vision::rectify::build_rectification_plan;
///
/// let corners = [
///     Point::new(0.0, 0.0),
///     Point::new(200.0, 0.0),
///     Point::new(200.0, 100.0),
///     Point::new(0.0, 100.0),
/// ];
/// let plan = build_rectification_plan(&corners, 400).unwrap();
/// assert_eq!((plan.output_width, plan.output_height), (400, 200));
/// ```
#[instrument(level = "debug", skip(points), fields(point_count = points.len()))]
pub fn build_rectification_plan(points: &[Point], output_width: u32) -> Result<RectifiedPlan> {
    if output_width == 0 {
        return Err(ScanError::InvalidQuad("output width must be positive".into()));
    }
    let measured = measure(points)?;

    let height = (measured.max_height * output_width as f64 / measured.max_width).round();
    if !height.is_finite() || height < 1.0 || height > u32::MAX as f64 {
        return Err(ScanError::InvalidQuad(format!(
            "computed output height {height} is unusable"
        )));
    }

    let plan = plan_for(measured.quad, output_width, height as u32)?;
    debug!(
        width = plan.output_width,
        height = plan.output_height,
        "rectification planned"
    );
    Ok(plan)
}

/// Plan an unwarp onto a fixed paper format at `dpi`.
///
/// The paper is turned landscape when the measured quad is wider than it is
/// tall.
#[instrument(level = "debug", skip(points), fields(point_count = points.len()))]
pub fn build_rectification_plan_for_paper(
    points: &[Point],
    paper: PaperSize,
    dpi: u32,
) -> Result<RectifiedPlan> {
    let measured = measure(points)?;
    let (mut width, mut height) = paper.dimensions_px(dpi);
    if measured.max_width > measured.max_height {
        std::mem::swap(&mut width, &mut height);
    }
    let plan = plan_for(measured.quad, width, height)?;
    debug!(?paper, dpi, width, height, "paper rectification planned");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rectify::homography::Homography;

    fn close(a: Point, b: Point, tol: f64) -> bool {
        (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol
    }

    #[test]
    fn square_maps_onto_itself() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let plan = build_rectification_plan(&corners, 100).expect("valid square");
        assert_eq!(plan.output_width, 100);
        assert_eq!(plan.output_height, 100);
        assert_eq!(plan.destination, corners);
        assert_eq!(plan.source_quad.corners, corners);
    }

    #[test]
    fn shuffled_corners_are_ordered() {
        let corners = [
            Point::new(310.0, 420.0),
            Point::new(20.0, 30.0),
            Point::new(15.0, 410.0),
            Point::new(300.0, 25.0),
        ];
        let plan = build_rectification_plan(&corners, 600).expect("valid quad");
        assert_eq!(plan.source_quad.top_left(), Point::new(20.0, 30.0));
        assert_eq!(plan.source_quad.top_right(), Point::new(300.0, 25.0));
        assert_eq!(plan.source_quad.bottom_right(), Point::new(310.0, 420.0));
        assert_eq!(plan.source_quad.bottom_left(), Point::new(15.0, 410.0));
        assert!(plan.output_height > plan.output_width);
    }

    #[test]
    fn rejects_bad_input() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let invalid = |r: Result<RectifiedPlan>| matches!(r, Err(ScanError::InvalidQuad(_)));

        assert!(invalid(build_rectification_plan(&square[..3], 100)));
        assert!(invalid(build_rectification_plan(&square, 0)));

        let mut nan = square;
        nan[1].x = f64::NAN;
        assert!(invalid(build_rectification_plan(&nan, 100)));

        let dart = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(0.0, 100.0),
        ];
        assert!(invalid(build_rectification_plan(&dart, 100)));

        let point = [Point::new(5.0, 5.0); 4];
        assert!(invalid(build_rectification_plan(&point, 100)));
    }

    #[test]
    fn recovers_synthetically_warped_rectangle() {
        let (w, h) = (400.0, 300.0);
        let rectangle = [
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ];
        // A camera-like perspective: the far edge is narrower.
        let camera = [
            Point::new(140.0, 90.0),
            Point::new(460.0, 100.0),
            Point::new(540.0, 420.0),
            Point::new(70.0, 410.0),
        ];
        let warp = Homography::from_correspondences(&rectangle, &camera).expect("warp");
        let observed: Vec<Point> = rectangle
            .iter()
            .map(|p| warp.map(p).expect("finite"))
            .collect();

        let plan = build_rectification_plan(&observed, 800).expect("plan");
        let unwarp = Homography::from_plan(&plan).expect("unwarp");
        let (sx, sy) = (
            plan.output_width as f64 / w,
            plan.output_height as f64 / h,
        );

        for p in [
            Point::new(0.0, 0.0),
            Point::new(200.0, 150.0),
            Point::new(37.0, 260.0),
            Point::new(390.0, 12.0),
        ] {
            let seen = warp.map(&p).expect("finite");
            let recovered = unwarp.map(&seen).expect("finite");
            assert!(
                close(recovered, Point::new(p.x * sx, p.y * sy), 1e-6),
                "{p:?} -> {recovered:?}"
            );
        }
    }

    #[test]
    fn paper_plan_follows_orientation() {
        let portrait = [
            Point::new(10.0, 10.0),
            Point::new(210.0, 10.0),
            Point::new(210.0, 300.0),
            Point::new(10.0, 300.0),
        ];
        let plan =
            build_rectification_plan_for_paper(&portrait, PaperSize::A4, 150).expect("plan");
        assert_eq!((plan.output_width, plan.output_height), (1240, 1754));

        let landscape = [
            Point::new(10.0, 10.0),
            Point::new(300.0, 10.0),
            Point::new(300.0, 210.0),
            Point::new(10.0, 210.0),
        ];
        let plan =
            build_rectification_plan_for_paper(&landscape, PaperSize::A4, 150).expect("plan");
        assert_eq!((plan.output_width, plan.output_height), (1754, 1240));
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        assert!(matches!(
            build_rectification_plan_for_paper(&corners, PaperSize::Letter, 0),
            Err(ScanError::InvalidQuad(_))
        ));
    }
}
