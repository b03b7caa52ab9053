// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar homography from four point correspondences.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::{Point, RectifiedPlan};

/// Projective scale below which a mapped point is at infinity.
const EPS: f64 = 1e-12;

/// A 3x3 projective transform with `h33 = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub matrix: Matrix3<f64>,
}

impl Homography {
    /// Solve for the transform taking each `src[i]` to `dst[i]`.
    ///
    /// Returns `None` when three of the points are collinear (the 8x8 system
    /// is singular).
    pub fn from_correspondences(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        if has_collinear_triple(src) || has_collinear_triple(dst) {
            return None;
        }

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            let r = 2 * i;
            a[(r, 0)] = s.x;
            a[(r, 1)] = s.y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -d.x * s.x;
            a[(r, 7)] = -d.x * s.y;
            b[r] = d.x;

            a[(r + 1, 3)] = s.x;
            a[(r + 1, 4)] = s.y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -d.y * s.x;
            a[(r + 1, 7)] = -d.y * s.y;
            b[r + 1] = d.y;
        }

        let h = a.lu().solve(&b)?;
        if h.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self {
            matrix: Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0),
        })
    }

    /// The transform taking the plan's source quad onto its destination
    /// rectangle.
    pub fn from_plan(plan: &RectifiedPlan) -> Result<Self> {
        Self::from_correspondences(&plan.source_quad.corners, &plan.destination).ok_or_else(|| {
            ScanError::DegenerateGeometry("source corners do not span a plane".into())
        })
    }

    /// Map a point; `None` if it lands at infinity.
    pub fn map(&self, p: &Point) -> Option<Point> {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if !w.is_finite() || w.abs() <= EPS {
            return None;
        }
        let mapped = Point::new(v[0] / w, v[1] / w);
        mapped.is_finite().then_some(mapped)
    }

    pub fn inverse(&self) -> Option<Self> {
        let inv = self.matrix.try_inverse()?;
        let scale = inv[(2, 2)];
        if !scale.is_finite() || scale.abs() <= EPS {
            return Some(Self { matrix: inv });
        }
        Some(Self {
            matrix: inv / scale,
        })
    }

    /// Coefficients `h11, h12, h13, h21, ..., h33`.
    pub fn to_row_major(&self) -> [f64; 9] {
        std::array::from_fn(|i| self.matrix[(i / 3, i % 3)])
    }
}

fn has_collinear_triple(points: &[Point; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES.iter().any(|&[i, j, k]| {
        let (a, b, c) = (points[i], points[j], points[k]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        let scale = a.distance_to(&b) * a.distance_to(&c);
        cross.abs() <= EPS.max(scale * 1e-9)
    })
}
