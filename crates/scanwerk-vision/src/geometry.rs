// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plane geometry primitives used by every stage of the engine.

use std::cmp::Ordering;

use scanwerk_core::types::{LineSegment, Point, Quad};

/// Determinants smaller than this are treated as parallel lines.
const PARALLEL_EPSILON: f64 = 1e-2;

/// Intersect the infinite lines through two segments.
///
/// Returns `None` when the lines are (nearly) parallel, including the case
/// of two identical lines.
pub fn intersect(a: &LineSegment, b: &LineSegment) -> Option<Point> {
    let a1 = a.p2.y - a.p1.y;
    let b1 = a.p1.x - a.p2.x;
    let c1 = a1 * a.p1.x + b1 * a.p1.y;

    let a2 = b.p2.y - b.p1.y;
    let b2 = b.p1.x - b.p2.x;
    let c2 = a2 * b.p1.x + b2 * b.p1.y;

    let det = a1 * b2 - a2 * b1;
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let point = Point::new((b2 * c1 - b1 * c2) / det, (a1 * c2 - a2 * c1) / det);
    point.is_finite().then_some(point)
}

/// Angle at vertex `b` between the rays `b→a` and `b→c`, in degrees `0..=180`.
///
/// A zero-length ray has no direction and yields `0.0`.
pub fn angle_between(a: &Point, b: &Point, c: &Point) -> f64 {
    let (ux, uy) = (a.x - b.x, a.y - b.y);
    let (vx, vy) = (c.x - b.x, c.y - b.y);
    let norm = ux.hypot(uy) * vx.hypot(vy);
    if norm == 0.0 || !norm.is_finite() {
        return 0.0;
    }
    let cos = ((ux * vx + uy * vy) / norm).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// True iff the four points, taken in order, turn the same way at every
/// vertex. Collinear or self-intersecting outlines are not convex.
pub fn is_convex(points: &[Point; 4]) -> bool {
    let mut positive = 0;
    let mut negative = 0;
    for i in 0..4 {
        let p0 = points[i];
        let p1 = points[(i + 1) % 4];
        let p2 = points[(i + 2) % 4];
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);
        if cross > 0.0 {
            positive += 1;
        } else if cross < 0.0 {
            negative += 1;
        }
    }
    positive == 4 || negative == 4
}

/// Shoelace area of a simple polygon. Winding direction does not matter.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    twice_area.abs() / 2.0
}

pub fn quad_area(quad: &Quad) -> f64 {
    polygon_area(&quad.corners)
}

/// Interior angles at top-left, top-right, bottom-right, bottom-left.
pub fn interior_angles(quad: &Quad) -> [f64; 4] {
    let c = &quad.corners;
    std::array::from_fn(|i| angle_between(&c[(i + 3) % 4], &c[i], &c[(i + 1) % 4]))
}

/// Side lengths in the order top, right, bottom, left.
pub fn side_lengths(quad: &Quad) -> [f64; 4] {
    let c = &quad.corners;
    std::array::from_fn(|i| c[i].distance_to(&c[(i + 1) % 4]))
}

/// Put four corners into top-left, top-right, bottom-right, bottom-left
/// order.
///
/// Points are sorted by `(y, x)`; the first two form the top edge and the
/// last two the bottom edge, each pair then sorted by `(x, y)`. Equal `y`
/// values are therefore split by `x`. For any convex set of corners the two
/// highest points are adjacent, so the result is convex too; a non-convex
/// result means the input was not a convex outline at all.
pub fn order_corners(points: [Point; 4]) -> [Point; 4] {
    let mut by_y = points;
    by_y.sort_by(|a, b| cmp_f64(a.y, b.y).then(cmp_f64(a.x, b.x)));

    let (mut top, mut bottom) = ([by_y[0], by_y[1]], [by_y[2], by_y[3]]);
    let by_x = |a: &Point, b: &Point| cmp_f64(a.x, b.x).then(cmp_f64(a.y, b.y));
    top.sort_by(by_x);
    bottom.sort_by(by_x);

    [top[0], top[1], bottom[1], bottom[0]]
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
