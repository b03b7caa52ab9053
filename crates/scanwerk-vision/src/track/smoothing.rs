// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use scanwerk_core::types::{Point, Quad};

/// Per-coordinate exponential moving average of two quads.
///
/// `alpha` is the weight of `next`: `1.0` returns `next`, `0.0` returns
/// `prev`. A missing side yields the other one unchanged.
pub fn ema_quad(prev: Option<&Quad>, next: Option<&Quad>, alpha: f64) -> Option<Quad> {
    match (prev, next) {
        (Some(prev), Some(next)) => Some(Quad::new(std::array::from_fn(|i| {
            lerp_point(prev.corners[i], next.corners[i], alpha)
        }))),
        (None, next) => next.copied(),
        (prev, None) => prev.copied(),
    }
}

fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x * (1.0 - t) + b.x * t, a.y * (1.0 - t) + b.y * t)
}
