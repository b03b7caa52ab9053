// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanwerk-vision frame pipeline: per-frame quad
// selection from a cluttered line set, tracker updates, and Hough extraction
// on a small synthetic frame.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma};

use scanwerk_bridge::LineSource;
use scanwerk_core::types::{LineSegment, Point};
use scanwerk_vision::{FrameDetector, HoughLineSource, QuadTracker};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
    LineSegment::new(Point::new(x1, y1), Point::new(x2, y2))
}

/// A page outline plus frame borders and short clutter, enough to fill the
/// per-orientation line budget.
fn cluttered_lines() -> Vec<LineSegment> {
    let mut lines = vec![
        seg(0.0, 1.0, 640.0, 1.0),
        seg(0.0, 479.0, 640.0, 479.0),
        seg(1.0, 0.0, 1.0, 480.0),
        seg(639.0, 0.0, 639.0, 480.0),
        seg(40.0, 50.0, 600.0, 52.0),
        seg(40.0, 430.0, 600.0, 428.0),
        seg(60.0, 30.0, 62.0, 450.0),
        seg(580.0, 30.0, 578.0, 450.0),
    ];
    for i in 0..12 {
        let offset = 100.0 + i as f64 * 20.0;
        lines.push(seg(offset, 200.0, offset + 40.0, 203.0));
        lines.push(seg(300.0, offset, 302.0, offset + 30.0));
    }
    lines
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_process_frame(c: &mut Criterion) {
    let lines = cluttered_lines();
    let detector = FrameDetector::default();

    c.bench_function("process_frame (32 lines, 640x480)", |b| {
        b.iter(|| black_box(detector.process_frame(black_box(&lines), 640, 480)));
    });
}

fn bench_tracker(c: &mut Criterion) {
    let detection = FrameDetector::default().process_frame(&cluttered_lines(), 640, 480);

    c.bench_function("tracker update x30", |b| {
        b.iter(|| {
            let mut tracker = QuadTracker::default();
            for frame in 0..30 {
                black_box(tracker.update(black_box(&detection), frame as f64 * 33.0));
            }
        });
    });
}

/// Hough extraction on a 160x200 frame with a bright page on a dark desk.
fn bench_hough(c: &mut Criterion) {
    let frame = GrayImage::from_fn(160, 200, |x, y| {
        if (20..140).contains(&x) && (25..175).contains(&y) {
            Luma([240u8])
        } else {
            Luma([30u8])
        }
    });
    let source = HoughLineSource::default();

    c.bench_function("hough lines (160x200)", |b| {
        b.iter(|| black_box(source.detect_lines(black_box(&frame))));
    });
}

criterion_group!(benches, bench_process_frame, bench_tracker, bench_hough);
criterion_main!(benches);
