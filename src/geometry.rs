// src/geometry.rs

//! Small 2D helpers: points, the 2x2 component transform, and the contour
//! classification tests (convexity and signed area).

use serde::Serialize;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }
}

/// Linear part of a component transform.
///
/// `x' = xx * x + xy * y`, `y' = yx * x + yy * y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Matrix2 {
    pub xx: f32,
    pub xy: f32,
    pub yx: f32,
    pub yy: f32,
}

impl Matrix2 {
    pub const IDENTITY: Self = Self { xx: 1.0, xy: 0.0, yx: 0.0, yy: 1.0 };

    pub fn apply(&self, p: Point2) -> Point2 {
        Point2::new(
            self.xx * p.x + self.xy * p.y,
            self.yx * p.x + self.yy * p.y,
        )
    }
}

impl Default for Matrix2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Shoelace area, positive for clockwise traversal with y pointing up
/// (the winding TrueType uses for outer contours).
pub fn signed_area(points: &[Point2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            (b.x - a.x) * (b.y + a.y)
        })
        .sum();
    0.5 * twice
}

/// True when the closed polygon is convex and simple.
///
/// Consecutive duplicate vertices are ignored. Every non-degenerate turn must
/// bend the same way and the turns must add up to exactly one revolution,
/// which rules out self-intersecting stars. Fewer than three distinct
/// vertices count as convex.
pub fn is_convex(points: &[Point2]) -> bool {
    let mut distinct: Vec<Point2> = Vec::with_capacity(points.len());
    for &p in points {
        if distinct.last() != Some(&p) {
            distinct.push(p);
        }
    }
    while distinct.len() > 1 && distinct.first() == distinct.last() {
        distinct.pop();
    }

    let n = distinct.len();
    if n < 3 {
        return true;
    }

    let mut sign = 0.0f32;
    let mut turning = 0.0f32;
    for i in 0..n {
        let a = distinct[i];
        let b = distinct[(i + 1) % n];
        let c = distinct[(i + 2) % n];
        let (e1x, e1y) = (b.x - a.x, b.y - a.y);
        let (e2x, e2y) = (c.x - b.x, c.y - b.y);
        let cross = e1x * e2y - e1y * e2x;
        let dot = e1x * e2x + e1y * e2y;

        if cross != 0.0 {
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        } else if dot < 0.0 {
            // The outline doubles back on itself.
            return false;
        }
        turning += cross.atan2(dot);
    }

    sign != 0.0 && (turning.abs() - TAU).abs() < 1e-3
}
