#[cfg(test)]
#[path = "calibration_test.rs"]
mod calibration_test;

use serde::{Deserialize, Serialize};

/// A point in either pixel or point space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Payload of the renderer's "page ready" event.
///
/// `pixel_*` is the size of the rasterized page image; `point_*` is the page
/// size in document points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageReady {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub point_width: f64,
    pub point_height: f64,
}

/// Pixel/point scale relationship for the currently rendered page.
///
/// All on-screen geometry is derived through this mapping. A zero (or
/// non-finite) point dimension is treated as `1` so the transform stays
/// defined before real page metrics arrive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub point_width: f64,
    pub point_height: f64,
}

impl Calibration {
    #[must_use]
    pub fn new(pixel_width: f64, pixel_height: f64, point_width: f64, point_height: f64) -> Self {
        Self { pixel_width, pixel_height, point_width, point_height }
    }

    /// Pixels per point along x.
    #[must_use]
    pub fn scale_x(&self) -> f64 {
        self.pixel_width / guard(self.point_width)
    }

    /// Pixels per point along y.
    #[must_use]
    pub fn scale_y(&self) -> f64 {
        self.pixel_height / guard(self.point_height)
    }

    /// Convert a point-space position to pixel space.
    #[must_use]
    pub fn to_pixel(&self, point: Point) -> Point {
        Point { x: point.x * self.scale_x(), y: point.y * self.scale_y() }
    }

    /// Convert a pixel-space position to point space.
    ///
    /// A zero pixel dimension makes the scale zero; the inverse then falls
    /// back to the identity on that axis instead of dividing by zero.
    #[must_use]
    pub fn to_point(&self, pixel: Point) -> Point {
        Point { x: pixel.x / guard(self.scale_x()), y: pixel.y / guard(self.scale_y()) }
    }
}

impl From<PageReady> for Calibration {
    fn from(ev: PageReady) -> Self {
        Self::new(ev.pixel_width, ev.pixel_height, ev.point_width, ev.point_height)
    }
}

fn guard(v: f64) -> f64 {
    if v.is_finite() && v.abs() > f64::EPSILON { v } else { 1.0 }
}
