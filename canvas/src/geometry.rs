//! Box geometry: canonical point-space rectangles and their screen projection.
//!
//! Point space is the single source of truth. [`BBox`] keeps its corners in
//! canonical min/max order on every construction, including deserialization,
//! so nothing downstream has to re-check. Screen rectangles ([`ScreenRect`])
//! are a projection through the current [`Calibration`] and are only ever
//! written back after going through [`to_bbox`].
//!
//! [`LayoutCache`] memoizes the projection of one page's boxes, keyed on the
//! store revision, the page index and the calibration.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::calibration::{Calibration, Point};
use crate::doc::{BoxId, BoxStore};

/// A rectangle in point space, always in canonical `x0 <= x1`, `y0 <= y1` form.
///
/// On the wire this is the tuple `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl BBox {
    /// Build a box from any two opposite corner coordinates.
    ///
    /// A NaN coordinate is kept as is so that [`BBox::is_finite`] still sees it.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let (x0, x1) = if x1 < x0 { (x1, x0) } else { (x0, x1) };
        let (y0, y1) = if y1 < y0 { (y1, y0) } else { (y0, y1) };
        Self { x0, y0, x1, y1 }
    }

    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    #[must_use]
    pub fn x0(&self) -> f64 {
        self.x0
    }

    #[must_use]
    pub fn y0(&self) -> f64 {
        self.y0
    }

    #[must_use]
    pub fn x1(&self) -> f64 {
        self.x1
    }

    #[must_use]
    pub fn y1(&self) -> f64 {
        self.y1
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Inclusive containment: points on the edge are inside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.x0 <= p.x && p.x <= self.x1 && self.y0 <= p.y && p.y <= self.y1
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    #[must_use]
    pub fn to_array(self) -> [f64; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

impl From<[f64; 4]> for BBox {
    fn from([x0, y0, x1, y1]: [f64; 4]) -> Self {
        Self::new(x0, y0, x1, y1)
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        b.to_array()
    }
}

/// An on-screen rectangle in pixels. `w` and `h` are never negative when
/// produced by this module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ScreenRect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The min/max rectangle spanned by two pixel positions.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self { x: a.x.min(b.x), y: a.y.min(b.y), w: (b.x - a.x).abs(), h: (b.y - a.y).abs() }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.x <= p.x && p.x <= self.right() && self.y <= p.y && p.y <= self.bottom()
    }
}

/// Position and size of a rendered box node at the end of a drag or
/// transform.
///
/// Resize handles change the scale factors rather than the nominal size, so
/// the real on-screen size is `width * scale_x` by `height * scale_y`. Either
/// scale may be negative when a handle was dragged past the opposite edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl NodeFrame {
    #[must_use]
    pub fn from_rect(rect: ScreenRect) -> Self {
        Self { x: rect.x, y: rect.y, width: rect.w, height: rect.h, scale_x: 1.0, scale_y: 1.0 }
    }

    /// Fold the scale factors into the size and return the canonical
    /// rectangle. The frame is rewritten in place to that rectangle with
    /// unit scale, so a following transform starts from real dimensions.
    pub fn normalize(&mut self) -> ScreenRect {
        let w = self.width * self.scale_x;
        let h = self.height * self.scale_y;
        let rect = ScreenRect::from_corners(Point::new(self.x, self.y), Point::new(self.x + w, self.y + h));
        *self = Self::from_rect(rect);
        rect
    }
}

/// Project a point-space box to its on-screen rectangle.
#[must_use]
pub fn to_screen(cal: &Calibration, bbox: &BBox) -> ScreenRect {
    let p0 = cal.to_pixel(Point::new(bbox.x0, bbox.y0));
    let p1 = cal.to_pixel(Point::new(bbox.x1, bbox.y1));
    ScreenRect::from_corners(p0, p1)
}

/// Convert an on-screen rectangle back to canonical point space.
#[must_use]
pub fn to_bbox(cal: &Calibration, rect: &ScreenRect) -> BBox {
    let p0 = cal.to_point(Point::new(rect.x, rect.y));
    let p1 = cal.to_point(Point::new(rect.right(), rect.bottom()));
    BBox::from_corners(p0, p1)
}

/// One projected box of the current page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBox {
    pub id: BoxId,
    pub rect: ScreenRect,
    /// Whether the box is owned by an external record.
    pub persisted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutKey {
    revision: u64,
    page: usize,
    calibration: Calibration,
}

/// Memoized screen projection of one page's boxes.
///
/// The projection is rebuilt only when the store revision, the page index or
/// the calibration differ from the previous call.
#[derive(Debug, Default)]
pub struct LayoutCache {
    key: Option<LayoutKey>,
    boxes: Vec<ScreenBox>,
    builds: u64,
}

impl LayoutCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen boxes for `page`, persisted first, then ephemeral, each in list order.
    pub fn get(&mut self, store: &BoxStore, page: usize, cal: &Calibration) -> &[ScreenBox] {
        let key = LayoutKey { revision: store.revision(), page, calibration: *cal };
        if self.key != Some(key) {
            self.boxes = store
                .on_page(page)
                .into_iter()
                .map(|b| ScreenBox { id: b.id, rect: to_screen(cal, &b.bbox), persisted: b.is_persisted() })
                .collect();
            self.key = Some(key);
            self.builds += 1;
        }
        &self.boxes
    }

    /// How many times the projection has been rebuilt.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Drop the memoized projection.
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
