//! Hit-testing: resize handles, box bodies, and click-through selection.
//!
//! Two kinds of hit test live here. Pixel-space tests ([`hit_handle`],
//! [`top_box_at`]) decide what a pointer-down grabs. The point-space test
//! ([`hits_at`]) collects every box under a click so that [`cycle`] can walk
//! through a stack of overlapping boxes one click at a time.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::{Deserialize, Serialize};

use crate::calibration::Point;
use crate::doc::{BoxId, BoxStore};
use crate::geometry::{NodeFrame, ScreenBox, ScreenRect};

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [Self; 8] = [Self::Nw, Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W];

    fn moves_left(self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }

    /// Pixel position of this handle on `rect`.
    #[must_use]
    pub fn position(self, rect: &ScreenRect) -> Point {
        let x = if self.moves_left() {
            rect.x
        } else if self.moves_right() {
            rect.right()
        } else {
            rect.x + rect.w * 0.5
        };
        let y = if self.moves_top() {
            rect.y
        } else if self.moves_bottom() {
            rect.bottom()
        } else {
            rect.y + rect.h * 0.5
        };
        Point::new(x, y)
    }

    /// Node frame after dragging this handle by `(dx, dy)` pixels from `origin`.
    ///
    /// The nominal size stays at the original size and the change is carried
    /// in the scale factors, which go negative when an edge crosses its
    /// opposite. A zero-sized origin axis keeps unit scale and takes the new
    /// span as its size instead.
    #[must_use]
    pub fn resize(self, origin: &ScreenRect, dx: f64, dy: f64) -> NodeFrame {
        let mut left = origin.x;
        let mut right = origin.right();
        let mut top = origin.y;
        let mut bottom = origin.bottom();
        if self.moves_left() {
            left += dx;
        }
        if self.moves_right() {
            right += dx;
        }
        if self.moves_top() {
            top += dy;
        }
        if self.moves_bottom() {
            bottom += dy;
        }
        let (width, scale_x) = scaled_span(origin.w, right - left);
        let (height, scale_y) = scaled_span(origin.h, bottom - top);
        NodeFrame { x: left, y: top, width, height, scale_x, scale_y }
    }
}

fn scaled_span(nominal: f64, span: f64) -> (f64, f64) {
    if nominal.abs() > f64::EPSILON { (nominal, span / nominal) } else { (span, 1.0) }
}

/// Which resize handle of `rect`, if any, lies within `radius` pixels of `pt`.
#[must_use]
pub fn hit_handle(rect: &ScreenRect, pt: Point, radius: f64) -> Option<ResizeAnchor> {
    ResizeAnchor::ALL.into_iter().find(|a| {
        let h = a.position(rect);
        (h.x - pt.x).abs() <= radius && (h.y - pt.y).abs() <= radius
    })
}

/// Top-most box whose screen rectangle contains `pt`. Later entries are drawn above earlier ones.
#[must_use]
pub fn top_box_at(layout: &[ScreenBox], pt: Point) -> Option<BoxId> {
    layout.iter().rev().find(|b| b.rect.contains(pt)).map(|b| b.id)
}

/// Every box on `page` containing the point-space position `pt`: persisted
/// first, then ephemeral, each in list order. Bounds are inclusive.
#[must_use]
pub fn hits_at(store: &BoxStore, page: usize, pt: Point) -> Vec<BoxId> {
    store
        .on_page(page)
        .into_iter()
        .filter(|b| b.bbox.contains(pt))
        .map(|b| b.id)
        .collect()
}

/// Next selection after a click that hit `hits`.
///
/// If `current` is among the hits, the following hit is chosen, wrapping to
/// the first after the last. Otherwise the first hit is chosen. No hits
/// means no selection.
#[must_use]
pub fn cycle(hits: &[BoxId], current: Option<BoxId>) -> Option<BoxId> {
    let first = hits.first().copied()?;
    let Some(pos) = current.and_then(|c| hits.iter().position(|h| *h == c)) else {
        return Some(first);
    };
    hits.get((pos + 1) % hits.len()).copied()
}
