//! Page navigation and rasterization zoom.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use crate::config::EngineConfig;

/// Which page is shown and at what zoom it is rasterized.
///
/// Changing either asks the renderer for a new page image; the engine
/// recalibrates when that image is reported ready.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageNav {
    pub page_count: usize,
    pub page_index: usize,
    pub zoom: f64,
}

impl PageNav {
    #[must_use]
    pub fn new(zoom: f64) -> Self {
        Self { page_count: 0, page_index: 0, zoom }
    }

    /// Reset to the first page of a document with `page_count` pages.
    pub fn open(&mut self, page_count: usize, zoom: f64) {
        self.page_count = page_count;
        self.page_index = 0;
        self.zoom = zoom;
    }

    /// Jump to `page`, clamped to the document. Returns true if the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        let target = page.min(self.page_count.saturating_sub(1));
        if target == self.page_index {
            return false;
        }
        self.page_index = target;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to(self.page_index + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to(self.page_index.saturating_sub(1))
    }

    /// Step the zoom up. Returns true if the zoom changed.
    pub fn zoom_in(&mut self, cfg: &EngineConfig) -> bool {
        self.zoom += cfg.zoom_step;
        true
    }

    /// Step the zoom down, never below the configured minimum.
    pub fn zoom_out(&mut self, cfg: &EngineConfig) -> bool {
        let next = (self.zoom - cfg.zoom_step).max(cfg.min_zoom);
        if (next - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = next;
        true
    }
}
