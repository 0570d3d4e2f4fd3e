//! Engine tuning knobs.
//!
//! Everything here has a sensible default in [`crate::consts`]; hosts only
//! build a custom [`EngineConfig`] when they need different gesture slop or
//! zoom behaviour.

use crate::consts::{DEFAULT_ZOOM, DRAW_THRESHOLD_PX, HANDLE_RADIUS_PX, MIN_ZOOM, ZOOM_STEP};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Minimum rubber-band width and height, in pixels, for a draw to create a box.
    pub draw_threshold_px: f64,
    /// Hit slop around resize handles, in pixels.
    pub handle_radius_px: f64,
    /// Zoom used for a freshly opened document.
    pub default_zoom: f64,
    /// Zoom change per zoom-in / zoom-out step.
    pub zoom_step: f64,
    /// Zoom-out never goes below this.
    pub min_zoom: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            draw_threshold_px: DRAW_THRESHOLD_PX,
            handle_radius_px: HANDLE_RADIUS_PX,
            default_zoom: DEFAULT_ZOOM,
            zoom_step: ZOOM_STEP,
            min_zoom: MIN_ZOOM,
        }
    }
}
