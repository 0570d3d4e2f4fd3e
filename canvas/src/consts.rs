//! Shared numeric constants for the canvas crate.

// ── Gestures ────────────────────────────────────────────────────

/// A drawn rubber band must exceed this size in pixels on both axes to
/// become a box. Smaller drags are clicks.
pub const DRAW_THRESHOLD_PX: f64 = 4.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Side length of a drawn resize handle square, in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 8.0;

// ── Page view ───────────────────────────────────────────────────

/// Rasterization zoom used when a document is first opened.
pub const DEFAULT_ZOOM: f64 = 1.5;

/// Zoom increment applied by one zoom-in / zoom-out step.
pub const ZOOM_STEP: f64 = 0.25;

/// Lowest zoom reachable with zoom-out.
pub const MIN_ZOOM: f64 = 0.5;
