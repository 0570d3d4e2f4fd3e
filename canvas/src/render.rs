//! Rendering: draws the box overlay to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! The overlay canvas sits on top of the rasterized page image and has the
//! same pixel size, so everything here is drawn in page pixels with no
//! transform. It reads engine state and produces pixels; the only mutation
//! is refreshing the memoized layout.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::HANDLE_SIZE_PX;
use crate::engine::EngineCore;
use crate::geometry::ScreenRect;
use crate::hit::ResizeAnchor;

const PERSISTED_STROKE: &str = "#888";
const SELECTED_STROKE: &str = "#d22";
const SELECTED_FILL: &str = "rgba(255, 0, 0, 0.06)";
const EPHEMERAL_FILL: &str = "rgba(255, 0, 0, 0.10)";
const RUBBER_BAND_STROKE: &str = "#2a8";

/// Dash pattern for unselected persisted boxes, in pixels.
const PERSISTED_DASH: [f64; 2] = [4.0, 4.0];
/// Dash pattern for the rubber band, in pixels.
const RUBBER_BAND_DASH: [f64; 2] = [6.0, 4.0];

/// Box overlay look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxStyle {
    /// Saved and not selected: thin gray dashed outline.
    Persisted,
    /// The selected box, whatever its origin.
    Selected,
    /// Drawn locally and not yet saved.
    Ephemeral,
}

impl BoxStyle {
    #[must_use]
    pub fn of(persisted: bool, selected: bool) -> Self {
        match (persisted, selected) {
            (_, true) => Self::Selected,
            (true, false) => Self::Persisted,
            (false, false) => Self::Ephemeral,
        }
    }
}

/// Draw the overlay: every box on the current page, the live frame of a
/// drag or resize, the rubber band, and the handles of the selected box.
///
/// Nothing is drawn before the page is calibrated.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, core: &mut EngineCore) -> Result<(), JsValue> {
    let Some(cal) = core.calibration() else {
        return Ok(());
    };
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, cal.pixel_width, cal.pixel_height);

    let selected = core.selection();
    let active = core.active_frame();
    let layout = core.layout().to_vec();

    for b in &layout {
        let rect = match active {
            Some((id, frame)) if id == b.id => frame,
            _ => b.rect,
        };
        draw_box(ctx, rect, BoxStyle::of(b.persisted, selected == Some(b.id)))?;
    }

    if let Some(id) = selected {
        if core.is_draggable(&id) {
            let rect = match active {
                Some((active_id, frame)) if active_id == id => Some(frame),
                _ => core.screen_rect(&id),
            };
            if let Some(rect) = rect {
                draw_handles(ctx, rect);
            }
        }
    }

    if let Some(band) = core.rubber_band() {
        draw_rubber_band(ctx, band)?;
    }

    Ok(())
}

fn draw_box(ctx: &CanvasRenderingContext2d, rect: ScreenRect, style: BoxStyle) -> Result<(), JsValue> {
    ctx.save();
    match style {
        BoxStyle::Persisted => {
            set_dash(ctx, &PERSISTED_DASH)?;
            ctx.set_stroke_style_str(PERSISTED_STROKE);
            ctx.set_line_width(1.0);
        }
        BoxStyle::Selected => {
            ctx.set_fill_style_str(SELECTED_FILL);
            ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            ctx.set_stroke_style_str(SELECTED_STROKE);
            ctx.set_line_width(2.0);
        }
        BoxStyle::Ephemeral => {
            ctx.set_fill_style_str(EPHEMERAL_FILL);
            ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            ctx.set_stroke_style_str(SELECTED_STROKE);
            ctx.set_line_width(1.5);
        }
    }
    ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
    ctx.restore();
    Ok(())
}

fn draw_handles(ctx: &CanvasRenderingContext2d, rect: ScreenRect) {
    let half = HANDLE_SIZE_PX * 0.5;
    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.set_stroke_style_str(SELECTED_STROKE);
    ctx.set_line_width(1.0);
    for anchor in ResizeAnchor::ALL {
        let p = anchor.position(&rect);
        ctx.fill_rect(p.x - half, p.y - half, HANDLE_SIZE_PX, HANDLE_SIZE_PX);
        ctx.stroke_rect(p.x - half, p.y - half, HANDLE_SIZE_PX, HANDLE_SIZE_PX);
    }
    ctx.restore();
}

fn draw_rubber_band(ctx: &CanvasRenderingContext2d, band: ScreenRect) -> Result<(), JsValue> {
    ctx.save();
    set_dash(ctx, &RUBBER_BAND_DASH)?;
    ctx.set_stroke_style_str(RUBBER_BAND_STROKE);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(band.x, band.y, band.w, band.h);
    ctx.restore();
    Ok(())
}

fn set_dash(ctx: &CanvasRenderingContext2d, pattern: &[f64]) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    for seg in pattern {
        dash_array.push(&(*seg).into());
    }
    ctx.set_line_dash(&dash_array)
}
