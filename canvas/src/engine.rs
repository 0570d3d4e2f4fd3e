use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::bridge::{self, BoxRecord, BridgeError, DetectionCandidate, PersistedBoxRecord};
use crate::calibration::{Calibration, PageReady, Point};
use crate::config::EngineConfig;
use crate::doc::{BoxId, BoxStore, Origin, OwnerId, PageBox};
use crate::geometry::{self, BBox, LayoutCache, NodeFrame, ScreenBox, ScreenRect};
use crate::hit;
use crate::input::{Button, InputState, Key, Target, UiState};
use crate::nav::PageNav;
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Intents returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Action {
    /// A new ephemeral box was drawn or imported; it has no owner yet.
    BoxCreated(PageBox),
    /// A box was moved or resized. Emitted for persisted boxes only.
    BoxGeometryChanged { id: BoxId, bbox: BBox },
    /// The user asked to delete a persisted box. The box stays until a
    /// snapshot without it arrives.
    BoxDeleteRequested { id: BoxId, owner_id: OwnerId, index_in_owner: usize },
    /// The active selection changed. `owner_id` is set for persisted boxes.
    SelectionChanged { id: Option<BoxId>, owner_id: Option<OwnerId> },
    /// The renderer should rasterize `page` at `zoom` and report back with a page-ready event.
    PageRequested { page: usize, zoom: f64 },
    RenderNeeded,
}

/// Ephemeral boxes handed over for an external save.
#[derive(Debug, Clone, Default)]
pub struct Commit {
    /// Page and point-space rectangle of every committed box, in creation order.
    pub boxes: Vec<BoxRecord>,
    pub actions: Vec<Action>,
}

/// Per-page box counts for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCounts {
    pub persisted: usize,
    pub ephemeral: usize,
}

/// Engine state and logic that does not touch the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: BoxStore,
    pub ui: UiState,
    pub input: InputState,
    pub nav: PageNav,
    pub config: EngineConfig,
    calibration: Option<Calibration>,
    layout: LayoutCache,
    /// Set when a gesture finished with a mutation so the trailing click is ignored.
    suppress_click: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            doc: BoxStore::new(),
            ui: UiState::default(),
            input: InputState::default(),
            nav: PageNav::new(config.default_zoom),
            config,
            calibration: None,
            layout: LayoutCache::new(),
            suppress_click: false,
        }
    }

    // --- Data inputs ---

    /// Recalibrate from the renderer's page-ready event.
    ///
    /// Any gesture in flight is dropped: its pixel positions belong to the
    /// old calibration.
    pub fn page_ready(&mut self, ev: PageReady) -> Vec<Action> {
        if !self.input.is_idle() {
            tracing::debug!("calibration changed mid-gesture; gesture reset");
            self.input = InputState::Idle;
        }
        self.calibration = Some(Calibration::from(ev));
        tracing::debug!(
            pixel_width = ev.pixel_width,
            pixel_height = ev.pixel_height,
            point_width = ev.point_width,
            point_height = ev.point_height,
            "page ready"
        );
        vec![Action::RenderNeeded]
    }

    /// Swap the full persisted-box list for an authoritative snapshot.
    ///
    /// Optimistic local edits to persisted boxes are discarded. A selected
    /// box that is missing from the snapshot or now lies on another page is
    /// deselected, and a drag or resize of such a box is abandoned.
    pub fn replace_snapshot(&mut self, entries: Vec<PersistedBoxRecord>) -> Vec<Action> {
        let total = entries.len();
        let boxes: Vec<PageBox> = entries
            .into_iter()
            .filter(|e| {
                let finite = e.bbox.is_finite();
                if !finite {
                    tracing::warn!(owner_id = %e.owner_id, index = e.index_in_owner, "non-finite box dropped from snapshot");
                }
                finite
            })
            .map(PersistedBoxRecord::into_page_box)
            .collect();
        self.doc.replace_persisted(boxes);
        tracing::info!(boxes = total, "persisted snapshot replaced");

        let mut actions = Vec::new();
        if let Some(id) = self.ui.selected_id {
            if !self.on_current_page(&id) {
                actions.extend(self.set_selection(None));
            }
        }
        if let Some(id) = self.input.active_box() {
            if !self.on_current_page(&id) {
                tracing::debug!(%id, "gesture target left the page in snapshot; gesture reset");
                self.input = InputState::Idle;
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Replace the snapshot from a JSON array of snapshot entries.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if the payload does not decode or carries a
    /// non-finite coordinate; the engine is left untouched.
    pub fn load_snapshot_json(&mut self, json: &str) -> Result<Vec<Action>, BridgeError> {
        let entries = bridge::parse_snapshot(json)?;
        Ok(self.replace_snapshot(entries))
    }

    /// Replace the snapshot from a JSON array of annotation records.
    ///
    /// # Errors
    ///
    /// Same as [`EngineCore::load_snapshot_json`].
    pub fn load_records_json(&mut self, json: &str) -> Result<Vec<Action>, BridgeError> {
        let entries = bridge::parse_records(json)?;
        Ok(self.replace_snapshot(entries))
    }

    /// Start a new document of `page_count` pages. All boxes, the selection
    /// and the calibration are dropped; the first page is requested.
    pub fn open_document(&mut self, page_count: usize) -> Vec<Action> {
        let mut actions = self.set_selection(None);
        self.doc = BoxStore::new();
        self.layout.invalidate();
        self.input = InputState::Idle;
        self.suppress_click = false;
        self.calibration = None;
        self.nav.open(page_count, self.config.default_zoom);
        tracing::info!(page_count, "document opened");
        actions.push(self.page_request());
        actions
    }

    // --- Page navigation ---

    /// Show page `page` (clamped to the document).
    pub fn set_page(&mut self, page: usize) -> Vec<Action> {
        if self.nav.go_to(page) {
            self.page_changed()
        } else {
            Vec::new()
        }
    }

    pub fn next_page(&mut self) -> Vec<Action> {
        if self.nav.next_page() {
            self.page_changed()
        } else {
            Vec::new()
        }
    }

    pub fn prev_page(&mut self) -> Vec<Action> {
        if self.nav.prev_page() {
            self.page_changed()
        } else {
            Vec::new()
        }
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        if self.nav.zoom_in(&self.config) {
            self.zoom_changed()
        } else {
            Vec::new()
        }
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        if self.nav.zoom_out(&self.config) {
            self.zoom_changed()
        } else {
            Vec::new()
        }
    }

    fn page_changed(&mut self) -> Vec<Action> {
        let mut actions = self.set_selection(None);
        self.input = InputState::Idle;
        self.suppress_click = false;
        actions.push(self.page_request());
        actions.push(Action::RenderNeeded);
        actions
    }

    fn zoom_changed(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        vec![self.page_request()]
    }

    fn page_request(&self) -> Action {
        Action::PageRequested { page: self.nav.page_index, zoom: self.nav.zoom }
    }

    // --- Ephemeral lifecycle ---

    /// Hand every ephemeral box over for an external save. The boxes leave
    /// the engine; they come back as persisted boxes in the next snapshot.
    pub fn commit_ephemeral(&mut self) -> Commit {
        let drained = self.doc.drain_ephemeral();
        let mut actions = Vec::new();
        if let Some(id) = self.ui.selected_id {
            if drained.iter().any(|b| b.id == id) {
                actions.extend(self.set_selection(None));
            }
        }
        if !drained.is_empty() {
            tracing::info!(boxes = drained.len(), "ephemeral boxes committed");
            actions.push(Action::RenderNeeded);
        }
        Commit { boxes: drained.iter().map(BoxRecord::from).collect(), actions }
    }

    /// Discard every ephemeral box.
    pub fn clear_ephemeral(&mut self) -> Vec<Action> {
        let commit = self.commit_ephemeral();
        if !commit.boxes.is_empty() {
            tracing::debug!(boxes = commit.boxes.len(), "ephemeral boxes cleared");
        }
        commit.actions
    }

    /// Add detection candidates for `page` as ephemeral boxes.
    pub fn import_candidates(&mut self, page: usize, candidates: &[DetectionCandidate]) -> Vec<Action> {
        let mut actions = Vec::new();
        for c in candidates {
            if !c.bbox.is_finite() {
                tracing::warn!(page, "non-finite detection candidate skipped");
                continue;
            }
            let id = self.doc.insert_ephemeral(page, c.bbox);
            if let Some(b) = self.doc.get(&id) {
                actions.push(Action::BoxCreated(b.clone()));
            }
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Pointer input ---

    /// Classify a pixel position: resize handles of the selected draggable
    /// box first, then the top-most box body, otherwise the background.
    pub fn classify(&mut self, pt: Point) -> Target {
        let radius = self.config.handle_radius_px;
        if let Some(id) = self.ui.selected_id {
            if self.is_draggable(&id) {
                if let Some(rect) = self.screen_rect(&id) {
                    if let Some(anchor) = hit::hit_handle(&rect, pt, radius) {
                        return Target::Handle { id, anchor };
                    }
                }
            }
        }
        match hit::top_box_at(self.layout(), pt) {
            Some(id) => Target::Box { id },
            None => Target::Background,
        }
    }

    pub fn on_pointer_down(&mut self, pt: Point, target: Target, button: Button) -> Vec<Action> {
        if self.calibration.is_none() {
            tracing::warn!("pointer-down before page calibration ignored");
            return Vec::new();
        }
        if !self.input.is_idle() {
            tracing::debug!("pointer-down during active gesture ignored");
            return Vec::new();
        }
        if button != Button::Primary {
            return Vec::new();
        }
        self.suppress_click = false;

        match target {
            Target::Background => {
                self.input = InputState::Drawing { anchor: pt, current: pt };
            }
            Target::Box { id } => {
                let Some(origin) = self.grab(&id) else {
                    return Vec::new();
                };
                self.input =
                    InputState::Dragging { id, start: pt, origin, frame: NodeFrame::from_rect(origin), moved: false };
            }
            Target::Handle { id, anchor } => {
                let Some(origin) = self.grab(&id) else {
                    return Vec::new();
                };
                self.input = InputState::Transforming {
                    id,
                    anchor,
                    start: pt,
                    origin,
                    frame: NodeFrame::from_rect(origin),
                    moved: false,
                };
            }
        }
        tracing::debug!(state = ?self.input, "gesture started");
        vec![Action::RenderNeeded]
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        match &mut self.input {
            InputState::Idle => return Vec::new(),
            InputState::Drawing { current, .. } => *current = pt,
            InputState::Dragging { start, origin, frame, moved, .. } => {
                frame.x = origin.x + (pt.x - start.x);
                frame.y = origin.y + (pt.y - start.y);
                *moved |= pt != *start;
            }
            InputState::Transforming { anchor, start, origin, frame, moved, .. } => {
                *frame = anchor.resize(origin, pt.x - start.x, pt.y - start.y);
                *moved |= pt != *start;
            }
        }
        vec![Action::RenderNeeded]
    }

    /// Finish the current gesture. The gesture state is always back to idle afterwards.
    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Drawing { anchor, .. } => self.finish_draw(anchor, pt),
            InputState::Dragging { id, start, origin, moved, .. } => {
                if !moved && pt == start {
                    return vec![Action::RenderNeeded];
                }
                let mut frame = NodeFrame::from_rect(origin);
                frame.x += pt.x - start.x;
                frame.y += pt.y - start.y;
                self.suppress_click = true;
                self.apply_node_frame(&id, &mut frame)
            }
            InputState::Transforming { id, anchor, start, origin, moved, .. } => {
                if !moved && pt == start {
                    return vec![Action::RenderNeeded];
                }
                let mut frame = anchor.resize(&origin, pt.x - start.x, pt.y - start.y);
                self.suppress_click = true;
                self.apply_node_frame(&id, &mut frame)
            }
        }
    }

    /// Write a box node's final on-screen frame back into point space.
    ///
    /// The frame's scale is folded into its size and reset to 1. The box
    /// keeps its id. Ephemeral boxes are updated in place; persisted boxes
    /// are updated optimistically and a geometry-changed intent is emitted.
    /// Unknown boxes are ignored.
    pub fn apply_node_frame(&mut self, id: &BoxId, frame: &mut NodeFrame) -> Vec<Action> {
        let Some(cal) = self.calibration else {
            tracing::warn!(%id, "box geometry before page calibration ignored");
            return Vec::new();
        };
        let Some(persisted) = self.doc.get(id).map(PageBox::is_persisted) else {
            tracing::warn!(%id, "geometry for unknown box ignored");
            return Vec::new();
        };
        let rect = frame.normalize();
        let bbox = geometry::to_bbox(&cal, &rect);
        self.doc.set_bbox(id, bbox);
        tracing::debug!(%id, ?bbox, persisted, "box geometry updated");

        let mut actions = Vec::new();
        if persisted {
            actions.push(Action::BoxGeometryChanged { id: *id, bbox });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Resolve a click to a selection, cycling through stacked boxes.
    ///
    /// Clicks on resize handles, and the click that trails a gesture which
    /// created or moved a box, are ignored.
    pub fn on_click(&mut self, pt: Point, target: Target) -> Vec<Action> {
        if std::mem::take(&mut self.suppress_click) {
            tracing::debug!("click after completed gesture ignored");
            return Vec::new();
        }
        let Some(cal) = self.calibration else {
            return Vec::new();
        };
        if !self.input.is_idle() || matches!(target, Target::Handle { .. }) {
            return Vec::new();
        }
        let hits = hit::hits_at(&self.doc, self.nav.page_index, cal.to_point(pt));
        let next = hit::cycle(&hits, self.ui.selected_id);
        let mut actions = self.set_selection(next);
        if actions.is_empty() {
            actions.push(self.selection_action());
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if !key.is_delete() {
            return Vec::new();
        }
        let Some(id) = self.ui.selected_id else {
            return Vec::new();
        };
        let origin = self.doc.get(&id).map(|b| b.origin.clone());
        let mut actions = Vec::new();
        match origin {
            Some(Origin::Persisted { owner_id, index_in_owner }) => {
                tracing::info!(%id, %owner_id, index_in_owner, "delete requested for persisted box");
                actions.push(Action::BoxDeleteRequested { id, owner_id, index_in_owner });
            }
            Some(Origin::Ephemeral) => {
                self.doc.remove_ephemeral(&id);
                tracing::debug!(%id, "ephemeral box deleted");
            }
            None => {}
        }
        actions.extend(self.set_selection(None));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn finish_draw(&mut self, anchor: Point, end: Point) -> Vec<Action> {
        let rect = ScreenRect::from_corners(anchor, end);
        let threshold = self.config.draw_threshold_px;
        let Some(cal) = self.calibration else {
            return Vec::new();
        };
        if rect.w <= threshold || rect.h <= threshold {
            tracing::debug!(w = rect.w, h = rect.h, "sub-threshold draw discarded");
            return vec![Action::RenderNeeded];
        }
        let bbox = geometry::to_bbox(&cal, &rect);
        let id = self.doc.insert_ephemeral(self.nav.page_index, bbox);
        self.suppress_click = true;
        tracing::debug!(%id, ?bbox, page = self.nav.page_index, "box drawn");

        let mut actions = Vec::new();
        if let Some(b) = self.doc.get(&id) {
            actions.push(Action::BoxCreated(b.clone()));
        }
        self.ui.selected_id = Some(id);
        actions.push(self.selection_action());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Screen rectangle of a box that may be dragged right now.
    fn grab(&self, id: &BoxId) -> Option<ScreenRect> {
        if !self.is_draggable(id) {
            tracing::debug!(%id, "box is read-only until selected");
            return None;
        }
        self.screen_rect(id)
    }

    /// Change the selection, returning the intent if it actually changed.
    fn set_selection(&mut self, id: Option<BoxId>) -> Vec<Action> {
        if self.ui.selected_id == id {
            return Vec::new();
        }
        self.ui.selected_id = id;
        vec![self.selection_action()]
    }

    fn selection_action(&self) -> Action {
        let id = self.ui.selected_id;
        let owner_id = id.and_then(|id| self.doc.get(&id)).and_then(|b| b.owner_id().map(str::to_owned));
        Action::SelectionChanged { id, owner_id }
    }

    // --- Queries ---

    /// The currently selected box id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<BoxId> {
        self.ui.selected_id
    }

    /// The currently selected box, if any.
    #[must_use]
    pub fn selected_box(&self) -> Option<&PageBox> {
        self.ui.selected_id.and_then(|id| self.doc.get(&id))
    }

    /// Look up a box by id.
    #[must_use]
    pub fn get_box(&self, id: &BoxId) -> Option<&PageBox> {
        self.doc.get(id)
    }

    /// Whether a pointer-down on this box starts a drag: any ephemeral box,
    /// or the selected persisted box, as long as it is on the current page.
    #[must_use]
    pub fn is_draggable(&self, id: &BoxId) -> bool {
        self.doc.get(id).is_some_and(|b| {
            b.page == self.nav.page_index && (!b.is_persisted() || self.ui.selected_id == Some(*id))
        })
    }

    fn on_current_page(&self, id: &BoxId) -> bool {
        self.doc.get(id).is_some_and(|b| b.page == self.nav.page_index)
    }

    #[must_use]
    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    /// Current page index.
    #[must_use]
    pub fn page(&self) -> usize {
        self.nav.page_index
    }

    /// Box counts on the current page.
    #[must_use]
    pub fn page_counts(&self) -> PageCounts {
        let boxes = self.doc.on_page(self.nav.page_index);
        let persisted = boxes.iter().filter(|b| b.is_persisted()).count();
        PageCounts { persisted, ephemeral: boxes.len() - persisted }
    }

    /// Persisted boxes of one record in index order, with their current geometry.
    #[must_use]
    pub fn record_boxes(&self, owner_id: &str) -> Vec<BoxRecord> {
        self.doc.owner_boxes(owner_id).into_iter().map(BoxRecord::from).collect()
    }

    /// Rubber-band rectangle of a draw in progress.
    #[must_use]
    pub fn rubber_band(&self) -> Option<ScreenRect> {
        match self.input {
            InputState::Drawing { anchor, current } => Some(ScreenRect::from_corners(anchor, current)),
            _ => None,
        }
    }

    /// Live on-screen rectangle of a box being dragged or resized.
    #[must_use]
    pub fn active_frame(&self) -> Option<(BoxId, ScreenRect)> {
        match &self.input {
            InputState::Dragging { id, frame, .. } | InputState::Transforming { id, frame, .. } => {
                let mut f = *frame;
                Some((*id, f.normalize()))
            }
            InputState::Idle | InputState::Drawing { .. } => None,
        }
    }

    /// Screen rectangle of a box under the current calibration.
    #[must_use]
    pub fn screen_rect(&self, id: &BoxId) -> Option<ScreenRect> {
        let cal = self.calibration?;
        self.doc.get(id).map(|b| geometry::to_screen(&cal, &b.bbox))
    }

    /// Screen boxes of the current page; empty until the first page-ready event.
    pub fn layout(&mut self) -> &[ScreenBox] {
        let Some(cal) = self.calibration else {
            return &[];
        };
        self.layout.get(&self.doc, self.nav.page_index, &cal)
    }

    /// How many times the screen layout has been rebuilt.
    #[must_use]
    pub fn layout_builds(&self) -> u64 {
        self.layout.builds()
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the overlay canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EngineCore::new() }
    }

    #[must_use]
    pub fn with_config(canvas: HtmlCanvasElement, config: EngineConfig) -> Self {
        Self { canvas, core: EngineCore::with_config(config) }
    }

    // --- Delegated data inputs ---

    /// Recalibrate and size the overlay backing store to the page image.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn page_ready(&mut self, ev: PageReady) -> Vec<Action> {
        self.canvas.set_width(ev.pixel_width.max(0.0).round() as u32);
        self.canvas.set_height(ev.pixel_height.max(0.0).round() as u32);
        self.core.page_ready(ev)
    }

    pub fn replace_snapshot(&mut self, entries: Vec<PersistedBoxRecord>) -> Vec<Action> {
        self.core.replace_snapshot(entries)
    }

    /// See [`EngineCore::load_snapshot_json`].
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if the payload does not decode.
    pub fn load_snapshot_json(&mut self, json: &str) -> Result<Vec<Action>, BridgeError> {
        self.core.load_snapshot_json(json)
    }

    /// See [`EngineCore::load_records_json`].
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if the payload does not decode.
    pub fn load_records_json(&mut self, json: &str) -> Result<Vec<Action>, BridgeError> {
        self.core.load_records_json(json)
    }

    pub fn open_document(&mut self, page_count: usize) -> Vec<Action> {
        self.core.open_document(page_count)
    }

    pub fn set_page(&mut self, page: usize) -> Vec<Action> {
        self.core.set_page(page)
    }

    pub fn commit_ephemeral(&mut self) -> Commit {
        self.core.commit_ephemeral()
    }

    pub fn clear_ephemeral(&mut self) -> Vec<Action> {
        self.core.clear_ephemeral()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Vec<Action> {
        let target = self.core.classify(pt);
        self.core.on_pointer_down(pt, target, button)
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(pt)
    }

    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        self.core.on_pointer_up(pt)
    }

    pub fn on_click(&mut self, pt: Point) -> Vec<Action> {
        let target = self.core.classify(pt);
        self.core.on_click(pt, target)
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        self.core.on_key_down(key)
    }

    // --- Render ---

    /// Draw the box overlay to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        render::draw(&ctx, &mut self.core)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<BoxId> {
        self.core.selection()
    }

    #[must_use]
    pub fn get_box(&self, id: &BoxId) -> Option<&PageBox> {
        self.core.get_box(id)
    }
}
