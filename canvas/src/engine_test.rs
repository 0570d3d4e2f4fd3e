#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::persisted_id;
use crate::hit::ResizeAnchor;

// =============================================================
// Helpers
// =============================================================

/// 800x1100 px image of a 400x550 pt page: two pixels per point.
fn page_ready() -> PageReady {
    PageReady { pixel_width: 800.0, pixel_height: 1100.0, point_width: 400.0, point_height: 550.0 }
}

fn ready_core() -> EngineCore {
    let mut core = EngineCore::new();
    core.open_document(3);
    core.page_ready(page_ready());
    core
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn entry(owner: &str, index: usize, page: usize, bbox: [f64; 4]) -> PersistedBoxRecord {
    PersistedBoxRecord { page, bbox: BBox::from(bbox), owner_id: owner.to_owned(), index_in_owner: index }
}

fn press(core: &mut EngineCore, at: Point) -> Vec<Action> {
    let target = core.classify(at);
    core.on_pointer_down(at, target, Button::Primary)
}

fn click(core: &mut EngineCore, at: Point) -> Vec<Action> {
    let target = core.classify(at);
    core.on_click(at, target)
}

/// Full press / release / click sequence at one position, as a browser reports a click.
fn tap(core: &mut EngineCore, at: Point) -> Vec<Action> {
    let mut actions = press(core, at);
    actions.extend(core.on_pointer_up(at));
    actions.extend(click(core, at));
    actions
}

fn drag(core: &mut EngineCore, from: Point, to: Point) -> Vec<Action> {
    let mut actions = press(core, from);
    actions.extend(core.on_pointer_move(to));
    actions.extend(core.on_pointer_up(to));
    actions
}

fn created(actions: &[Action]) -> Vec<PageBox> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::BoxCreated(b) => Some(b.clone()),
            _ => None,
        })
        .collect()
}

fn selection_changes(actions: &[Action]) -> Vec<Option<BoxId>> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::SelectionChanged { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

fn geometry_changes(actions: &[Action]) -> Vec<(BoxId, BBox)> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::BoxGeometryChanged { id, bbox } => Some((*id, *bbox)),
            _ => None,
        })
        .collect()
}

fn delete_requests(actions: &[Action]) -> usize {
    actions.iter().filter(|a| matches!(a, Action::BoxDeleteRequested { .. })).count()
}

fn assert_bbox_near(actual: BBox, expected: [f64; 4]) {
    for (a, e) in actual.to_array().iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
    }
}

/// Three overlapping persisted boxes that all contain point (60, 60), i.e. pixel (120, 120).
fn stacked_core() -> EngineCore {
    let mut core = ready_core();
    core.replace_snapshot(vec![
        entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0]),
        entry("eq-b", 0, 0, [20.0, 20.0, 120.0, 120.0]),
        entry("eq-c", 0, 0, [40.0, 40.0, 140.0, 140.0]),
    ]);
    core
}

// =============================================================
// Calibration gate
// =============================================================

#[test]
fn pointer_events_before_calibration_are_ignored() {
    let mut core = EngineCore::new();
    assert!(!core.is_calibrated());
    assert!(core.on_pointer_down(pt(10.0, 10.0), Target::Background, Button::Primary).is_empty());
    assert!(core.input.is_idle());
    assert!(core.on_click(pt(10.0, 10.0), Target::Background).is_empty());
    assert!(core.layout().is_empty());
}

#[test]
fn page_ready_calibrates() {
    let mut core = EngineCore::new();
    let actions = core.page_ready(page_ready());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(core.is_calibrated());
    assert_eq!(core.calibration().map(|c| c.scale_x()), Some(2.0));
}

#[test]
fn page_ready_mid_gesture_resets_to_idle() {
    let mut core = ready_core();
    press(&mut core, pt(500.0, 500.0));
    assert!(!core.input.is_idle());
    core.page_ready(PageReady { pixel_width: 400.0, ..page_ready() });
    assert!(core.input.is_idle());
    assert!(core.on_pointer_up(pt(700.0, 700.0)).is_empty());
    assert!(core.doc.is_empty());
}

// =============================================================
// Drawing
// =============================================================

#[test]
fn draw_creates_ephemeral_box_in_point_space() {
    let mut core = ready_core();
    let actions = drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0));

    let boxes = created(&actions);
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].bbox.to_array(), [50.0, 50.0, 150.0, 150.0]);
    assert_eq!(boxes[0].page, 0);
    assert!(!boxes[0].is_persisted());
    assert_eq!(core.page_counts(), PageCounts { persisted: 0, ephemeral: 1 });
    assert_eq!(core.selection(), Some(boxes[0].id));
    assert_eq!(selection_changes(&actions), vec![Some(boxes[0].id)]);
    assert!(core.input.is_idle());
}

#[test]
fn draw_in_reverse_direction_is_canonical() {
    let mut core = ready_core();
    let actions = drag(&mut core, pt(300.0, 300.0), pt(100.0, 100.0));
    assert_eq!(created(&actions)[0].bbox.to_array(), [50.0, 50.0, 150.0, 150.0]);
}

#[test]
fn draw_below_threshold_creates_nothing() {
    let mut core = ready_core();
    let actions = drag(&mut core, pt(10.0, 10.0), pt(13.0, 13.0));
    assert!(created(&actions).is_empty());
    assert!(core.doc.is_empty());
    assert!(core.input.is_idle());
}

#[test]
fn draw_above_threshold_creates_one_box() {
    let mut core = ready_core();
    let actions = drag(&mut core, pt(10.0, 10.0), pt(15.0, 15.0));
    assert_eq!(created(&actions).len(), 1);
}

#[test]
fn draw_needs_both_axes_above_threshold() {
    let mut core = ready_core();
    assert!(created(&drag(&mut core, pt(10.0, 10.0), pt(200.0, 14.0))).is_empty());
    assert!(created(&drag(&mut core, pt(10.0, 10.0), pt(14.0, 200.0))).is_empty());
}

#[test]
fn custom_draw_threshold() {
    let mut core = EngineCore::with_config(EngineConfig { draw_threshold_px: 20.0, ..EngineConfig::default() });
    core.page_ready(page_ready());
    assert!(created(&drag(&mut core, pt(0.0, 0.0), pt(15.0, 15.0))).is_empty());
    assert_eq!(created(&drag(&mut core, pt(0.0, 0.0), pt(25.0, 25.0))).len(), 1);
}

#[test]
fn rubber_band_tracks_pointer() {
    let mut core = ready_core();
    press(&mut core, pt(100.0, 100.0));
    assert_eq!(core.rubber_band(), Some(ScreenRect::new(100.0, 100.0, 0.0, 0.0)));
    core.on_pointer_move(pt(50.0, 160.0));
    assert_eq!(core.rubber_band(), Some(ScreenRect::new(50.0, 100.0, 50.0, 60.0)));
    core.on_pointer_up(pt(50.0, 160.0));
    assert_eq!(core.rubber_band(), None);
}

#[test]
fn secondary_button_does_not_draw() {
    let mut core = ready_core();
    assert!(core.on_pointer_down(pt(10.0, 10.0), Target::Background, Button::Secondary).is_empty());
    assert!(core.input.is_idle());
}

#[test]
fn pointer_down_during_gesture_is_ignored() {
    let mut core = ready_core();
    press(&mut core, pt(10.0, 10.0));
    assert!(core.on_pointer_down(pt(400.0, 400.0), Target::Background, Button::Primary).is_empty());
    let actions = core.on_pointer_up(pt(110.0, 110.0));
    assert_eq!(created(&actions)[0].bbox.to_array(), [5.0, 5.0, 55.0, 55.0]);
}

#[test]
fn click_after_draw_is_suppressed() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    assert!(click(&mut core, pt(300.0, 300.0)).is_empty());
    assert_eq!(core.selection(), Some(id));
    // Only the trailing click is swallowed.
    assert!(!click(&mut core, pt(200.0, 200.0)).is_empty());
}

// =============================================================
// Selection
// =============================================================

#[test]
fn click_cycles_through_stacked_boxes() {
    let mut core = stacked_core();
    let a = persisted_id("eq-a", 0);
    let b = persisted_id("eq-b", 0);
    let c = persisted_id("eq-c", 0);

    let mut seen = Vec::new();
    for _ in 0..4 {
        tap(&mut core, pt(120.0, 120.0));
        seen.push(core.selection());
    }
    assert_eq!(seen, vec![Some(a), Some(b), Some(c), Some(a)]);
}

#[test]
fn click_selection_reports_owner() {
    let mut core = stacked_core();
    let actions = tap(&mut core, pt(120.0, 120.0));
    assert!(actions.contains(&Action::SelectionChanged {
        id: Some(persisted_id("eq-a", 0)),
        owner_id: Some("eq-a".into()),
    }));
}

#[test]
fn click_on_background_clears_selection() {
    let mut core = stacked_core();
    tap(&mut core, pt(120.0, 120.0));
    let actions = tap(&mut core, pt(700.0, 1000.0));
    assert_eq!(selection_changes(&actions), vec![None]);
    assert_eq!(core.selection(), None);
}

#[test]
fn click_on_handle_is_ignored() {
    let mut core = stacked_core();
    tap(&mut core, pt(120.0, 120.0));
    let target = Target::Handle { id: persisted_id("eq-a", 0), anchor: ResizeAnchor::Se };
    assert!(core.on_click(pt(200.0, 200.0), target).is_empty());
    assert_eq!(core.selection(), Some(persisted_id("eq-a", 0)));
}

#[test]
fn persisted_box_is_read_only_until_selected() {
    let mut core = stacked_core();
    let a = persisted_id("eq-a", 0);
    assert!(!core.is_draggable(&a));
    assert!(core.on_pointer_down(pt(10.0, 10.0), Target::Box { id: a }, Button::Primary).is_empty());
    assert!(core.input.is_idle());

    tap(&mut core, pt(10.0, 10.0));
    assert!(core.is_draggable(&a));
}

#[test]
fn classify_finds_handles_of_selected_box_only() {
    let mut core = stacked_core();
    assert_eq!(core.classify(pt(200.0, 200.0)), Target::Box { id: persisted_id("eq-c", 0) });
    tap(&mut core, pt(10.0, 10.0));
    assert_eq!(
        core.classify(pt(202.0, 198.0)),
        Target::Handle { id: persisted_id("eq-a", 0), anchor: ResizeAnchor::Se }
    );
    assert_eq!(core.classify(pt(790.0, 1090.0)), Target::Background);
}

// =============================================================
// Drag and transform
// =============================================================

#[test]
fn drag_ephemeral_box_moves_it_locally() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;

    let actions = drag(&mut core, pt(200.0, 200.0), pt(240.0, 220.0));
    assert!(geometry_changes(&actions).is_empty());
    assert_eq!(core.get_box(&id).unwrap().bbox.to_array(), [70.0, 60.0, 170.0, 160.0]);
    assert!(click(&mut core, pt(240.0, 220.0)).is_empty());
}

#[test]
fn drag_selected_persisted_box_emits_geometry_change() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    let a = persisted_id("eq-a", 0);
    tap(&mut core, pt(100.0, 100.0));

    let actions = drag(&mut core, pt(100.0, 100.0), pt(120.0, 140.0));
    let changes = geometry_changes(&actions);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].0, a);
    assert_eq!(changes[0].1.to_array(), [10.0, 20.0, 110.0, 120.0]);
    assert_eq!(core.get_box(&a).unwrap().bbox, changes[0].1);
    assert_eq!(core.selection(), Some(a));
}

#[test]
fn active_frame_previews_drag() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    press(&mut core, pt(200.0, 200.0));
    core.on_pointer_move(pt(210.0, 200.0));
    assert_eq!(core.active_frame(), Some((id, ScreenRect::new(110.0, 100.0, 200.0, 200.0))));
    // Store is untouched until release.
    assert_eq!(core.get_box(&id).unwrap().bbox.to_array(), [50.0, 50.0, 150.0, 150.0]);
}

#[test]
fn press_and_release_without_motion_changes_nothing() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    let rev = core.doc.revision();
    let actions = tap(&mut core, pt(200.0, 200.0));
    assert!(geometry_changes(&actions).is_empty());
    assert_eq!(core.doc.revision(), rev);
    assert_eq!(core.selection(), Some(id));
}

#[test]
fn transform_handle_resizes_and_normalizes() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    let a = persisted_id("eq-a", 0);
    tap(&mut core, pt(100.0, 100.0));

    press(&mut core, pt(200.0, 200.0));
    assert!(matches!(core.input, InputState::Transforming { anchor: ResizeAnchor::Se, .. }));
    core.on_pointer_move(pt(300.0, 400.0));
    let actions = core.on_pointer_up(pt(300.0, 400.0));

    assert_eq!(geometry_changes(&actions), vec![(a, BBox::new(0.0, 0.0, 150.0, 200.0))]);
    assert_eq!(core.selection(), Some(a));
    assert!(core.input.is_idle());
}

#[test]
fn transform_past_opposite_edge_stays_canonical() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    press(&mut core, pt(300.0, 200.0));
    core.on_pointer_up(pt(0.0, 200.0));
    assert_bbox_near(core.get_box(&id).unwrap().bbox, [0.0, 50.0, 50.0, 150.0]);
}

#[test]
fn apply_node_frame_resets_scale_and_keeps_id() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    let mut frame = NodeFrame { x: 20.0, y: 40.0, width: 100.0, height: 100.0, scale_x: 2.0, scale_y: 0.5 };

    let actions = core.apply_node_frame(&id, &mut frame);
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(frame, NodeFrame::from_rect(ScreenRect::new(20.0, 40.0, 200.0, 50.0)));
    assert_eq!(core.get_box(&id).unwrap().bbox.to_array(), [10.0, 20.0, 110.0, 45.0]);
    assert_eq!(core.page_counts().ephemeral, 1);
}

#[test]
fn apply_node_frame_unknown_box_is_noop() {
    let mut core = ready_core();
    let mut frame = NodeFrame { x: 0.0, y: 0.0, width: 10.0, height: 10.0, scale_x: 3.0, scale_y: 3.0 };
    assert!(core.apply_node_frame(&Uuid::new_v4(), &mut frame).is_empty());
    assert_eq!(frame.scale_x, 3.0);
}

// =============================================================
// Delete
// =============================================================

#[test]
fn delete_ephemeral_removes_without_intent() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    let actions = core.on_key_down(&Key("Delete".into()));
    assert_eq!(delete_requests(&actions), 0);
    assert_eq!(selection_changes(&actions), vec![None]);
    assert!(core.get_box(&id).is_none());
    assert_eq!(core.selection(), None);
}

#[test]
fn delete_persisted_emits_one_request_and_waits_for_snapshot() {
    let mut core = stacked_core();
    let a = persisted_id("eq-a", 0);
    tap(&mut core, pt(10.0, 10.0));

    let actions = core.on_key_down(&Key("Delete".into()));
    assert_eq!(delete_requests(&actions), 1);
    assert!(actions.contains(&Action::BoxDeleteRequested { id: a, owner_id: "eq-a".into(), index_in_owner: 0 }));
    assert_eq!(core.selection(), None);
    assert!(core.get_box(&a).is_some());

    core.replace_snapshot(vec![
        entry("eq-b", 0, 0, [20.0, 20.0, 120.0, 120.0]),
        entry("eq-c", 0, 0, [40.0, 40.0, 140.0, 140.0]),
    ]);
    assert!(core.get_box(&a).is_none());
}

#[test]
fn delete_without_selection_or_other_key_is_noop() {
    let mut core = stacked_core();
    assert!(core.on_key_down(&Key("Delete".into())).is_empty());
    tap(&mut core, pt(10.0, 10.0));
    assert!(core.on_key_down(&Key("Backspace".into())).is_empty());
    assert!(core.selection().is_some());
}

// =============================================================
// Snapshot reconciliation
// =============================================================

#[test]
fn snapshot_dropping_selected_box_clears_selection() {
    let mut core = stacked_core();
    tap(&mut core, pt(10.0, 10.0));
    let actions = core.replace_snapshot(vec![entry("eq-b", 0, 0, [20.0, 20.0, 120.0, 120.0])]);
    assert_eq!(selection_changes(&actions), vec![None]);
    assert_eq!(core.selection(), None);
}

#[test]
fn snapshot_keeping_selected_box_keeps_selection() {
    let mut core = stacked_core();
    tap(&mut core, pt(10.0, 10.0));
    let actions = core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 90.0, 90.0])]);
    assert!(selection_changes(&actions).is_empty());
    assert_eq!(core.selection(), Some(persisted_id("eq-a", 0)));
}

#[test]
fn snapshot_wins_over_optimistic_edit() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    let a = persisted_id("eq-a", 0);
    tap(&mut core, pt(100.0, 100.0));
    drag(&mut core, pt(100.0, 100.0), pt(160.0, 100.0));
    assert_eq!(core.get_box(&a).unwrap().bbox.to_array(), [30.0, 0.0, 130.0, 100.0]);

    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    assert_eq!(core.get_box(&a).unwrap().bbox.to_array(), [0.0, 0.0, 100.0, 100.0]);
}

#[test]
fn snapshot_keeps_ephemeral_boxes() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    let actions = core.replace_snapshot(Vec::new());
    assert!(selection_changes(&actions).is_empty());
    assert!(core.get_box(&id).is_some());
}

#[test]
fn snapshot_abandons_gesture_on_vanished_box() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    tap(&mut core, pt(100.0, 100.0));
    press(&mut core, pt(100.0, 100.0));
    assert!(matches!(core.input, InputState::Dragging { .. }));

    core.replace_snapshot(Vec::new());
    assert!(core.input.is_idle());
    assert!(core.on_pointer_up(pt(150.0, 150.0)).is_empty());
}

#[test]
fn snapshot_skips_non_finite_entries() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 1.0, 1.0]), entry("eq-b", 0, 0, [f64::NAN, 0.0, 1.0, 1.0])]);
    assert_eq!(core.page_counts().persisted, 1);
}

// =============================================================
// Pages and layout
// =============================================================

#[test]
fn open_document_resets_and_requests_first_page() {
    let mut core = ready_core();
    drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0));
    let actions = core.open_document(7);
    assert!(actions.contains(&Action::PageRequested { page: 0, zoom: 1.5 }));
    assert_eq!(selection_changes(&actions), vec![None]);
    assert!(core.doc.is_empty());
    assert!(!core.is_calibrated());
    assert_eq!(core.nav.page_count, 7);
}

#[test]
fn set_page_clears_selection_and_requests_page() {
    let mut core = ready_core();
    drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0));
    let actions = core.set_page(1);
    assert!(actions.contains(&Action::PageRequested { page: 1, zoom: 1.5 }));
    assert_eq!(selection_changes(&actions), vec![None]);
    assert_eq!(core.page(), 1);
    assert!(core.layout().is_empty());
    assert_eq!(core.page_counts(), PageCounts::default());
}

#[test]
fn set_page_to_current_page_is_noop() {
    let mut core = ready_core();
    assert!(core.set_page(0).is_empty());
    assert!(core.prev_page().is_empty());
}

#[test]
fn boxes_drawn_on_a_page_stay_on_it() {
    let mut core = ready_core();
    core.next_page();
    core.page_ready(page_ready());
    let b = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].clone();
    assert_eq!(b.page, 1);
    core.prev_page();
    assert_eq!(core.page_counts().ephemeral, 0);
}

#[test]
fn zoom_requests_rerender_and_resets_gesture() {
    let mut core = ready_core();
    press(&mut core, pt(10.0, 10.0));
    let actions = core.zoom_in();
    assert_eq!(actions, vec![Action::PageRequested { page: 0, zoom: 1.75 }]);
    assert!(core.input.is_idle());
}

#[test]
fn layout_is_memoized() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    assert_eq!(core.layout().len(), 1);
    core.layout();
    assert_eq!(core.layout_builds(), 1);

    core.page_ready(page_ready());
    core.layout();
    assert_eq!(core.layout_builds(), 1);

    core.page_ready(PageReady { pixel_width: 400.0, pixel_height: 550.0, ..page_ready() });
    assert_eq!(core.layout()[0].rect, ScreenRect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(core.layout_builds(), 2);
}

// =============================================================
// Ephemeral lifecycle
// =============================================================

#[test]
fn commit_hands_over_ephemeral_boxes() {
    let mut core = ready_core();
    drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0));
    drag(&mut core, pt(400.0, 400.0), pt(500.0, 500.0));
    let commit = core.commit_ephemeral();
    assert_eq!(commit.boxes.len(), 2);
    assert_eq!(commit.boxes[0].bbox.to_array(), [50.0, 50.0, 150.0, 150.0]);
    assert_eq!(commit.boxes[1].bbox.to_array(), [200.0, 200.0, 250.0, 250.0]);
    assert_eq!(selection_changes(&commit.actions), vec![None]);
    assert!(core.doc.is_empty());
}

#[test]
fn clear_ephemeral_keeps_persisted() {
    let mut core = stacked_core();
    drag(&mut core, pt(600.0, 600.0), pt(700.0, 700.0));
    core.clear_ephemeral();
    assert_eq!(core.page_counts(), PageCounts { persisted: 3, ephemeral: 0 });
    assert!(core.clear_ephemeral().is_empty());
}

#[test]
fn import_candidates_adds_finite_boxes() {
    let mut core = ready_core();
    let candidates = vec![
        DetectionCandidate { bbox: BBox::new(1.0, 1.0, 5.0, 5.0), latex: "x".into(), score: 0.9 },
        DetectionCandidate { bbox: BBox::from([f64::NAN, 1.0, 5.0, 5.0]), latex: String::new(), score: 0.1 },
    ];
    let actions = core.import_candidates(0, &candidates);
    assert_eq!(created(&actions).len(), 1);
    assert_eq!(core.page_counts().ephemeral, 1);
    assert_eq!(core.selection(), None);
}

#[test]
fn record_boxes_reflect_current_geometry() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 1, 0, [0.0, 0.0, 10.0, 10.0]), entry("eq-a", 0, 2, [5.0, 5.0, 6.0, 6.0])]);
    let id = persisted_id("eq-a", 1);
    let mut frame = NodeFrame::from_rect(ScreenRect::new(0.0, 0.0, 40.0, 40.0));
    core.apply_node_frame(&id, &mut frame);

    let boxes = core.record_boxes("eq-a");
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0].page, 2);
    assert_eq!(boxes[1].bbox.to_array(), [0.0, 0.0, 20.0, 20.0]);
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn actions_serialize_with_intent_tag() {
    let id = persisted_id("eq-a", 0);
    let json = serde_json::to_value(Action::BoxDeleteRequested { id, owner_id: "eq-a".into(), index_in_owner: 0 })
        .unwrap();
    assert_eq!(json["intent"], "box_delete_requested");
    assert_eq!(json["owner_id"], "eq-a");

    let created = PageBox::ephemeral(0, BBox::new(0.0, 0.0, 1.0, 1.0));
    let json = serde_json::to_value(Action::BoxCreated(created)).unwrap();
    assert_eq!(json["intent"], "box_created");
    assert_eq!(json["origin"]["kind"], "ephemeral");
    assert_eq!(json["bbox"], serde_json::json!([0.0, 0.0, 1.0, 1.0]));
}

// =============================================================
// Current-page rule
// =============================================================

#[test]
fn snapshot_moving_selected_box_to_another_page_clears_selection() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    let a = persisted_id("eq-a", 0);
    tap(&mut core, pt(100.0, 100.0));
    assert_eq!(core.selection(), Some(a));

    let actions = core.replace_snapshot(vec![entry("eq-a", 0, 1, [0.0, 0.0, 100.0, 100.0])]);
    assert_eq!(selection_changes(&actions), vec![None]);
    assert!(core.layout().is_empty());
    assert!(!core.is_draggable(&a));
    // The old south-east handle position is plain background now.
    assert_eq!(core.classify(pt(200.0, 200.0)), Target::Background);

    let actions = drag(&mut core, pt(200.0, 200.0), pt(260.0, 260.0));
    assert!(geometry_changes(&actions).is_empty());
    assert_eq!(core.get_box(&a).unwrap().bbox.to_array(), [0.0, 0.0, 100.0, 100.0]);
}

#[test]
fn snapshot_moving_dragged_box_to_another_page_abandons_gesture() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    tap(&mut core, pt(100.0, 100.0));
    press(&mut core, pt(100.0, 100.0));
    assert!(matches!(core.input, InputState::Dragging { .. }));

    core.replace_snapshot(vec![entry("eq-a", 0, 2, [0.0, 0.0, 100.0, 100.0])]);
    assert!(core.input.is_idle());
    assert!(core.on_pointer_up(pt(150.0, 150.0)).is_empty());
}

#[test]
fn boxes_on_other_pages_are_not_draggable() {
    let mut core = ready_core();
    let id = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    assert!(core.is_draggable(&id));
    core.next_page();
    assert!(!core.is_draggable(&id));
}

// =============================================================
// Click after a gesture
// =============================================================

#[test]
fn drag_that_returns_to_start_still_suppresses_click() {
    let mut core = ready_core();
    let first = created(&drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0)))[0].id;
    let second = created(&drag(&mut core, pt(150.0, 150.0), pt(350.0, 350.0)))[0].id;
    assert_ne!(first, second);
    assert_eq!(core.selection(), Some(second));

    press(&mut core, pt(200.0, 200.0));
    core.on_pointer_move(pt(260.0, 260.0));
    core.on_pointer_move(pt(200.0, 200.0));
    core.on_pointer_up(pt(200.0, 200.0));

    assert!(click(&mut core, pt(200.0, 200.0)).is_empty());
    assert_eq!(core.selection(), Some(second));
    assert_eq!(core.get_box(&second).unwrap().bbox.to_array(), [75.0, 75.0, 175.0, 175.0]);
}

#[test]
fn transform_that_returns_to_start_still_suppresses_click() {
    let mut core = ready_core();
    core.replace_snapshot(vec![entry("eq-a", 0, 0, [0.0, 0.0, 100.0, 100.0])]);
    let a = persisted_id("eq-a", 0);
    tap(&mut core, pt(100.0, 100.0));

    press(&mut core, pt(200.0, 200.0));
    assert!(matches!(core.input, InputState::Transforming { .. }));
    core.on_pointer_move(pt(240.0, 240.0));
    core.on_pointer_move(pt(200.0, 200.0));
    core.on_pointer_up(pt(200.0, 200.0));

    assert!(click(&mut core, pt(100.0, 100.0)).is_empty());
    assert_eq!(core.selection(), Some(a));
}

// =============================================================
// Selection and JSON snapshot queries
// =============================================================

#[test]
fn selected_box_follows_selection() {
    let mut core = stacked_core();
    assert!(core.selected_box().is_none());
    tap(&mut core, pt(10.0, 10.0));
    assert_eq!(core.selected_box().and_then(PageBox::owner_id), Some("eq-a"));
    core.on_key_down(&Key("Delete".into()));
    assert!(core.selected_box().is_none());
}

#[test]
fn load_snapshot_json_replaces_persisted_boxes() {
    let mut core = stacked_core();
    let actions = core
        .load_snapshot_json(r#"[{"page":0,"bbox_pdf":[10,10,0,0],"owner_id":"eq-1","index_in_owner":0}]"#)
        .unwrap();
    assert!(actions.contains(&Action::RenderNeeded));
    assert_eq!(core.page_counts().persisted, 1);
    assert_eq!(core.get_box(&persisted_id("eq-1", 0)).unwrap().bbox.to_array(), [0.0, 0.0, 10.0, 10.0]);
}

#[test]
fn load_records_json_flattens_records() {
    let mut core = ready_core();
    core.load_records_json(
        r#"[{"eq_uid":"eq-1","paper_id":"p","boxes":[{"page":0,"bbox":[0,0,10,10]},{"page":1,"bbox":[0,0,5,5]}]}]"#,
    )
    .unwrap();
    assert_eq!(core.page_counts().persisted, 1);
    assert_eq!(core.get_box(&persisted_id("eq-1", 1)).map(|b| b.page), Some(1));
}

#[test]
fn load_json_rejects_malformed_payload_without_touching_state() {
    let mut core = stacked_core();
    assert!(matches!(core.load_snapshot_json("{"), Err(BridgeError::Json(_))));
    assert!(matches!(core.load_records_json(r#"[{"eq_uid":"eq-1"}]"#), Err(BridgeError::Json(_))));
    assert_eq!(core.page_counts().persisted, 3);
}
