use super::*;
use crate::geometry::{GridConfig, PixelSize};
use crate::registry::WidgetKind;

// =============================================================
// Helpers
// =============================================================

fn rect(start: &str, end: &str) -> Rect {
    Rect::parse(start, end).unwrap()
}

/// 12x8, gap 10, padding 10; cells are 90px so one pitch is 100px.
fn model() -> GridModel {
    GridModel::new(GridConfig::default(), PixelSize::new(1210.0, 810.0))
}

fn map_id() -> WidgetId {
    WidgetId::new(WidgetKind::Map, 1)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn delta(cols: i64, rows: i64) -> CellDelta {
    CellDelta { cols, rows }
}

fn dragging(origin: Rect) -> ManipulationController {
    let mut ctl = ManipulationController::new();
    assert!(ctl.begin(map_id(), Gesture::Drag, origin, pt(500.0, 400.0), EditMode::Edit));
    ctl
}

fn resizing(origin: Rect, handle: Handle) -> ManipulationController {
    let mut ctl = ManipulationController::new();
    assert!(ctl.begin(map_id(), Gesture::Resize(handle), origin, pt(800.0, 700.0), EditMode::Edit));
    ctl
}

// =============================================================
// snap_delta
// =============================================================

#[test]
fn snap_rounds_to_nearest_cell() {
    let cell = CellSize { width: 90.0, height: 90.0 };
    assert_eq!(snap_delta(100.0, 0.0, cell, 10.0), delta(1, 0));
    assert_eq!(snap_delta(49.0, 51.0, cell, 10.0), delta(0, 1));
    assert_eq!(snap_delta(-160.0, -240.0, cell, 10.0), delta(-2, -2));
}

#[test]
fn snap_is_not_floor() {
    // Sixty percent of a pitch already counts as a full cell.
    let cell = CellSize { width: 90.0, height: 90.0 };
    assert_eq!(snap_delta(60.0, 60.0, cell, 10.0), delta(1, 1));
}

#[test]
fn snap_degenerate_pitch_is_zero() {
    let cell = CellSize { width: -5.0, height: 0.0 };
    assert_eq!(snap_delta(500.0, 500.0, cell, 0.0), delta(0, 0));
    let nan = CellSize { width: f64::NAN, height: 90.0 };
    assert_eq!(snap_delta(500.0, f64::INFINITY, nan, 10.0), delta(0, 0));
}

// =============================================================
// drag_rect / resize_rect
// =============================================================

#[test]
fn drag_translates_and_preserves_size() {
    assert_eq!(drag_rect(rect("3F", "7H"), delta(1, 0), 12, 8), rect("3G", "7I"));
    assert_eq!(drag_rect(rect("3F", "7H"), delta(-2, -1), 12, 8), rect("2D", "6F"));
}

#[test]
fn drag_clamps_to_max_start_column() {
    assert_eq!(drag_rect(rect("3F", "7H"), delta(50, 0), 12, 8), rect("3J", "7L"));
}

#[test]
fn drag_clamps_at_origin() {
    assert_eq!(drag_rect(rect("3F", "7H"), delta(-50, -50), 12, 8), rect("1A", "5C"));
}

#[test]
fn drag_clamps_bottom_edge() {
    assert_eq!(drag_rect(rect("3F", "7H"), delta(0, 3), 12, 8), rect("4F", "8H"));
}

#[test]
fn resize_right_moves_only_end_column() {
    assert_eq!(resize_rect(rect("3F", "7H"), Handle::Right, delta(2, 3), 12, 8), rect("3F", "7J"));
}

#[test]
fn resize_bottom_moves_only_end_row() {
    assert_eq!(resize_rect(rect("3F", "7H"), Handle::Bottom, delta(2, 1), 12, 8), rect("3F", "8H"));
}

#[test]
fn resize_corner_moves_both() {
    assert_eq!(resize_rect(rect("3F", "7H"), Handle::Corner, delta(1, -1), 12, 8), rect("3F", "6I"));
}

#[test]
fn resize_clamps_to_grid_edge() {
    assert_eq!(resize_rect(rect("3F", "7H"), Handle::Corner, delta(40, 40), 12, 8), rect("3F", "8L"));
}

#[test]
fn resize_never_flips() {
    assert_eq!(resize_rect(rect("3F", "7H"), Handle::Corner, delta(-10, -10), 12, 8), rect("3F", "3F"));
    assert_eq!(resize_rect(rect("3F", "7H"), Handle::Right, delta(-3, 0), 12, 8), rect("3F", "7F"));
}

#[test]
fn huge_pointer_offsets_saturate_at_the_edges() {
    let cell = CellSize { width: 90.0, height: 90.0 };
    let far = snap_delta(1e300, 1e300, cell, 10.0);
    let near = snap_delta(-1e300, -1e300, cell, 10.0);
    assert_eq!(drag_rect(rect("3F", "7H"), far, 12, 8), rect("4J", "8L"));
    assert_eq!(drag_rect(rect("3F", "7H"), near, 12, 8), rect("1A", "5C"));
    assert_eq!(resize_rect(rect("3F", "7H"), Handle::Corner, far, 12, 8), rect("3F", "8L"));
    assert_eq!(resize_rect(rect("3F", "7H"), Handle::Corner, near, 12, 8), rect("3F", "3F"));
}

// =============================================================
// ManipulationController
// =============================================================

#[test]
fn controller_starts_idle() {
    let ctl = ManipulationController::new();
    assert!(ctl.is_idle());
    assert!(ctl.preview().is_none());
    assert!(ctl.active_id().is_none());
}

#[test]
fn begin_ignored_in_view_mode() {
    let mut ctl = ManipulationController::new();
    assert!(!ctl.begin(map_id(), Gesture::Drag, rect("3F", "7H"), pt(0.0, 0.0), EditMode::View));
    assert!(ctl.is_idle());
}

#[test]
fn begin_ignored_while_gesture_active() {
    let mut ctl = dragging(rect("3F", "7H"));
    let other = WidgetId::new(WidgetKind::Chart, 1);
    assert!(!ctl.begin(other, Gesture::Resize(Handle::Corner), rect("1A", "2B"), pt(0.0, 0.0), EditMode::Edit));
    assert_eq!(ctl.active_id(), Some(map_id()));
}

#[test]
fn preview_starts_at_origin() {
    let ctl = dragging(rect("3F", "7H"));
    assert_eq!(ctl.preview(), Some((map_id(), rect("3F", "7H"))));
}

#[test]
fn drag_one_pitch_right_previews_next_column() {
    let mut ctl = dragging(rect("3F", "7H"));
    assert_eq!(ctl.update(pt(600.0, 400.0), &model()), Some((map_id(), rect("3G", "7I"))));
}

#[test]
fn drag_far_right_clamps() {
    let mut ctl = dragging(rect("3F", "7H"));
    assert_eq!(ctl.update(pt(5000.0, 400.0), &model()), Some((map_id(), rect("3J", "7L"))));
}

#[test]
fn drag_delta_is_measured_from_gesture_start() {
    let mut ctl = dragging(rect("3F", "7H"));
    let m = model();
    ctl.update(pt(560.0, 400.0), &m);
    ctl.update(pt(620.0, 400.0), &m);
    // 120px total from the start is one cell, not two.
    assert_eq!(ctl.preview(), Some((map_id(), rect("3G", "7I"))));
}

#[test]
fn corner_resize_past_start_is_one_cell() {
    let mut ctl = resizing(rect("3F", "7H"), Handle::Corner);
    assert_eq!(ctl.update(pt(0.0, 0.0), &model()), Some((map_id(), rect("3F", "3F"))));
}

#[test]
fn right_handle_ignores_vertical_motion() {
    let mut ctl = resizing(rect("3F", "7H"), Handle::Right);
    assert_eq!(ctl.update(pt(900.0, 500.0), &model()), Some((map_id(), rect("3F", "7I"))));
}

#[test]
fn release_commits_last_preview() {
    let mut ctl = dragging(rect("3F", "7H"));
    ctl.update(pt(600.0, 500.0), &model());
    let commit = ctl.release().unwrap();
    assert_eq!(commit, Commit { id: map_id(), from: rect("3F", "7H"), rect: rect("4G", "8I") });
    assert!(commit.changed());
    assert!(ctl.is_idle());
}

#[test]
fn release_without_move_commits_original() {
    let mut ctl = resizing(rect("3F", "7H"), Handle::Bottom);
    let commit = ctl.release().unwrap();
    assert_eq!(commit.rect, rect("3F", "7H"));
    assert!(!commit.changed());
}

#[test]
fn release_when_idle_is_none() {
    let mut ctl = ManipulationController::new();
    assert!(ctl.release().is_none());
}

#[test]
fn update_when_idle_is_none() {
    let mut ctl = ManipulationController::new();
    assert!(ctl.update(pt(10.0, 10.0), &model()).is_none());
}

#[test]
fn cancel_discards_preview() {
    let mut ctl = dragging(rect("3F", "7H"));
    ctl.update(pt(800.0, 400.0), &model());
    assert_eq!(ctl.cancel(), Some(map_id()));
    assert!(ctl.is_idle());
    assert!(ctl.release().is_none());
}

#[test]
fn new_gesture_allowed_after_release() {
    let mut ctl = dragging(rect("3F", "7H"));
    ctl.release();
    assert!(ctl.begin(map_id(), Gesture::Resize(Handle::Right), rect("3F", "7H"), pt(0.0, 0.0), EditMode::Edit));
}

#[test]
fn edit_mode_default_is_edit() {
    assert_eq!(EditMode::default(), EditMode::Edit);
}

#[test]
fn handle_axes() {
    assert!(Handle::Right.moves_cols() && !Handle::Right.moves_rows());
    assert!(!Handle::Bottom.moves_cols() && Handle::Bottom.moves_rows());
    assert!(Handle::Corner.moves_cols() && Handle::Corner.moves_rows());
}
