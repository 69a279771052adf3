#![allow(clippy::float_cmp)]

use super::*;

/// 12x8 grid, gap 10, padding 10, in a container where every cell is 90x90.
fn model() -> GridModel {
    GridModel::new(GridConfig::default(), PixelSize::new(1210.0, 810.0))
}

fn rect(start: &str, end: &str) -> Rect {
    Rect::parse(start, end).unwrap()
}

// =============================================================
// GridConfig
// =============================================================

#[test]
fn default_config_matches_documented_defaults() {
    let cfg = GridConfig::default();
    assert_eq!((cfg.columns, cfg.rows, cfg.gap, cfg.padding, cfg.corner_radius), (12, 8, 10, 10, 4));
}

#[test]
fn set_clamps_into_range() {
    let mut cfg = GridConfig::default();
    cfg.set(GridParam::Columns, 40);
    cfg.set(GridParam::Rows, 0);
    cfg.set(GridParam::Gap, -5);
    cfg.set(GridParam::Padding, 9000);
    cfg.set(GridParam::CornerRadius, 801);
    assert_eq!(cfg.columns, 12);
    assert_eq!(cfg.rows, 1);
    assert_eq!(cfg.gap, 0);
    assert_eq!(cfg.padding, 500);
    assert_eq!(cfg.corner_radius, 800);
}

#[test]
fn adjust_steps_and_clamps() {
    let mut cfg = GridConfig::default();
    cfg.adjust(GridParam::Gap, 10);
    assert_eq!(cfg.gap, 20);
    cfg.adjust(GridParam::Rows, 10);
    assert_eq!(cfg.rows, 12);
    cfg.adjust(GridParam::Columns, -20);
    assert_eq!(cfg.columns, 1);
}

#[test]
fn clamped_normalizes_out_of_range_config() {
    let cfg = GridConfig { columns: 30, rows: 0, gap: 200, padding: 10, corner_radius: 4 };
    assert!(!cfg.is_within_bounds());
    let fixed = cfg.clamped();
    assert_eq!((fixed.columns, fixed.rows, fixed.gap), (12, 1, 100));
    assert!(fixed.is_within_bounds());
}

#[test]
fn config_serializes_camel_case() {
    let json = serde_json::to_value(GridConfig::default()).unwrap();
    assert_eq!(json["cornerRadius"], 4);
    assert_eq!(json["columns"], 12);
}

// =============================================================
// Pixel projection
// =============================================================

#[test]
fn cell_dimensions_subtract_padding_and_gaps() {
    let dims = model().cell_dimensions();
    assert_eq!(dims.width, 90.0);
    assert_eq!(dims.height, 90.0);
}

#[test]
fn cell_dimensions_follow_container_resize() {
    let mut m = model();
    m.set_size(PixelSize::new(2410.0, 810.0));
    assert_eq!(m.cell_dimensions().width, 190.0);
}

#[test]
fn cell_to_pixel_first_and_offset_cells() {
    let m = model();
    assert_eq!(m.cell_to_pixel(Cell::new(1, 1)), Point::new(10.0, 10.0));
    assert_eq!(m.cell_to_pixel(Cell::new(3, 6)), Point::new(510.0, 210.0));
}

#[test]
fn pixel_box_spans_inclusive_cells_and_inner_gaps() {
    let b = model().pixel_box(rect("3F", "7H"));
    assert_eq!(b, PixelBox { left: 510.0, top: 210.0, width: 290.0, height: 490.0 });
}

#[test]
fn pixel_box_single_cell() {
    let b = model().pixel_box(rect("1A", "1A"));
    assert_eq!(b, PixelBox { left: 10.0, top: 10.0, width: 90.0, height: 90.0 });
}

#[test]
fn pixel_box_grows_by_one_pitch_per_column() {
    let m = GridModel::new(
        GridConfig { columns: 7, rows: 5, gap: 13, padding: 21, corner_radius: 0 },
        PixelSize::new(1000.0, 640.0),
    );
    let dims = m.cell_dimensions();
    let pitch = dims.width + 13.0;
    for end_col in 1..7 {
        let narrow = m.pixel_box(Rect::new(Cell::new(1, 1), Cell::new(2, end_col)));
        let wide = m.pixel_box(Rect::new(Cell::new(1, 1), Cell::new(2, end_col + 1)));
        assert!((wide.width - narrow.width - pitch).abs() < 1e-9);
        assert_eq!(wide.height, narrow.height);
    }
}

#[test]
fn full_grid_box_fills_container_inside_padding() {
    let b = model().pixel_box(rect("1A", "8L"));
    assert_eq!(b.right(), 1200.0);
    assert_eq!(b.bottom(), 800.0);
}

#[test]
fn pixel_box_contains() {
    let b = PixelBox { left: 10.0, top: 10.0, width: 90.0, height: 90.0 };
    assert!(b.contains(Point::new(10.0, 10.0)));
    assert!(b.contains(Point::new(100.0, 100.0)));
    assert!(!b.contains(Point::new(101.0, 50.0)));
}

// =============================================================
// GridModel
// =============================================================

#[test]
fn set_config_reports_rebuild_for_columns_or_rows() {
    let mut m = model();
    let mut cfg = *m.config();
    cfg.columns = 6;
    assert_eq!(m.set_config(cfg), ConfigChange::Rebuild);
    assert_eq!(m.columns(), 6);
}

#[test]
fn set_config_reports_reproject_for_spacing() {
    let mut m = model();
    let mut cfg = *m.config();
    cfg.gap = 20;
    cfg.corner_radius = 12;
    assert_eq!(m.set_config(cfg), ConfigChange::Reproject);
}

#[test]
fn set_config_unchanged() {
    let mut m = model();
    let cfg = *m.config();
    assert_eq!(m.set_config(cfg), ConfigChange::Unchanged);
}

#[test]
fn new_model_clamps_config() {
    let m = GridModel::new(GridConfig { columns: 99, ..GridConfig::default() }, PixelSize::default());
    assert_eq!(m.columns(), 12);
}

#[test]
fn validate_rejects_out_of_bounds() {
    let m = model();
    assert!(m.validate(rect("3F", "7H")).is_ok());
    assert_eq!(
        m.validate(rect("3F", "9H")),
        Err(GridError::OutOfBounds { rect: rect("3F", "9H"), columns: 12, rows: 8 })
    );
    assert!(m.validate(rect("7H", "3F")).is_err());
}

#[test]
fn contains_checks_cell_bounds() {
    let m = model();
    assert!(m.contains(Cell::new(8, 12)));
    assert!(!m.contains(Cell::new(9, 1)));
    assert!(!m.contains(Cell::new(1, 13)));
}

#[test]
fn cell_ids_are_row_major() {
    let m = GridModel::new(GridConfig { columns: 2, rows: 2, ..GridConfig::default() }, PixelSize::default());
    assert_eq!(m.cell_ids(), vec!["1A", "1B", "2A", "2B"]);
}
