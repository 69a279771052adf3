#![allow(clippy::float_cmp)]

use grid::geometry::PixelSize;
use grid::registry::WidgetKind;

use super::*;

/// 1210x810 with default grid config gives 90px cells on a 100px pitch.
fn setup() -> (tempfile::TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig { data_dir: dir.path().join("dashboards"), viewport: PixelSize::new(1210.0, 810.0) };
    (dir, config)
}

fn load(config: &AppConfig, name: &str) -> Dashboard {
    FileStore::new(&config.data_dir).load(name).unwrap()
}

fn rect_of(config: &AppConfig, name: &str, id: &str) -> String {
    let id: WidgetId = id.parse().unwrap();
    let dashboard = load(config, name);
    dashboard.widgets.iter().find(|w| w.id == id).unwrap().rect.to_string()
}

fn map(seq: u32) -> WidgetId {
    WidgetId::new(WidgetKind::Map, seq)
}

fn new_starter(config: &AppConfig, name: &str) {
    run(config, Command::New { name: name.to_owned(), empty: false }).unwrap();
}

#[test]
fn parse_rect_is_case_insensitive() {
    assert_eq!(parse_rect(" 3f:7h ").unwrap(), Rect::parse("3F", "7H").unwrap());
}

#[test]
fn parse_rect_single_cell() {
    assert_eq!(parse_rect("2B").unwrap(), Rect::parse("2B", "2B").unwrap());
}

#[test]
fn parse_rect_rejects_garbage() {
    assert!(matches!(parse_rect("A1:B2"), Err(CliError::Grid(GridError::InvalidCellId(_)))));
}

#[test]
fn handle_points_sit_inside_their_zones() {
    let bx = PixelBox { left: 510.0, top: 210.0, width: 290.0, height: 490.0 };
    let corner = handle_point(bx, Handle::Corner);
    assert!(bx.right() - corner.x <= HANDLE_SIZE_PX && bx.bottom() - corner.y <= HANDLE_SIZE_PX);
    let right = handle_point(bx, Handle::Right);
    assert!(bx.bottom() - right.y > HANDLE_SIZE_PX);
    let bottom = handle_point(bx, Handle::Bottom);
    assert!(bx.right() - bottom.x > HANDLE_SIZE_PX);
}

#[test]
fn new_creates_starter_map() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    assert_eq!(rect_of(&config, "ops", "map-1"), "3F:7H");
}

#[test]
fn new_empty_has_no_widgets() {
    let (_tmp, config) = setup();
    run(&config, Command::New { name: "blank".into(), empty: true }).unwrap();
    assert!(load(&config, "blank").widgets.is_empty());
}

#[test]
fn new_twice_is_rejected() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let err = run(&config, Command::New { name: "ops".into(), empty: true }).unwrap_err();
    assert!(matches!(err, CliError::AlreadyExists(name) if name == "ops"));
    assert_eq!(err_code(&CliError::AlreadyExists("x".into())), "E_DASHBOARD_EXISTS");
}

fn err_code(err: &CliError) -> &'static str {
    err.error_code()
}

#[test]
fn show_missing_is_store_not_found() {
    let (_tmp, config) = setup();
    let err = run(&config, Command::Show { name: "ghost".into() }).unwrap_err();
    assert!(matches!(err, CliError::Store(StoreError::NotFound(_))));
}

#[test]
fn add_without_position_uses_first_free_slot() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = AddArgs { name: "ops".into(), kind: WidgetKind::Chart, at: None, props: Some(r#"{"title":"Sales"}"#.into()) };
    run(&config, Command::Add(args)).unwrap();
    assert_eq!(rect_of(&config, "ops", "chart-1"), "1A:2B");
    let dashboard = load(&config, "ops");
    let chart = dashboard.widgets.iter().find(|w| w.kind == WidgetKind::Chart).unwrap();
    assert_eq!(chart.props["title"], "Sales");
}

#[test]
fn add_at_explicit_rect() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = AddArgs { name: "ops".into(), kind: WidgetKind::RichText, at: Some("1j:2l".into()), props: None };
    run(&config, Command::Add(args)).unwrap();
    assert_eq!(rect_of(&config, "ops", "richtext-1"), "1J:2L");
}

#[test]
fn add_out_of_bounds_fails_without_saving() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = AddArgs { name: "ops".into(), kind: WidgetKind::Chart, at: Some("7K:9M".into()), props: None };
    let err = run(&config, Command::Add(args)).unwrap_err();
    assert!(matches!(err, CliError::Grid(GridError::OutOfBounds { .. })));
    assert_eq!(load(&config, "ops").widgets.len(), 1);
}

#[test]
fn add_with_bad_props_is_invalid_json() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = AddArgs { name: "ops".into(), kind: WidgetKind::Chart, at: None, props: Some("{oops".into()) };
    assert!(matches!(run(&config, Command::Add(args)), Err(CliError::InvalidJson(_))));
}

#[test]
fn move_edits_start_and_end() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = MoveArgs { name: "ops".into(), id: map(1), start: Some("1a".into()), end: Some("2c".into()) };
    run(&config, Command::Move(args)).unwrap();
    assert_eq!(rect_of(&config, "ops", "map-1"), "1A:2C");
}

#[test]
fn move_both_corners_past_current_end() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = MoveArgs { name: "ops".into(), id: map(1), start: Some("7j".into()), end: Some("8K".into()) };
    run(&config, Command::Move(args)).unwrap();
    assert_eq!(rect_of(&config, "ops", "map-1"), "7J:8K");
}

#[test]
fn move_inverted_corners_is_out_of_bounds() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = MoveArgs { name: "ops".into(), id: map(1), start: Some("5C".into()), end: Some("4B".into()) };
    let err = run(&config, Command::Move(args)).unwrap_err();
    assert!(matches!(err, CliError::Grid(GridError::OutOfBounds { .. })));
    assert_eq!(rect_of(&config, "ops", "map-1"), "3F:7H");
}

#[test]
fn drag_snaps_to_whole_cells() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = DragArgs { name: "ops".into(), id: map(1), dx: 190.0, dy: -120.0 };
    run(&config, Command::Drag(args)).unwrap();
    assert_eq!(rect_of(&config, "ops", "map-1"), "2H:6J");
}

#[test]
fn drag_unknown_widget_fails() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = DragArgs { name: "ops".into(), id: map(9), dx: 100.0, dy: 0.0 };
    assert!(matches!(run(&config, Command::Drag(args)), Err(CliError::Grid(GridError::UnknownWidget(_)))));
}

#[test]
fn drag_covered_widget_is_rejected() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = AddArgs { name: "ops".into(), kind: WidgetKind::Chart, at: Some("3F:4H".into()), props: None };
    run(&config, Command::Add(args)).unwrap();
    let drag = DragArgs { name: "ops".into(), id: map(1), dx: 100.0, dy: 0.0 };
    assert!(matches!(run(&config, Command::Drag(drag)), Err(CliError::GestureRejected { .. })));
    assert_eq!(rect_of(&config, "ops", "map-1"), "3F:7H");
}

#[test]
fn resize_corner_grows_both_axes() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = ResizeArgs { name: "ops".into(), id: map(1), handle: HandleArg::Corner, dx: 100.0, dy: 100.0 };
    run(&config, Command::Resize(args)).unwrap();
    assert_eq!(rect_of(&config, "ops", "map-1"), "3F:8I");
}

#[test]
fn resize_right_only_changes_columns() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = ResizeArgs { name: "ops".into(), id: map(1), handle: HandleArg::Right, dx: -100.0, dy: 300.0 };
    run(&config, Command::Resize(args)).unwrap();
    assert_eq!(rect_of(&config, "ops", "map-1"), "3F:7G");
}

#[test]
fn grid_shrink_clamps_widgets_and_persists() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = GridArgs { name: "ops".into(), columns: Some(6), rows: Some(4), gap: Some(500), padding: None, corner_radius: None };
    run(&config, Command::Grid(args)).unwrap();
    let dashboard = load(&config, "ops");
    assert_eq!(dashboard.grid_config.columns, 6);
    assert_eq!(dashboard.grid_config.rows, 4);
    assert_eq!(dashboard.grid_config.gap, 100);
    let rect = dashboard.widgets[0].rect;
    assert!(rect.fits(6, 4));
}

#[test]
fn duplicate_and_remove() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    run(&config, Command::Duplicate { name: "ops".into(), id: map(1) }).unwrap();
    let dashboard = load(&config, "ops");
    assert_eq!(dashboard.widgets.len(), 2);
    assert_eq!(dashboard.widgets[1].id, map(2));
    assert_eq!(dashboard.widgets[1].rect, Rect::parse("1A", "2B").unwrap());

    run(&config, Command::Remove { name: "ops".into(), id: map(1) }).unwrap();
    let ids: Vec<_> = load(&config, "ops").widgets.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![map(2)]);
}

#[test]
fn sync_mirrors_nav_to_other_maps() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = AddArgs { name: "ops".into(), kind: WidgetKind::Map, at: Some("1A:2B".into()), props: None };
    run(&config, Command::Add(args)).unwrap();
    let args = SyncArgs {
        name: "ops".into(),
        source: map(1),
        mode: SyncModeArg::AllLeaders,
        leader: None,
        lng: Some(2.35),
        lat: Some(48.85),
        zoom: Some(12.0),
        pitch: None,
        bearing: None,
    };
    run(&config, Command::Sync(args)).unwrap();
    for widget in load(&config, "ops").widgets {
        let nav = NavState::from_props(&widget.props).unwrap();
        assert_eq!(nav.center, [2.35, 48.85], "{}", widget.id);
        assert!((nav.zoom - 12.0).abs() < f64::EPSILON);
    }
}

#[test]
fn sync_from_follower_in_primary_mode_does_not_mirror() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = AddArgs { name: "ops".into(), kind: WidgetKind::Map, at: Some("1A:2B".into()), props: None };
    run(&config, Command::Add(args)).unwrap();
    let args = SyncArgs {
        name: "ops".into(),
        source: map(2),
        mode: SyncModeArg::PrimaryLeader,
        leader: Some(map(1)),
        lng: None,
        lat: None,
        zoom: Some(3.0),
        pitch: None,
        bearing: None,
    };
    run(&config, Command::Sync(args)).unwrap();
    let dashboard = load(&config, "ops");
    let zoom_of = |id: WidgetId| {
        let widget = dashboard.widgets.iter().find(|w| w.id == id).unwrap();
        NavState::from_props(&widget.props).unwrap().zoom
    };
    assert!((zoom_of(map(2)) - 3.0).abs() < f64::EPSILON);
    assert!((zoom_of(map(1)) - 9.0).abs() < f64::EPSILON);
}

#[test]
fn sync_on_non_map_is_rejected() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    let args = AddArgs { name: "ops".into(), kind: WidgetKind::Chart, at: None, props: None };
    run(&config, Command::Add(args)).unwrap();
    let args = SyncArgs {
        name: "ops".into(),
        source: WidgetId::new(WidgetKind::Chart, 1),
        mode: SyncModeArg::AllLeaders,
        leader: None,
        lng: None,
        lat: None,
        zoom: None,
        pitch: None,
        bearing: None,
    };
    assert!(matches!(run(&config, Command::Sync(args)), Err(CliError::NotAMap(_))));
}

#[test]
fn delete_then_list_is_empty() {
    let (_tmp, config) = setup();
    new_starter(&config, "ops");
    run(&config, Command::Delete { name: "ops".into() }).unwrap();
    assert!(FileStore::new(&config.data_dir).list().unwrap().is_empty());
}

#[test]
fn cli_parses_negative_offsets() {
    let cli = Cli::try_parse_from(["fndash", "drag", "ops", "map-1", "--dx", "-100", "--dy", "50"]).unwrap();
    assert!(matches!(cli.command, Command::Drag(DragArgs { dx, .. }) if (dx + 100.0).abs() < f64::EPSILON));
}

#[test]
fn cli_rejects_unknown_kind() {
    assert!(Cli::try_parse_from(["fndash", "add", "ops", "spreadsheet"]).is_err());
}
