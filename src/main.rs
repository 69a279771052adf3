mod config;
mod store;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use grid::cell::{Cell, Rect};
use grid::consts::{HANDLE_SIZE_PX, HEADER_HEIGHT_PX};
use grid::dashboard::{Dashboard, DashboardStore};
use grid::engine::{Action, CellEnd, EngineCore};
use grid::error::{ErrorCode, GridError, StoreError};
use grid::geometry::{GridConfig, GridParam, PixelBox, Point};
use grid::input::{Button, Handle, Modifiers};
use grid::registry::{WidgetId, WidgetKind, WidgetRecord};
use grid::sync::{ChangeOrigin, NavState, SyncMode};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::store::FileStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("dashboard already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("pointer at ({x}, {y}) did not grab {id}; another widget covers it")]
    GestureRejected { id: WidgetId, x: f64, y: f64 },
    #[error("{0} is not a map widget")]
    NotAMap(WidgetId),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Grid(err) => err.error_code(),
            Self::Store(err) => err.error_code(),
            Self::AlreadyExists(_) => "E_DASHBOARD_EXISTS",
            Self::InvalidJson(_) => "E_INVALID_JSON",
            Self::GestureRejected { .. } => "E_GESTURE_REJECTED",
            Self::NotAMap(_) => "E_NOT_A_MAP",
        }
    }

    fn recoverable(&self) -> bool {
        match self {
            Self::Grid(err) => err.recoverable(),
            _ => false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fndash", about = "Grid dashboard layout CLI")]
struct Cli {
    /// Directory of saved dashboards.
    #[arg(long, env = "FNDASH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Container width in pixels used for projection and gestures.
    #[arg(long, env = "FNDASH_VIEWPORT_WIDTH")]
    width: Option<f64>,

    /// Container height in pixels used for projection and gestures.
    #[arg(long, env = "FNDASH_VIEWPORT_HEIGHT")]
    height: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved dashboards.
    List,
    /// Print a dashboard with projected pixel boxes.
    Show { name: String },
    /// Create a dashboard. Starts with one map unless `--empty`.
    New {
        name: String,
        #[arg(long, default_value_t = false)]
        empty: bool,
    },
    Delete { name: String },
    /// Add a widget at the first free 2x2 slot, or at `--at START:END`.
    Add(AddArgs),
    Duplicate { name: String, id: WidgetId },
    Remove { name: String, id: WidgetId },
    /// Set a widget's start and/or end cell.
    Move(MoveArgs),
    /// Drag a widget by its header by a pixel offset.
    Drag(DragArgs),
    /// Resize a widget by one of its handles by a pixel offset.
    Resize(ResizeArgs),
    /// Change grid parameters. Values are clamped into range.
    Grid(GridArgs),
    /// Enable sync and push a navigation change from one map.
    Sync(SyncArgs),
}

#[derive(Args, Debug)]
struct AddArgs {
    name: String,
    kind: WidgetKind,
    #[arg(long, help = "Explicit rect, e.g. 3F:7H")]
    at: Option<String>,
    #[arg(long, help = "Props JSON merged over the kind defaults")]
    props: Option<String>,
}

#[derive(Args, Debug)]
struct MoveArgs {
    name: String,
    id: WidgetId,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
}

#[derive(Args, Debug)]
struct DragArgs {
    name: String,
    id: WidgetId,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dx: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dy: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum HandleArg {
    Right,
    Bottom,
    Corner,
}

impl From<HandleArg> for Handle {
    fn from(arg: HandleArg) -> Self {
        match arg {
            HandleArg::Right => Handle::Right,
            HandleArg::Bottom => Handle::Bottom,
            HandleArg::Corner => Handle::Corner,
        }
    }
}

#[derive(Args, Debug)]
struct ResizeArgs {
    name: String,
    id: WidgetId,
    #[arg(long, value_enum, default_value_t = HandleArg::Corner)]
    handle: HandleArg,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dx: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dy: f64,
}

#[derive(Args, Debug)]
struct GridArgs {
    name: String,
    #[arg(long)]
    columns: Option<i64>,
    #[arg(long)]
    rows: Option<i64>,
    #[arg(long)]
    gap: Option<i64>,
    #[arg(long)]
    padding: Option<i64>,
    #[arg(long)]
    corner_radius: Option<i64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SyncModeArg {
    AllLeaders,
    PrimaryLeader,
}

impl From<SyncModeArg> for SyncMode {
    fn from(arg: SyncModeArg) -> Self {
        match arg {
            SyncModeArg::AllLeaders => SyncMode::AllLeaders,
            SyncModeArg::PrimaryLeader => SyncMode::PrimaryLeader,
        }
    }
}

#[derive(Args, Debug)]
struct SyncArgs {
    name: String,
    /// Map whose navigation changes.
    source: WidgetId,
    #[arg(long, value_enum, default_value_t = SyncModeArg::AllLeaders)]
    mode: SyncModeArg,
    /// Primary leader, when different from the source.
    #[arg(long)]
    leader: Option<WidgetId>,
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long)]
    zoom: Option<f64>,
    #[arg(long)]
    pitch: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    bearing: Option<f64>,
}

/// A dashboard opened from the store into an engine.
struct Session {
    store: FileStore,
    engine: EngineCore,
}

impl Session {
    fn open(config: &AppConfig, name: &str) -> Result<Self, CliError> {
        let store = FileStore::new(&config.data_dir);
        let dashboard = store.load(name)?;
        let mut engine = EngineCore::new(config.viewport);
        engine.load_dashboard(dashboard)?;
        Ok(Self { store, engine })
    }

    fn save(&mut self) -> Result<Dashboard, CliError> {
        Ok(self.engine.save(&mut self.store)?)
    }

    fn widget_view(&self, id: WidgetId) -> Result<WidgetView<'_>, CliError> {
        WidgetView::of(&self.engine, id).ok_or_else(|| GridError::UnknownWidget(id).into())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WidgetView<'a> {
    #[serde(flatten)]
    record: &'a WidgetRecord,
    pixel_box: PixelBox,
    cells: u64,
}

impl<'a> WidgetView<'a> {
    fn of(engine: &'a EngineCore, id: WidgetId) -> Option<Self> {
        let record = engine.widget(id)?;
        Some(Self { record, pixel_box: engine.grid().pixel_box(record.rect), cells: record.rect.cell_count() })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardView<'a> {
    name: &'a str,
    grid_config: GridConfig,
    widgets: Vec<WidgetView<'a>>,
}

impl<'a> DashboardView<'a> {
    fn of(engine: &'a EngineCore) -> Self {
        let widgets = engine
            .registry()
            .records()
            .filter_map(|r| WidgetView::of(engine, r.id))
            .collect();
        Self { name: engine.name(), grid_config: *engine.grid().config(), widgets }
    }
}

fn main() -> ExitCode {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("warning: failed to read .env: {err}");
        }
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(width) = cli.width.filter(|w| w.is_finite() && *w > 0.0) {
        config.viewport.width = width;
    }
    if let Some(height) = cli.height.filter(|h| h.is_finite() && *h > 0.0) {
        config.viewport.height = height;
    }

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = err.error_code(), recoverable = err.recoverable(), %err, "command failed");
            eprintln!("error[{}]: {err}", err.error_code());
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig, command: Command) -> Result<(), CliError> {
    match command {
        Command::List => {
            let store = FileStore::new(&config.data_dir);
            print_json(&store.list()?)
        }
        Command::Show { name } => {
            let session = Session::open(config, &name)?;
            print_json(&DashboardView::of(&session.engine))
        }
        Command::New { name, empty } => run_new(config, &name, empty),
        Command::Delete { name } => {
            let mut store = FileStore::new(&config.data_dir);
            store.delete(&name)?;
            info!(dashboard = %name, "dashboard deleted");
            print_json(&serde_json::json!({ "deleted": name }))
        }
        Command::Add(args) => run_add(config, args),
        Command::Duplicate { name, id } => {
            let mut session = Session::open(config, &name)?;
            let (copy, _) = session.engine.duplicate_widget(id)?;
            session.save()?;
            print_json(&session.widget_view(copy)?)
        }
        Command::Remove { name, id } => {
            let mut session = Session::open(config, &name)?;
            session.engine.remove_widget(id)?;
            session.save()?;
            print_json(&serde_json::json!({ "removed": id }))
        }
        Command::Move(args) => run_move(config, args),
        Command::Drag(args) => {
            let mut session = Session::open(config, &args.name)?;
            let bx = session.engine.pixel_box(args.id).ok_or(GridError::UnknownWidget(args.id))?;
            let grab = Point::new(bx.left + bx.width / 2.0, bx.top + (HEADER_HEIGHT_PX / 2.0).min(bx.height / 2.0));
            simulate_gesture(&mut session.engine, args.id, grab, args.dx, args.dy)?;
            session.save()?;
            print_json(&session.widget_view(args.id)?)
        }
        Command::Resize(args) => {
            let mut session = Session::open(config, &args.name)?;
            let bx = session.engine.pixel_box(args.id).ok_or(GridError::UnknownWidget(args.id))?;
            let grab = handle_point(bx, args.handle.into());
            simulate_gesture(&mut session.engine, args.id, grab, args.dx, args.dy)?;
            session.save()?;
            print_json(&session.widget_view(args.id)?)
        }
        Command::Grid(args) => run_grid(config, args),
        Command::Sync(args) => run_sync(config, args),
    }
}

fn run_new(config: &AppConfig, name: &str, empty: bool) -> Result<(), CliError> {
    let mut store = FileStore::new(&config.data_dir);
    match store.load(name) {
        Ok(_) => return Err(CliError::AlreadyExists(name.to_owned())),
        Err(StoreError::NotFound(_)) => {}
        Err(err) => return Err(err.into()),
    }
    let dashboard = if empty { Dashboard::new(name) } else { Dashboard::starter(name) };
    let mut engine = EngineCore::new(config.viewport);
    engine.load_dashboard(dashboard)?;
    engine.save(&mut store)?;
    info!(dashboard = %name, "dashboard created");
    print_json(&DashboardView::of(&engine))
}

fn run_add(config: &AppConfig, args: AddArgs) -> Result<(), CliError> {
    let mut session = Session::open(config, &args.name)?;
    let props = args.props.as_deref().map(serde_json::from_str::<serde_json::Value>).transpose()?;
    let id = match args.at.as_deref() {
        Some(at) => {
            let rect = parse_rect(at)?;
            session.engine.create_widget(args.kind, rect, props.as_ref())?.0
        }
        None => {
            let (id, _) = session.engine.add_widget(args.kind)?;
            if let Some(props) = &props {
                session.engine.update_props(id, props)?;
            }
            id
        }
    };
    session.save()?;
    print_json(&session.widget_view(id)?)
}

fn run_move(config: &AppConfig, args: MoveArgs) -> Result<(), CliError> {
    let mut session = Session::open(config, &args.name)?;
    match (args.start.as_deref(), args.end.as_deref()) {
        (Some(start), None) => {
            session.engine.edit_cell(args.id, CellEnd::Start, start)?;
        }
        (None, Some(end)) => {
            session.engine.edit_cell(args.id, CellEnd::End, end)?;
        }
        (Some(start), Some(end)) => {
            // Both corners land together, so the rect may jump past its old end.
            let rect = Rect::new(parse_cell(start)?, parse_cell(end)?);
            session.engine.move_widget(args.id, rect)?;
        }
        (None, None) => {}
    }
    session.save()?;
    print_json(&session.widget_view(args.id)?)
}

fn run_grid(config: &AppConfig, args: GridArgs) -> Result<(), CliError> {
    let mut session = Session::open(config, &args.name)?;
    let changes = [
        (GridParam::Columns, args.columns),
        (GridParam::Rows, args.rows),
        (GridParam::Gap, args.gap),
        (GridParam::Padding, args.padding),
        (GridParam::CornerRadius, args.corner_radius),
    ];
    let mut next = *session.engine.grid().config();
    for (param, value) in changes {
        if let Some(value) = value {
            next.set(param, value);
        }
    }
    let actions = session.engine.set_grid_config(next);
    let clamped = actions
        .iter()
        .filter(|a| matches!(a, Action::WidgetCommitted { .. }))
        .count();
    info!(clamped, "grid updated");
    session.save()?;
    print_json(&DashboardView::of(&session.engine))
}

fn run_sync(config: &AppConfig, args: SyncArgs) -> Result<(), CliError> {
    let mut session = Session::open(config, &args.name)?;
    let engine = &mut session.engine;
    let record = engine.widget(args.source).ok_or(GridError::UnknownWidget(args.source))?;
    let current = NavState::from_props(&record.props).ok_or(CliError::NotAMap(args.source))?;

    let mode = SyncMode::from(args.mode);
    engine.configure_sync(true, mode, Some(args.leader.unwrap_or(args.source)));
    if let Some(leader) = args.leader {
        engine.assign_primary(leader)?;
    }

    let nav = NavState {
        center: [args.lng.unwrap_or(current.center[0]), args.lat.unwrap_or(current.center[1])],
        zoom: args.zoom.unwrap_or(current.zoom),
        pitch: args.pitch.unwrap_or(current.pitch),
        bearing: args.bearing.unwrap_or(current.bearing),
    };
    let actions = engine.on_nav_changed(args.source, nav, ChangeOrigin::User)?;
    let followers: Vec<WidgetId> = actions
        .iter()
        .filter_map(|a| match a {
            Action::SyncApplied { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    let group = engine.sync_group();
    session.save()?;
    print_json(&serde_json::json!({
        "group": group,
        "source": args.source,
        "nav": nav,
        "mirroredTo": followers,
    }))
}

/// Parse `START:END` (e.g. `3f:7h`), case-insensitive.
fn parse_rect(raw: &str) -> Result<Rect, CliError> {
    let (start, end) = raw.split_once(':').unwrap_or((raw, raw));
    Ok(Rect::new(parse_cell(start)?, parse_cell(end)?))
}

fn parse_cell(raw: &str) -> Result<Cell, CliError> {
    Ok(raw.trim().to_uppercase().parse::<Cell>()?)
}

/// A point inside the given handle's hit zone.
fn handle_point(bx: PixelBox, handle: Handle) -> Point {
    let inset = HANDLE_SIZE_PX / 2.0;
    match handle {
        Handle::Right => Point::new(bx.right() - inset, bx.top + bx.height / 2.0),
        Handle::Bottom => Point::new(bx.left + bx.width / 2.0, bx.bottom() - inset),
        Handle::Corner => Point::new(bx.right() - inset, bx.bottom() - inset),
    }
}

/// Press at `grab`, move by `(dx, dy)`, release.
fn simulate_gesture(engine: &mut EngineCore, id: WidgetId, grab: Point, dx: f64, dy: f64) -> Result<(), CliError> {
    let modifiers = Modifiers::default();
    engine.on_pointer_down(grab, Button::Primary, modifiers);
    if engine.controller().active_id() != Some(id) {
        return Err(CliError::GestureRejected { id, x: grab.x, y: grab.y });
    }
    let target = Point::new(grab.x + dx, grab.y + dy);
    engine.on_pointer_move(target, modifiers);
    engine.on_pointer_up(target, Button::Primary, modifiers);
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
