//! Shared numeric constants for the grid crate.

// ── Grid bounds ─────────────────────────────────────────────────
//
// These ranges are the contract for every serialized dashboard.

pub const COLUMNS_MIN: u32 = 1;
pub const COLUMNS_MAX: u32 = 12;
pub const COLUMNS_DEFAULT: u32 = 12;

pub const ROWS_MIN: u32 = 1;
pub const ROWS_MAX: u32 = 12;
pub const ROWS_DEFAULT: u32 = 8;

pub const GAP_MIN: u32 = 0;
pub const GAP_MAX: u32 = 100;
pub const GAP_DEFAULT: u32 = 10;

pub const PADDING_MIN: u32 = 0;
pub const PADDING_MAX: u32 = 500;
pub const PADDING_DEFAULT: u32 = 10;

pub const CORNER_RADIUS_MIN: u32 = 0;
pub const CORNER_RADIUS_MAX: u32 = 800;
pub const CORNER_RADIUS_DEFAULT: u32 = 4;

/// Step applied by a shifted arrow key when nudging a grid parameter.
pub const PARAM_COARSE_STEP: i64 = 10;

// ── Placement ───────────────────────────────────────────────────

/// Footprint in cells (columns, rows) of a newly added or duplicated widget.
pub const DEFAULT_WIDGET_SPAN: (u32, u32) = (2, 2);

/// Maximum number of map widgets on one dashboard.
pub const MAX_MAP_WIDGETS: usize = 16;

// ── Hit-testing ─────────────────────────────────────────────────

/// Width in pixels of the resize strips along a widget's right and bottom edges.
pub const HANDLE_SIZE_PX: f64 = 8.0;

/// Height in pixels of the hover header that carries the move control.
pub const HEADER_HEIGHT_PX: f64 = 28.0;
