//! Input model: edit mode, resize handles, and the drag/resize state machine.
//!
//! A gesture runs from pointer-down to pointer-up. While it is active the
//! controller holds the widget's rect at gesture start and a transient
//! preview rect; pointer moves only touch the preview. Release turns the last
//! preview into a [`Commit`] for the registry. Only one gesture can be active
//! at a time.
//!
//! Pixel motion is snapped to whole cells with `round(delta / (cell + gap))`,
//! measured from the gesture start rather than the previous event, so a slow
//! drag never lags a cell behind the pointer.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use tracing::debug;

use crate::cell::{Cell, Rect};
use crate::geometry::{CellSize, GridModel, Point};
use crate::registry::WidgetId;

/// Whether widgets accept manipulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Grid visible, widgets can be dragged, resized, and selected.
    #[default]
    Edit,
    /// Grid hidden, widgets are read-only.
    View,
}

/// Keyboard modifier keys held during an input event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Escape"`, `"ArrowUp"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Selection and mode state visible to the host UI.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub mode: EditMode,
    /// Widget with the selection outline, if any.
    pub selected_id: Option<WidgetId>,
    /// Widget whose inspector panel is open, if any.
    pub inspector_id: Option<WidgetId>,
}

/// Which resize handle a gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// Right edge: moves the end column.
    Right,
    /// Bottom edge: moves the end row.
    Bottom,
    /// Bottom-right corner: moves both.
    Corner,
}

impl Handle {
    #[must_use]
    pub fn moves_cols(self) -> bool {
        matches!(self, Self::Right | Self::Corner)
    }

    #[must_use]
    pub fn moves_rows(self) -> bool {
        matches!(self, Self::Bottom | Self::Corner)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Right => "ew-resize",
            Self::Bottom => "ns-resize",
            Self::Corner => "nwse-resize",
        }
    }
}

/// Kind of manipulation started on pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Drag,
    Resize(Handle),
}

/// Whole-cell offset derived from pointer motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellDelta {
    pub cols: i64,
    pub rows: i64,
}

/// Snap a pixel offset to the nearest whole number of cells.
///
/// A degenerate cell pitch (container smaller than its padding) snaps to zero.
#[must_use]
pub fn snap_delta(dx: f64, dy: f64, cell: CellSize, gap: f64) -> CellDelta {
    CellDelta { cols: snap_axis(dx, cell.width + gap), rows: snap_axis(dy, cell.height + gap) }
}

#[allow(clippy::cast_possible_truncation)]
fn snap_axis(delta: f64, pitch: f64) -> i64 {
    if !pitch.is_finite() || pitch <= 0.0 || !delta.is_finite() {
        return 0;
    }
    (delta / pitch).round() as i64
}

fn to_cell_coord(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(1)
}

/// Translate `origin` by `delta`, keeping its size, then slide it back inside
/// a `columns` × `rows` grid.
#[must_use]
pub fn drag_rect(origin: Rect, delta: CellDelta, columns: u32, rows: u32) -> Rect {
    let width = i64::from(origin.cols());
    let height = i64::from(origin.rows());
    let max_col = (i64::from(columns) - width + 1).max(1);
    let max_row = (i64::from(rows) - height + 1).max(1);
    let start_col = i64::from(origin.start.col).saturating_add(delta.cols).clamp(1, max_col);
    let start_row = i64::from(origin.start.row).saturating_add(delta.rows).clamp(1, max_row);
    Rect::new(
        Cell::new(to_cell_coord(start_row), to_cell_coord(start_col)),
        Cell::new(to_cell_coord(start_row + height - 1), to_cell_coord(start_col + width - 1)),
    )
}

/// Move the end corner of `origin` along the axes `handle` controls.
///
/// The start cell never moves. Each moved coordinate is held between the start
/// coordinate and the grid edge, so the rect can shrink to 1×1 but never flip.
#[must_use]
pub fn resize_rect(origin: Rect, handle: Handle, delta: CellDelta, columns: u32, rows: u32) -> Rect {
    let mut end = origin.end;
    if handle.moves_cols() {
        let lo = i64::from(origin.start.col);
        let hi = i64::from(columns).max(lo);
        end.col = to_cell_coord(i64::from(origin.end.col).saturating_add(delta.cols).clamp(lo, hi));
    }
    if handle.moves_rows() {
        let lo = i64::from(origin.start.row);
        let hi = i64::from(rows).max(lo);
        end.row = to_cell_coord(i64::from(origin.end.row).saturating_add(delta.rows).clamp(lo, hi));
    }
    Rect::new(origin.start, end)
}

/// State of the gesture state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving a widget by its move handle.
    Dragging {
        id: WidgetId,
        /// Widget rect when the gesture started.
        origin: Rect,
        /// Pointer position at pointer-down.
        start: Point,
        /// Candidate rect shown while the gesture is active.
        preview: Rect,
    },
    /// Resizing a widget by one of its handles.
    Resizing {
        id: WidgetId,
        handle: Handle,
        origin: Rect,
        start: Point,
        preview: Rect,
    },
}

/// Result of releasing a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub id: WidgetId,
    /// Rect before the gesture.
    pub from: Rect,
    /// Rect to write back to the registry.
    pub rect: Rect,
}

impl Commit {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.rect
    }
}

/// Drives drag and resize gestures for one dashboard.
#[derive(Debug, Default)]
pub struct ManipulationController {
    state: InputState,
}

impl ManipulationController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &InputState {
        &self.state
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, InputState::Idle)
    }

    /// Id of the widget under manipulation, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<WidgetId> {
        match self.state {
            InputState::Idle => None,
            InputState::Dragging { id, .. } | InputState::Resizing { id, .. } => Some(id),
        }
    }

    /// Current preview rect, if a gesture is active.
    #[must_use]
    pub fn preview(&self) -> Option<(WidgetId, Rect)> {
        match self.state {
            InputState::Idle => None,
            InputState::Dragging { id, preview, .. } | InputState::Resizing { id, preview, .. } => Some((id, preview)),
        }
    }

    /// Start a gesture on widget `id` whose committed rect is `origin`.
    ///
    /// Returns `false` and changes nothing when widgets are in view mode or
    /// another gesture is already active.
    pub fn begin(&mut self, id: WidgetId, gesture: Gesture, origin: Rect, start: Point, mode: EditMode) -> bool {
        if mode != EditMode::Edit || !self.is_idle() {
            return false;
        }
        self.state = match gesture {
            Gesture::Drag => InputState::Dragging { id, origin, start, preview: origin },
            Gesture::Resize(handle) => InputState::Resizing { id, handle, origin, start, preview: origin },
        };
        debug!(%id, ?gesture, %origin, "gesture started");
        true
    }

    /// Recompute the preview for a pointer at `pointer`.
    ///
    /// Returns the widget id and the new preview, or `None` when idle. Overlap
    /// with other widgets is allowed here; the preview is cosmetic.
    pub fn update(&mut self, pointer: Point, grid: &GridModel) -> Option<(WidgetId, Rect)> {
        let gap = f64::from(grid.config().gap);
        let cell = grid.cell_dimensions();
        let (columns, rows) = (grid.columns(), grid.rows());
        match &mut self.state {
            InputState::Idle => None,
            InputState::Dragging { id, origin, start, preview } => {
                let delta = snap_delta(pointer.x - start.x, pointer.y - start.y, cell, gap);
                *preview = drag_rect(*origin, delta, columns, rows);
                Some((*id, *preview))
            }
            InputState::Resizing { id, handle, origin, start, preview } => {
                let delta = snap_delta(pointer.x - start.x, pointer.y - start.y, cell, gap);
                *preview = resize_rect(*origin, *handle, delta, columns, rows);
                Some((*id, *preview))
            }
        }
    }

    /// End the gesture, turning the last preview into a commit.
    ///
    /// A release with no intervening move commits the original rect.
    pub fn release(&mut self) -> Option<Commit> {
        let commit = match std::mem::take(&mut self.state) {
            InputState::Idle => return None,
            InputState::Dragging { id, origin, preview, .. } | InputState::Resizing { id, origin, preview, .. } => {
                Commit { id, from: origin, rect: preview }
            }
        };
        debug!(id = %commit.id, from = %commit.from, to = %commit.rect, "gesture released");
        Some(commit)
    }

    /// Abandon the gesture and discard its preview. Returns the widget id.
    pub fn cancel(&mut self) -> Option<WidgetId> {
        let id = self.active_id();
        self.state = InputState::Idle;
        if let Some(id) = id {
            debug!(%id, "gesture cancelled");
        }
        id
    }
}
