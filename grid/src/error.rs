//! Error taxonomy for the layout engine and the dashboard store.
//!
//! No operation retries on its own. Every failure is returned synchronously to
//! the caller of the failing operation, which decides whether to surface it
//! (`NoSpaceAvailable`, `WidgetLimit`) or treat it as a bug (`OutOfBounds`,
//! `UnknownWidgetType`).

use crate::cell::Rect;
use crate::registry::{WidgetId, WidgetKind};

/// Stable machine-readable code for an error, used by hosts that map errors
/// to user-facing messages.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// Whether the user can act on the error (free space, remove a widget).
    fn recoverable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Malformed cell identifier. Callers must reject the input, never guess.
    #[error("invalid cell id: {0:?}")]
    InvalidCellId(String),
    /// A rectangle falls outside the current grid.
    #[error("rect {rect} is outside the {columns}x{rows} grid")]
    OutOfBounds { rect: Rect, columns: u32, rows: u32 },
    /// The placement search found no free rectangle.
    #[error("no available space for a new widget")]
    NoSpaceAvailable,
    /// The widget kind is unknown or was never registered.
    #[error("unknown widget type: {0}")]
    UnknownWidgetType(String),
    /// A widget id string is not of the form `<kind>-<n>`.
    #[error("invalid widget id: {0:?}")]
    InvalidWidgetId(String),
    /// No widget with this id exists on the current dashboard.
    #[error("unknown widget: {0}")]
    UnknownWidget(WidgetId),
    /// The per-kind instance cap has been reached.
    #[error("maximum of {max} {kind} widgets allowed per dashboard")]
    WidgetLimit { kind: WidgetKind, max: usize },
}

impl ErrorCode for GridError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCellId(_) => "E_INVALID_CELL_ID",
            Self::OutOfBounds { .. } => "E_OUT_OF_BOUNDS",
            Self::NoSpaceAvailable => "E_NO_SPACE",
            Self::UnknownWidgetType(_) => "E_UNKNOWN_WIDGET_TYPE",
            Self::InvalidWidgetId(_) => "E_INVALID_WIDGET_ID",
            Self::UnknownWidget(_) => "E_UNKNOWN_WIDGET",
            Self::WidgetLimit { .. } => "E_WIDGET_LIMIT",
        }
    }

    fn recoverable(&self) -> bool {
        matches!(self, Self::NoSpaceAvailable | Self::WidgetLimit { .. })
    }
}

/// Error returned by a [`crate::dashboard::DashboardStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("dashboard not found: {0}")]
    NotFound(String),
    #[error("invalid dashboard name: {0:?}")]
    InvalidName(String),
    #[error("dashboard store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed dashboard document: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_DASHBOARD_NOT_FOUND",
            Self::InvalidName(_) => "E_INVALID_DASHBOARD_NAME",
            Self::Io(_) => "E_STORE_IO",
            Self::Json(_) => "E_STORE_JSON",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
