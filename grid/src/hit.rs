//! Pointer hit-testing against widget boxes and their handles.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_SIZE_PX, HEADER_HEIGHT_PX};
use crate::geometry::{GridModel, Point};
use crate::input::Handle;
use crate::registry::{WidgetId, WidgetRegistry};

/// Which part of a widget was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// Widget content. Selects but does not start a gesture.
    Body,
    /// Header strip along the top edge. Starts a drag.
    MoveHandle,
    /// Right edge, bottom edge, or bottom-right corner. Starts a resize.
    ResizeHandle(Handle),
}

impl HitPart {
    /// CSS cursor to show while hovering this part.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Body => "default",
            Self::MoveHandle => "move",
            Self::ResizeHandle(handle) => handle.cursor(),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: WidgetId,
    pub part: HitPart,
}

/// Find the topmost widget under `pt` and the part of it that was hit.
///
/// Later widgets draw above earlier ones, so the search runs back to front.
/// Handles take priority over the header, the header over the body.
#[must_use]
pub fn hit_test(pt: Point, registry: &WidgetRegistry, grid: &GridModel) -> Option<Hit> {
    registry.records().rev().find_map(|record| {
        let bx = grid.pixel_box(record.rect);
        if !bx.contains(pt) {
            return None;
        }
        let near_right = bx.right() - pt.x <= HANDLE_SIZE_PX;
        let near_bottom = bx.bottom() - pt.y <= HANDLE_SIZE_PX;
        let part = match (near_right, near_bottom) {
            (true, true) => HitPart::ResizeHandle(Handle::Corner),
            (true, false) => HitPart::ResizeHandle(Handle::Right),
            (false, true) => HitPart::ResizeHandle(Handle::Bottom),
            (false, false) if pt.y - bx.top <= HEADER_HEIGHT_PX => HitPart::MoveHandle,
            (false, false) => HitPart::Body,
        };
        Some(Hit { id: record.id, part })
    })
}
