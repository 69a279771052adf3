//! Collision-aware placement on the cell grid.
//!
//! Grids are small (at most 12×12 by the configured bounds) and widget counts
//! are capped, so a first-fit linear scan is enough: `O(rows · columns · n)`.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use crate::cell::{Cell, Rect, Span};
use crate::geometry::GridConfig;

/// Whether two inclusive rects share at least one cell.
///
/// Two rects are disjoint exactly when one lies entirely above, below, left
/// of, or right of the other.
#[must_use]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    !(a.end.row < b.start.row || b.end.row < a.start.row || a.end.col < b.start.col || b.end.col < a.start.col)
}

/// Whether `candidate` overlaps none of `occupied`.
#[must_use]
pub fn is_free<'a, I>(candidate: &Rect, occupied: I) -> bool
where
    I: IntoIterator<Item = &'a Rect>,
{
    occupied.into_iter().all(|r| !overlaps(candidate, r))
}

/// First free rect of `span` in row-major anchor order, or `None` when the
/// grid has no room for it.
///
/// Anchors run over rows first, then columns within a row, and only over
/// anchors where the whole span stays inside the grid.
#[must_use]
pub fn find_free_rect(span: Span, occupied: &[Rect], config: &GridConfig) -> Option<Rect> {
    if span.cols == 0 || span.rows == 0 || span.cols > config.columns || span.rows > config.rows {
        return None;
    }
    let last_row = config.rows - span.rows + 1;
    let last_col = config.columns - span.cols + 1;
    (1..=last_row)
        .flat_map(|row| (1..=last_col).map(move |col| Rect::at(Cell::new(row, col), span)))
        .find(|candidate| is_free(candidate, occupied))
}
