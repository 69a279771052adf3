//! Grid configuration and the projection from grid space to pixels.
//!
//! All pixel math derives from one formula: the container is inset by
//! `padding` on every side, then split into `columns` equal cells separated by
//! `gap`. Cell sizes are recomputed on every query so a container resize is
//! picked up without invalidation.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Rect};
use crate::consts::*;
use crate::error::GridError;

/// A point in container pixel space (CSS pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel size of the grid container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pixel size of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub width: f64,
    pub height: f64,
}

/// Absolute pixel box of a widget inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelBox {
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.left && pt.x <= self.right() && pt.y >= self.top && pt.y <= self.bottom()
    }
}

/// Layout parameters of a dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    pub gap: u32,
    pub padding: u32,
    pub corner_radius: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: COLUMNS_DEFAULT,
            rows: ROWS_DEFAULT,
            gap: GAP_DEFAULT,
            padding: PADDING_DEFAULT,
            corner_radius: CORNER_RADIUS_DEFAULT,
        }
    }
}

/// One adjustable field of [`GridConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridParam {
    Columns,
    Rows,
    Gap,
    Padding,
    CornerRadius,
}

impl GridParam {
    /// Inclusive `(min, max)` range for this parameter.
    #[must_use]
    pub fn bounds(self) -> (u32, u32) {
        match self {
            Self::Columns => (COLUMNS_MIN, COLUMNS_MAX),
            Self::Rows => (ROWS_MIN, ROWS_MAX),
            Self::Gap => (GAP_MIN, GAP_MAX),
            Self::Padding => (PADDING_MIN, PADDING_MAX),
            Self::CornerRadius => (CORNER_RADIUS_MIN, CORNER_RADIUS_MAX),
        }
    }

    #[must_use]
    pub fn clamp(self, value: i64) -> u32 {
        let (min, max) = self.bounds();
        let clamped = value.clamp(i64::from(min), i64::from(max));
        u32::try_from(clamped).unwrap_or(min)
    }
}

impl GridConfig {
    #[must_use]
    pub fn get(&self, param: GridParam) -> u32 {
        match param {
            GridParam::Columns => self.columns,
            GridParam::Rows => self.rows,
            GridParam::Gap => self.gap,
            GridParam::Padding => self.padding,
            GridParam::CornerRadius => self.corner_radius,
        }
    }

    /// Set a parameter, clamping into its documented range.
    pub fn set(&mut self, param: GridParam, value: i64) {
        let value = param.clamp(value);
        match param {
            GridParam::Columns => self.columns = value,
            GridParam::Rows => self.rows = value,
            GridParam::Gap => self.gap = value,
            GridParam::Padding => self.padding = value,
            GridParam::CornerRadius => self.corner_radius = value,
        }
    }

    /// Nudge a parameter by `delta`, clamping into its range.
    pub fn adjust(&mut self, param: GridParam, delta: i64) {
        self.set(param, i64::from(self.get(param)) + delta);
    }

    /// Copy of this config with every field pulled into its range.
    #[must_use]
    pub fn clamped(self) -> Self {
        let mut out = self;
        for param in [GridParam::Columns, GridParam::Rows, GridParam::Gap, GridParam::Padding, GridParam::CornerRadius] {
            out.set(param, i64::from(self.get(param)));
        }
        out
    }

    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        self.clamped() == *self
    }

    /// Whether switching from `self` to `next` changes the cell layout, as
    /// opposed to only its spacing.
    #[must_use]
    pub fn needs_rebuild(&self, next: &Self) -> bool {
        self.columns != next.columns || self.rows != next.rows
    }
}

/// Per-cell pixel size for `config` inside a container of `size`.
#[must_use]
pub fn cell_dimensions(config: &GridConfig, size: PixelSize) -> CellSize {
    let gap = f64::from(config.gap);
    let padding = f64::from(config.padding);
    let columns = f64::from(config.columns.max(1));
    let rows = f64::from(config.rows.max(1));
    CellSize {
        width: (size.width - padding * 2.0 - (columns - 1.0) * gap) / columns,
        height: (size.height - padding * 2.0 - (rows - 1.0) * gap) / rows,
    }
}

/// Top-left pixel of a cell.
#[must_use]
pub fn cell_to_pixel(cell: Cell, config: &GridConfig, size: PixelSize) -> Point {
    let dims = cell_dimensions(config, size);
    let gap = f64::from(config.gap);
    let padding = f64::from(config.padding);
    Point {
        x: padding + f64::from(cell.col.saturating_sub(1)) * (dims.width + gap),
        y: padding + f64::from(cell.row.saturating_sub(1)) * (dims.height + gap),
    }
}

/// Pixel box spanning from the start cell's top-left to the end cell's
/// bottom-right, gaps between covered cells included.
#[must_use]
pub fn rect_to_pixel_box(rect: Rect, config: &GridConfig, size: PixelSize) -> PixelBox {
    let dims = cell_dimensions(config, size);
    let gap = f64::from(config.gap);
    let origin = cell_to_pixel(rect.start, config, size);
    let col_gaps = f64::from(rect.end.col.saturating_sub(rect.start.col));
    let row_gaps = f64::from(rect.end.row.saturating_sub(rect.start.row));
    PixelBox {
        left: origin.x,
        top: origin.y,
        width: (col_gaps + 1.0) * dims.width + col_gaps * gap,
        height: (row_gaps + 1.0) * dims.height + row_gaps * gap,
    }
}

/// What the host must redo after a config change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Unchanged,
    /// Columns or rows changed: rebuild the cell layout and re-validate rects.
    Rebuild,
    /// Only spacing changed: reproject existing rects to new pixel boxes.
    Reproject,
}

/// Grid configuration plus the current container size.
#[derive(Debug, Clone, Default)]
pub struct GridModel {
    config: GridConfig,
    size: PixelSize,
}

impl GridModel {
    #[must_use]
    pub fn new(config: GridConfig, size: PixelSize) -> Self {
        Self { config: config.clamped(), size }
    }

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    #[must_use]
    pub fn columns(&self) -> u32 {
        self.config.columns
    }

    #[must_use]
    pub fn rows(&self) -> u32 {
        self.config.rows
    }

    /// Replace the configuration (clamped into bounds) and report what changed.
    pub fn set_config(&mut self, config: GridConfig) -> ConfigChange {
        let next = config.clamped();
        let change = if next == self.config {
            ConfigChange::Unchanged
        } else if self.config.needs_rebuild(&next) {
            ConfigChange::Rebuild
        } else {
            ConfigChange::Reproject
        };
        self.config = next;
        change
    }

    pub fn set_size(&mut self, size: PixelSize) {
        self.size = size;
    }

    /// Current cell size. Never cached.
    #[must_use]
    pub fn cell_dimensions(&self) -> CellSize {
        cell_dimensions(&self.config, self.size)
    }

    #[must_use]
    pub fn cell_to_pixel(&self, cell: Cell) -> Point {
        cell_to_pixel(cell, &self.config, self.size)
    }

    #[must_use]
    pub fn pixel_box(&self, rect: Rect) -> PixelBox {
        rect_to_pixel_box(rect, &self.config, self.size)
    }

    /// Check that `rect` is ordered and inside the current grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] otherwise.
    pub fn validate(&self, rect: Rect) -> Result<(), GridError> {
        if rect.fits(self.config.columns, self.config.rows) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds { rect, columns: self.config.columns, rows: self.config.rows })
        }
    }

    /// Whether `cell` lies inside the current grid.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        (1..=self.config.rows).contains(&cell.row) && (1..=self.config.columns).contains(&cell.col)
    }

    /// Every cell id in row-major order, the labels of the background grid.
    #[must_use]
    pub fn cell_ids(&self) -> Vec<String> {
        (1..=self.config.rows)
            .flat_map(|row| (1..=self.config.columns).map(move |col| Cell::new(row, col).to_string()))
            .collect()
    }
}
