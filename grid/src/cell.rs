//! Cell identifiers and grid-space rectangles.
//!
//! A cell is addressed by a 1-based row and a 1-based column written in
//! spreadsheet letters: `"3F"` is row 3, column 6. Columns past `Z` continue
//! as `AA`, `AB`, ... so every positive column has exactly one spelling.
//! A [`Rect`] is an inclusive range of cells from its top-left `start` to its
//! bottom-right `end`.

#[cfg(test)]
#[path = "cell_test.rs"]
mod cell_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// One grid cell. Both coordinates are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    #[must_use]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, column_letters(self.col))
    }
}

impl FromStr for Cell {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<String> for Cell {
    type Error = GridError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.to_string()
    }
}

/// Parse a cell identifier such as `"12B"` or `"3AA"`.
///
/// The accepted shape is one or more ASCII digits followed by one or more
/// uppercase ASCII letters. Row `0` and coordinates that overflow `u32` are
/// rejected.
///
/// # Errors
///
/// Returns [`GridError::InvalidCellId`] for any other input.
pub fn parse(id: &str) -> Result<Cell, GridError> {
    let invalid = || GridError::InvalidCellId(id.to_owned());

    let split = id.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
    let (digits, letters) = id.split_at(split);
    if digits.is_empty() || letters.is_empty() {
        return Err(invalid());
    }

    let row = digits.parse::<u32>().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    let col = column_number(letters).ok_or_else(invalid)?;
    Ok(Cell { row, col })
}

/// Format a cell identifier. Inverse of [`parse`] for `row, col >= 1`.
#[must_use]
pub fn format(row: u32, col: u32) -> String {
    Cell::new(row, col).to_string()
}

/// Spreadsheet letters for a 1-based column: 1 → `A`, 26 → `Z`, 27 → `AA`.
///
/// Column `0` has no spelling and yields an empty string.
#[must_use]
pub fn column_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(ALPHABET[rem as usize]));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 1-based column number for a run of uppercase letters, `None` if any byte
/// is not `A..=Z` or the value overflows.
fn column_number(letters: &str) -> Option<u32> {
    letters.bytes().try_fold(0u32, |acc, b| {
        if !b.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1)
    })
}

/// Size of a rectangle in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub cols: u32,
    pub rows: u32,
}

impl Span {
    #[must_use]
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }
}

impl Default for Span {
    fn default() -> Self {
        let (cols, rows) = crate::consts::DEFAULT_WIDGET_SPAN;
        Self { cols, rows }
    }
}

/// Inclusive grid-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(rename = "startCell")]
    pub start: Cell,
    #[serde(rename = "endCell")]
    pub end: Cell,
}

impl Rect {
    #[must_use]
    pub fn new(start: Cell, end: Cell) -> Self {
        Self { start, end }
    }

    /// Parse a rect from its two corner identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidCellId`] if either identifier is malformed.
    pub fn parse(start: &str, end: &str) -> Result<Self, GridError> {
        Ok(Self { start: parse(start)?, end: parse(end)? })
    }

    /// Rect of `span` anchored with its top-left corner at `start`.
    #[must_use]
    pub fn at(start: Cell, span: Span) -> Self {
        let end = Cell::new(start.row + span.rows.saturating_sub(1), start.col + span.cols.saturating_sub(1));
        Self { start, end }
    }

    /// Whether `start` is above and left of (or equal to) `end`.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.start.row <= self.end.row && self.start.col <= self.end.col
    }

    /// Width in columns.
    #[must_use]
    pub fn cols(&self) -> u32 {
        self.end.col.saturating_sub(self.start.col) + 1
    }

    /// Height in rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.end.row.saturating_sub(self.start.row) + 1
    }

    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.cols(), self.rows())
    }

    /// Number of cells covered.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        u64::from(self.cols()) * u64::from(self.rows())
    }

    /// Whether the rect lies entirely inside a `columns` × `rows` grid.
    #[must_use]
    pub fn fits(&self, columns: u32, rows: u32) -> bool {
        self.is_ordered() && self.start.row >= 1 && self.start.col >= 1 && self.end.row <= rows && self.end.col <= columns
    }

    /// Pull the rect inside a `columns` × `rows` grid.
    ///
    /// Width and height are kept when they still fit; otherwise they shrink to
    /// the grid size. The rect slides toward the origin rather than being cut.
    #[must_use]
    pub fn clamp_to(self, columns: u32, rows: u32) -> Self {
        let (start_col, end_col) = clamp_axis(self.start.col, self.end.col, columns);
        let (start_row, end_row) = clamp_axis(self.start.row, self.end.row, rows);
        Self { start: Cell::new(start_row, start_col), end: Cell::new(end_row, end_col) }
    }

    /// Three-line readout shown in a widget's debug box: start, end, cell count.
    #[must_use]
    pub fn debug_label(&self) -> String {
        format!("{}\n{}\n{} cells", self.start, self.end, self.cell_count())
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

fn clamp_axis(start: u32, end: u32, bound: u32) -> (u32, u32) {
    let bound = bound.max(1);
    let span = (end.saturating_sub(start) + 1).min(bound);
    let start = start.clamp(1, bound - span + 1);
    (start, start + span - 1)
}
