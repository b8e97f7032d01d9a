use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every card layout is 80 columns wide.
pub const COLS: usize = 80;

/// Shape family of a hole grid.
///
/// `Classic` is the 12-row keypunch layout (rows 12, 11, 0..9); `Line` is
/// the 8-row layout used to display bit-packed cards, one bit per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    Classic,
    Line,
}

impl GridMode {
    pub fn rows(self) -> usize {
        match self {
            GridMode::Classic => 12,
            GridMode::Line => 8,
        }
    }

    pub fn cols(self) -> usize {
        COLS
    }
}

impl fmt::Display for GridMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridMode::Classic => write!(f, "classic"),
            GridMode::Line => write!(f, "line"),
        }
    }
}

/// Structural violations caught at the grid boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("{mode} grids have {expected} rows, found {found}")]
    RowCount {
        mode: GridMode,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has {found} columns, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("operation requires a classic 12x80 grid, found {found} mode")]
    NotClassic { found: GridMode },
}

/// Rectangular matrix of punched/unpunched cells.
///
/// The shape is fixed by [`GridMode`] and checked once at construction;
/// a grid is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid", into = "RawGrid")]
pub struct HoleGrid {
    mode: GridMode,
    cells: Vec<bool>,
}

impl HoleGrid {
    /// Build a grid from row-major boolean rows, validating the shape.
    pub fn from_rows(mode: GridMode, rows: Vec<Vec<bool>>) -> Result<Self, ShapeError> {
        if rows.len() != mode.rows() {
            return Err(ShapeError::RowCount {
                mode,
                expected: mode.rows(),
                found: rows.len(),
            });
        }
        let mut cells = Vec::with_capacity(mode.rows() * mode.cols());
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != mode.cols() {
                return Err(ShapeError::RowWidth {
                    row,
                    expected: mode.cols(),
                    found: values.len(),
                });
            }
            cells.extend(values);
        }
        Ok(Self { mode, cells })
    }

    /// Build a grid by evaluating `cell` at every (row, column) position.
    pub fn from_fn<F: FnMut(usize, usize) -> bool>(mode: GridMode, mut cell: F) -> Self {
        let mut cells = Vec::with_capacity(mode.rows() * mode.cols());
        for row in 0..mode.rows() {
            for col in 0..mode.cols() {
                cells.push(cell(row, col));
            }
        }
        Self { mode, cells }
    }

    /// Grid with no punches at all.
    pub fn blank(mode: GridMode) -> Self {
        Self {
            mode,
            cells: vec![false; mode.rows() * mode.cols()],
        }
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    pub fn rows(&self) -> usize {
        self.mode.rows()
    }

    pub fn cols(&self) -> usize {
        self.mode.cols()
    }

    /// Whether the cell at (row, col) is punched. Panics out of range.
    pub fn is_punched(&self, row: usize, col: usize) -> bool {
        assert!(row < self.rows() && col < self.cols(), "cell out of range");
        self.cells[row * self.cols() + col]
    }

    /// Number of punched cells in one column.
    pub fn column_holes(&self, col: usize) -> usize {
        (0..self.rows())
            .filter(|&row| self.is_punched(row, col))
            .count()
    }

    /// Number of columns containing at least one punch.
    pub fn punched_columns(&self) -> usize {
        (0..self.cols())
            .filter(|&col| self.column_holes(col) > 0)
            .count()
    }

    /// Total punched cells across the whole grid.
    pub fn total_holes(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Plain-text card view with a ruler line and a row-label gutter.
    pub fn render(&self, style: RenderStyle) -> String {
        let (mark, blank) = match style {
            RenderStyle::AsciiX => ('X', ' '),
            RenderStyle::Ascii01 => ('1', '0'),
        };
        let mut out = String::with_capacity((self.rows() + 4) * (self.cols() + 8));
        writeln!(&mut out, "{} card ({}x{})", self.mode, self.rows(), self.cols()).unwrap();
        writeln!(&mut out, "     {}", ruler_line(self.cols())).unwrap();
        let separator = "-".repeat(self.cols());
        writeln!(&mut out, "     {}", separator).unwrap();
        for row in 0..self.rows() {
            write!(&mut out, "{:>3} |", self.row_label(row)).unwrap();
            for col in 0..self.cols() {
                out.push(if self.is_punched(row, col) { mark } else { blank });
            }
            writeln!(&mut out, "|").unwrap();
        }
        writeln!(&mut out, "     {}", separator).unwrap();
        out
    }

    fn row_label(&self, row: usize) -> String {
        match self.mode {
            GridMode::Classic => CLASSIC_ROW_LABELS[row].to_string(),
            GridMode::Line => format!("b{row}"),
        }
    }
}

/// Row labels for the classic layout, in top-to-bottom card order.
pub const CLASSIC_ROW_LABELS: [&str; 12] = [
    "12", "11", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
];

fn ruler_line(cols: usize) -> String {
    let mut ruler = String::with_capacity(cols);
    for col in 1..=cols {
        if col % 10 == 0 {
            let digit = ((col / 10) % 10) as u8;
            ruler.push(char::from(b'0' + digit));
        } else {
            ruler.push('.');
        }
    }
    ruler
}

/// ASCII rendering styles.
#[derive(Debug, Clone, Copy)]
pub enum RenderStyle {
    AsciiX,
    Ascii01,
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStyle::AsciiX => write!(f, "ascii-x"),
            RenderStyle::Ascii01 => write!(f, "ascii-01"),
        }
    }
}

/// Serde shape for [`HoleGrid`]; deserialization revalidates dimensions.
#[derive(Serialize, Deserialize)]
struct RawGrid {
    mode: GridMode,
    rows: Vec<Vec<bool>>,
}

impl TryFrom<RawGrid> for HoleGrid {
    type Error = ShapeError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        HoleGrid::from_rows(raw.mode, raw.rows)
    }
}

impl From<HoleGrid> for RawGrid {
    fn from(grid: HoleGrid) -> Self {
        let rows = (0..grid.rows())
            .map(|row| (0..grid.cols()).map(|col| grid.is_punched(row, col)).collect())
            .collect();
        RawGrid {
            mode: grid.mode,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rejects_wrong_row_count() {
        let rows = vec![vec![false; COLS]; 11];
        let err = HoleGrid::from_rows(GridMode::Classic, rows).unwrap_err();
        assert_eq!(
            err,
            ShapeError::RowCount {
                mode: GridMode::Classic,
                expected: 12,
                found: 11
            }
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut rows = vec![vec![false; COLS]; 8];
        rows[3] = vec![false; 79];
        let err = HoleGrid::from_rows(GridMode::Line, rows).unwrap_err();
        assert_eq!(
            err,
            ShapeError::RowWidth {
                row: 3,
                expected: 80,
                found: 79
            }
        );
    }

    #[test]
    fn from_fn_matches_is_punched() {
        let grid = HoleGrid::from_fn(GridMode::Classic, |row, col| row == 2 && col < 3);
        assert!(grid.is_punched(2, 0));
        assert!(grid.is_punched(2, 2));
        assert!(!grid.is_punched(2, 3));
        assert_eq!(grid.total_holes(), 3);
        assert_eq!(grid.punched_columns(), 3);
        assert_eq!(grid.column_holes(1), 1);
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let grid = HoleGrid::from_fn(GridMode::Classic, |row, col| row == col % 12);
        let json = serde_json::to_string(&grid).unwrap();
        let back: HoleGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        let bad = r#"{"mode":"classic","rows":[[true]]}"#;
        assert!(serde_json::from_str::<HoleGrid>(bad).is_err());
    }

    #[test]
    fn render_marks_punched_cells() {
        let grid = HoleGrid::from_fn(GridMode::Classic, |row, col| row == 0 && col == 0);
        let text = grid.render(RenderStyle::AsciiX);
        let row12 = text.lines().find(|l| l.starts_with(" 12 |")).unwrap();
        assert!(row12.contains("|X"));
    }
}
