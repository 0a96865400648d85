//! Board geometry: validated dimensions and row-major cell points.

use crate::GameError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Largest side length accepted by [`BoardDimension::new`].
pub const MAX_DIMENSION: usize = 1024;

/// Side length N of an N×N board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "usize", into = "usize")]
pub struct BoardDimension(usize);

impl BoardDimension {
    /// Smallest playable side length.
    pub const MIN: usize = 2;

    /// Validates a side length.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] when `n` is below 2 or above
    /// [`MAX_DIMENSION`].
    #[instrument]
    pub fn new(n: usize) -> Result<Self, GameError> {
        if !(Self::MIN..=MAX_DIMENSION).contains(&n) {
            return Err(GameError::InvalidConfiguration(format!(
                "board dimension must be between {} and {}, got {}",
                Self::MIN,
                MAX_DIMENSION,
                n
            )));
        }
        Ok(Self(n))
    }

    /// Returns the side length.
    pub fn get(self) -> usize {
        self.0
    }

    /// Number of cells on the board (N²).
    pub fn cell_count(self) -> usize {
        self.0 * self.0
    }

    /// Index of the winning cell (N² − 1).
    pub fn final_cell(self) -> usize {
        self.cell_count() - 1
    }

    /// Returns the point for `index`, or `None` when it lies off the board.
    pub fn point(self, index: usize) -> Option<Point> {
        Point::from_index(self, index)
    }
}

impl TryFrom<usize> for BoardDimension {
    type Error = GameError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<BoardDimension> for usize {
    fn from(dimension: BoardDimension) -> Self {
        dimension.0
    }
}

/// A cell on the board.
///
/// The index is the normalized form; row and column are always derived from
/// it, so the three never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "RawPoint")]
#[display("cell {index} (row {row}, col {col})")]
pub struct Point {
    row: usize,
    col: usize,
    index: usize,
}

impl Point {
    /// Creates the point for a row-major `index` on a board of `dimension`.
    ///
    /// Returns `None` when `index >= N²`.
    pub fn from_index(dimension: BoardDimension, index: usize) -> Option<Self> {
        if index >= dimension.cell_count() {
            return None;
        }
        let n = dimension.get();
        Some(Self {
            row: index / n,
            col: index % n,
            index,
        })
    }

    /// Creates a point from coordinates already known to be on the board.
    pub(crate) fn from_row_col(dimension: BoardDimension, row: usize, col: usize) -> Self {
        debug_assert!(row < dimension.get() && col < dimension.get());
        Self {
            row,
            col,
            index: row * dimension.get() + col,
        }
    }

    /// Row of the cell (0 is the starting row).
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column of the cell.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Row-major index of the cell.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Checks that this point is the one `dimension` derives for its index.
    pub fn fits(&self, dimension: BoardDimension) -> bool {
        Self::from_index(dimension, self.index).as_ref() == Some(self)
    }
}

/// Wire form of a [`Point`] before its coordinates are checked.
#[derive(Deserialize)]
struct RawPoint {
    row: usize,
    col: usize,
    index: usize,
}

impl TryFrom<RawPoint> for Point {
    type Error = GameError;

    /// Accepts the point only if some valid dimension N gives
    /// `index == row * N + col` with `col < N`.
    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        let RawPoint { row, col, index } = raw;
        let consistent = match row {
            0 => index == col && col < MAX_DIMENSION,
            _ => index
                .checked_sub(col)
                .filter(|offset| offset % row == 0)
                .map(|offset| offset / row)
                .is_some_and(|n| n > col && (BoardDimension::MIN..=MAX_DIMENSION).contains(&n)),
        };
        if !consistent {
            return Err(GameError::InvalidConfiguration(format!(
                "point index {index} does not match row {row}, col {col}"
            )));
        }
        Ok(Self { row, col, index })
    }
}
