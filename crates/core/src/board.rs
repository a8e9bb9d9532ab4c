//! Board module - the square tile grid
//!
//! The board is an N x N grid where each cell is empty or holds a power of two.
//! Cells live in a flat vector in row-major order (`row * size + col`).
//! Coordinates are `(row, col)`: row 0 is the top, col 0 is the left edge.
//!
//! A `Board` is always square. The only ways to build one are [`Board::new`]
//! and [`Board::from_rows`], which both validate their input, so every other
//! operation can assume a well-formed grid.

use std::fmt;

use crate::error::GameError;
use crate::types::Tile;

/// The tile produced by merging `a` into `b`, if they can merge.
///
/// Equal tiles merge unless their double would not fit in a `u32`.
pub(crate) fn merge_value(a: u32, b: u32) -> Option<u32> {
    if a == b {
        a.checked_mul(2)
    } else {
        None
    }
}

/// Square 2048 board using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    /// Flat cells, row-major order (row * size + col)
    cells: Vec<Tile>,
}

impl Board {
    /// Create an empty `size` x `size` board.
    ///
    /// Fails with [`GameError::EmptyBoard`] when `size` is 0.
    pub fn new(size: usize) -> Result<Self, GameError> {
        if size == 0 {
            return Err(GameError::EmptyBoard);
        }
        Ok(Self {
            size,
            cells: vec![None; size * size],
        })
    }

    /// Build a board from explicit rows.
    ///
    /// Every row must have exactly as many cells as there are rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_core::Board;
    ///
    /// let board = Board::from_rows(vec![vec![Some(2), None], vec![None, Some(4)]]).unwrap();
    /// assert_eq!(board.size(), 2);
    /// assert_eq!(board.get(1, 1), Some(Some(4)));
    ///
    /// assert!(Board::from_rows(vec![vec![Some(2), None], vec![None]]).is_err());
    /// ```
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, GameError> {
        let size = rows.len();
        if size == 0 {
            return Err(GameError::EmptyBoard);
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(GameError::RaggedBoard {
                    row,
                    len: values.len(),
                    size,
                });
            }
            cells.extend(values);
        }

        Ok(Self { size, cells })
    }

    /// Assemble a board from rows produced by the engine itself.
    pub(crate) fn from_row_iter<I>(size: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<Tile>>,
    {
        let mut cells = Vec::with_capacity(size * size);
        for row in rows {
            debug_assert_eq!(row.len(), size);
            cells.extend(row);
        }
        debug_assert_eq!(cells.len(), size * size);
        Self { size, cells }
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(row * self.size + col)
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the cell at `(row, col)`, or `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    /// Set the cell at `(row, col)`.
    /// Returns false if out of bounds
    pub fn set(&mut self, row: usize, col: usize, tile: Tile) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.cells[idx] = tile;
                true
            }
            None => false,
        }
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> Option<&[Tile]> {
        if row >= self.size {
            return None;
        }
        let start = row * self.size;
        Some(&self.cells[start..start + self.size])
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.cells.chunks(self.size)
    }

    /// Copy into nested rows
    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Write rows into an existing nested vector, reusing its allocations.
    pub fn write_rows_into(&self, out: &mut Vec<Vec<Tile>>) {
        out.resize_with(self.size, Vec::new);
        for (dst, src) in out.iter_mut().zip(self.rows()) {
            dst.clear();
            dst.extend_from_slice(src);
        }
    }

    /// The flat row-major cell array
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    /// Coordinates of every empty cell, in row-major order
    pub fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(move |(idx, _)| (idx / size, idx % size))
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn tile_count(&self) -> usize {
        self.cells.len() - self.empty_count()
    }

    /// Largest tile on the board
    pub fn max_tile(&self) -> Option<u32> {
        self.cells.iter().flatten().copied().max()
    }

    /// Sum of all tile values
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().flatten().map(|&v| v as u64).sum()
    }

    /// Check whether any cell holds exactly `value`
    pub fn contains(&self, value: u32) -> bool {
        self.cells.iter().any(|&c| c == Some(value))
    }

    /// Swap rows and columns
    pub fn transpose(&self) -> Board {
        let n = self.size;
        let mut cells = vec![None; n * n];
        for row in 0..n {
            for col in 0..n {
                cells[col * n + row] = self.cells[row * n + col];
            }
        }
        Board { size: n, cells }
    }

    /// Mirror every row left-to-right
    pub fn reverse_rows(&self) -> Board {
        let mut cells = self.cells.clone();
        for row in cells.chunks_mut(self.size) {
            row.reverse();
        }
        Board {
            size: self.size,
            cells,
        }
    }

    /// Check whether any slide would change the board.
    ///
    /// True iff some cell is empty or two orthogonally adjacent cells can
    /// merge. This is the game-over oracle and agrees exactly with
    /// "some direction reports `moved`".
    pub fn can_move(&self) -> bool {
        if self.cells.iter().any(|c| c.is_none()) {
            return true;
        }

        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                let here = self.cells[row * n + col];
                if col + 1 < n && mergeable(here, self.cells[row * n + col + 1]) {
                    return true;
                }
                if row + 1 < n && mergeable(here, self.cells[(row + 1) * n + col]) {
                    return true;
                }
            }
        }

        false
    }
}

fn mergeable(a: Tile, b: Tile) -> bool {
    matches!((a, b), (Some(a), Some(b)) if merge_value(a, b).is_some())
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                match cell {
                    Some(v) => write!(f, "{:>6}", v)?,
                    None => write!(f, "{:>6}", '.')?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new(4).unwrap();
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(0, 3), Some(3));
        assert_eq!(board.index(1, 0), Some(4));
        assert_eq!(board.index(3, 3), Some(15));
        assert_eq!(board.index(4, 0), None);
        assert_eq!(board.index(0, 4), None);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(Board::new(0), Err(GameError::EmptyBoard));
        assert_eq!(Board::from_rows(Vec::new()), Err(GameError::EmptyBoard));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Board::from_rows(vec![vec![None, None], vec![None, None, None]]).unwrap_err();
        assert_eq!(
            err,
            GameError::RaggedBoard {
                row: 1,
                len: 3,
                size: 2
            }
        );
    }

    #[test]
    fn test_transpose_swaps_axes() {
        let board = Board::from_rows(vec![
            vec![Some(2), Some(4), None],
            vec![None, Some(8), None],
            vec![Some(16), None, Some(32)],
        ])
        .unwrap();
        let t = board.transpose();
        assert_eq!(
            t.to_rows(),
            vec![
                vec![Some(2), None, Some(16)],
                vec![Some(4), Some(8), None],
                vec![None, None, Some(32)],
            ]
        );
        assert_eq!(t.transpose(), board);
    }

    #[test]
    fn test_write_rows_into_reuses_and_shrinks() {
        let board = Board::from_rows(vec![vec![Some(2), None], vec![None, Some(4)]]).unwrap();
        let mut out = vec![vec![None; 5]; 5];
        board.write_rows_into(&mut out);
        assert_eq!(out, board.to_rows());
    }

    #[test]
    fn test_single_cell_board_never_moves_when_full() {
        let board = Board::from_rows(vec![vec![Some(2)]]).unwrap();
        assert!(!board.can_move());
        assert!(Board::new(1).unwrap().can_move());
    }

    #[test]
    fn test_full_board_of_largest_tiles_is_stuck() {
        let top = Some(1u32 << 31);
        let board = Board::from_rows(vec![vec![top, top], vec![top, top]]).unwrap();
        assert!(!board.can_move());

        let half = Some(1u32 << 30);
        let board = Board::from_rows(vec![vec![half, half], vec![top, top]]).unwrap();
        assert!(board.can_move());
    }

    #[test]
    fn test_merge_value_checks_overflow() {
        assert_eq!(merge_value(2, 2), Some(4));
        assert_eq!(merge_value(2, 4), None);
        assert_eq!(merge_value(1 << 30, 1 << 30), Some(1 << 31));
        assert_eq!(merge_value(1 << 31, 1 << 31), None);
    }
}
