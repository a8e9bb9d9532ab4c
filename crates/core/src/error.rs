//! Validation errors raised at board and session construction sites.

use std::fmt;

use crate::types::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};

/// Errors returned by board construction and session sizing.
///
/// Every other engine operation is total over well-formed boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// Requested session size outside `MIN_BOARD_SIZE..=MAX_BOARD_SIZE`.
    InvalidSize { size: usize },
    /// A board needs at least one row and column.
    EmptyBoard,
    /// Row `row` has `len` cells on a board with `size` rows.
    RaggedBoard { row: usize, len: usize, size: usize },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidSize { size } => write!(
                f,
                "invalid board size {}: must be between {} and {}",
                size, MIN_BOARD_SIZE, MAX_BOARD_SIZE
            ),
            GameError::EmptyBoard => write!(f, "board size must be at least 1"),
            GameError::RaggedBoard { row, len, size } => write!(
                f,
                "row {} has {} cells, expected {} for a square board",
                row, len, size
            ),
        }
    }
}

impl std::error::Error for GameError {}
