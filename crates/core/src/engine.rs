//! Move engine - slide and merge in the four directions
//!
//! There is exactly one merge primitive, [`move_row_left`]. Every other
//! direction is derived from it by changing the coordinate frame:
//!
//! - **Right**: reverse each row, slide left, reverse back
//! - **Up**: transpose, slide left, transpose back
//! - **Down**: transpose, slide right, transpose back
//!
//! All functions here are pure. They never spawn tiles; that is the session's
//! job, and only after a move reports `moved`.

use crate::board::{merge_value, Board};
use crate::types::{Direction, Tile};

/// Outcome of sliding a board in one direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    /// The board after the slide (no new tile yet)
    pub board: Board,
    /// Sum of the values created by merges during this move
    pub score: u64,
    /// Whether any cell changed. When false, `board` equals the input.
    pub moved: bool,
}

/// Drop the empty cells of a row, keeping order.
///
/// `[2, _, 2, 4]` becomes `[2, 2, 4]`.
fn compress_row(row: &[Tile]) -> Vec<u32> {
    row.iter().flatten().copied().collect()
}

/// Merge a compressed row in one left-to-right pass and pad to `len`.
///
/// Equal neighbours become one doubled tile; the pass then skips both, so a
/// freshly merged tile is never merged again in the same move. A pair whose
/// double does not fit a tile stays apart.
fn merge_compressed(values: &[u32], len: usize) -> (Vec<Tile>, u64) {
    let mut merged = Vec::with_capacity(len);
    let mut score = 0u64;
    let mut i = 0;

    while i < values.len() {
        let doubled = values.get(i + 1).and_then(|&next| merge_value(values[i], next));
        if let Some(doubled) = doubled {
            merged.push(Some(doubled));
            score += u64::from(doubled);
            i += 2;
        } else {
            merged.push(Some(values[i]));
            i += 1;
        }
    }

    merged.resize(len, None);
    (merged, score)
}

/// Slide a single row to the left: compress, merge, pad.
///
/// Returns the new row and the score gained.
///
/// # Examples
///
/// ```
/// use tui_2048_core::engine::move_row_left;
///
/// let (row, score) = move_row_left(&[Some(2), None, Some(2), Some(2)]);
/// assert_eq!(row, vec![Some(4), Some(2), None, None]);
/// assert_eq!(score, 4);
/// ```
pub fn move_row_left(row: &[Tile]) -> (Vec<Tile>, u64) {
    merge_compressed(&compress_row(row), row.len())
}

/// Slide a single row to the right by mirroring the left slide.
pub fn move_row_right(row: &[Tile]) -> (Vec<Tile>, u64) {
    let reversed: Vec<Tile> = row.iter().rev().copied().collect();
    let (mut moved, score) = move_row_left(&reversed);
    moved.reverse();
    (moved, score)
}

fn slide_rows(board: &Board, slide: fn(&[Tile]) -> (Vec<Tile>, u64)) -> MoveResult {
    let mut moved = false;
    let mut score = 0;

    let rows: Vec<Vec<Tile>> = board
        .rows()
        .map(|row| {
            let (next, gained) = slide(row);
            if next.as_slice() != row {
                moved = true;
            }
            score += gained;
            next
        })
        .collect();

    MoveResult {
        board: Board::from_row_iter(board.size(), rows),
        score,
        moved,
    }
}

/// Slide every row to the left.
pub fn move_left(board: &Board) -> MoveResult {
    slide_rows(board, move_row_left)
}

/// Slide every row to the right.
pub fn move_right(board: &Board) -> MoveResult {
    slide_rows(board, move_row_right)
}

/// Slide every column up (transpose, left, transpose).
pub fn move_up(board: &Board) -> MoveResult {
    let result = move_left(&board.transpose());
    MoveResult {
        board: result.board.transpose(),
        ..result
    }
}

/// Slide every column down (transpose, right, transpose).
pub fn move_down(board: &Board) -> MoveResult {
    let result = move_right(&board.transpose());
    MoveResult {
        board: result.board.transpose(),
        ..result
    }
}

/// Slide in the given direction.
pub fn apply_move(board: &Board, direction: Direction) -> MoveResult {
    match direction {
        Direction::Up => move_up(board),
        Direction::Down => move_down(board),
        Direction::Left => move_left(board),
        Direction::Right => move_right(board),
    }
}
