//! Engine tests - worked examples for the four slides and tile spawning

use tui_2048::core::engine::move_row_left;
use tui_2048::core::{
    apply_move, move_down, move_left, move_right, move_up, spawn_random_tile, Board, ScriptedTiles,
};
use tui_2048::types::Direction;

fn b(rows: &[&[u32]]) -> Board {
    Board::from_rows(
        rows.iter()
            .map(|r| r.iter().map(|&v| if v == 0 { None } else { Some(v) }).collect())
            .collect(),
    )
    .unwrap()
}

fn row(values: &[u32]) -> Vec<Option<u32>> {
    values.iter().map(|&v| if v == 0 { None } else { Some(v) }).collect()
}

#[test]
fn test_left_merges_pair() {
    let board = b(&[&[2, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]);
    let result = move_left(&board);
    assert!(result.moved);
    assert_eq!(result.score, 4);
    assert_eq!(result.board, b(&[&[4, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]));
}

#[test]
fn test_row_left_merges_leftmost_pair_first() {
    assert_eq!(move_row_left(&row(&[2, 0, 2, 2])), (row(&[4, 2, 0, 0]), 4));
}

#[test]
fn test_row_left_merged_tile_does_not_merge_again() {
    assert_eq!(move_row_left(&row(&[4, 4, 8, 0])), (row(&[8, 8, 0, 0]), 8));
    assert_eq!(move_row_left(&row(&[2, 2, 2, 2])), (row(&[4, 4, 0, 0]), 8));
}

#[test]
fn test_right_mirrors_left() {
    let board = b(&[&[2, 2, 2, 0], &[0, 4, 0, 4], &[8, 0, 0, 0], &[0, 0, 0, 0]]);
    let result = move_right(&board);
    assert!(result.moved);
    assert_eq!(result.score, 12);
    assert_eq!(result.board, b(&[&[0, 0, 2, 4], &[0, 0, 0, 8], &[0, 0, 0, 8], &[0, 0, 0, 0]]));
}

#[test]
fn test_up_and_down_work_on_columns() {
    let board = b(&[&[2, 0, 0], &[2, 4, 0], &[4, 4, 0]]);

    let up = move_up(&board);
    assert_eq!(up.board, b(&[&[4, 8, 0], &[4, 0, 0], &[0, 0, 0]]));
    assert_eq!(up.score, 12);

    let down = move_down(&board);
    assert_eq!(down.board, b(&[&[0, 0, 0], &[4, 0, 0], &[4, 8, 0]]));
    assert_eq!(down.score, 12);
}

#[test]
fn test_apply_move_dispatches_by_direction() {
    let board = b(&[&[0, 2], &[2, 0]]);
    assert_eq!(apply_move(&board, Direction::Left), move_left(&board));
    assert_eq!(apply_move(&board, Direction::Right), move_right(&board));
    assert_eq!(apply_move(&board, Direction::Up), move_up(&board));
    assert_eq!(apply_move(&board, Direction::Down), move_down(&board));
}

#[test]
fn test_blocked_move_reports_not_moved() {
    let board = b(&[&[2, 4], &[0, 0]]);
    let result = move_left(&board);
    assert!(!result.moved);
    assert_eq!(result.score, 0);
    assert_eq!(result.board, board);
}

#[test]
fn test_stuck_board_no_direction_moves() {
    let board = b(&[&[2, 4, 2, 4], &[4, 2, 4, 2], &[2, 4, 2, 4], &[4, 2, 4, 2]]);
    assert!(!board.can_move());
    for dir in Direction::ALL {
        assert!(!apply_move(&board, dir).moved, "{:?} moved a stuck board", dir);
    }
}

#[test]
fn test_single_cell_board() {
    let board = b(&[&[2]]);
    assert!(!board.can_move());
    for dir in Direction::ALL {
        assert!(!apply_move(&board, dir).moved);
    }
}

#[test]
fn test_spawn_fills_chosen_empty_cell() {
    let board = b(&[&[2, 0], &[0, 0]]);
    let mut tiles = ScriptedTiles::new([(1, 4)]);
    let next = spawn_random_tile(&board, &mut tiles);
    assert_eq!(next, b(&[&[2, 0], &[4, 0]]));
    // The input board is untouched.
    assert_eq!(board.tile_count(), 1);
}

#[test]
fn test_spawn_on_full_board_is_noop() {
    let board = b(&[&[2, 4], &[8, 16]]);
    let mut tiles = ScriptedTiles::new([(0, 2)]);
    assert_eq!(spawn_random_tile(&board, &mut tiles), board);
    assert_eq!(tiles.remaining(), 1, "full board must not consume a spawn");
}
