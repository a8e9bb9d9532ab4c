//! Board tests - construction, accessors and the can-move oracle

use tui_2048::core::{Board, GameError};

fn b(rows: &[&[u32]]) -> Board {
    Board::from_rows(
        rows.iter()
            .map(|r| r.iter().map(|&v| if v == 0 { None } else { Some(v) }).collect())
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_board_new_empty() {
    for size in [2, 4, 10] {
        let board = Board::new(size).unwrap();
        assert_eq!(board.size(), size);
        assert_eq!(board.empty_count(), size * size);
        assert_eq!(board.tile_count(), 0);
        assert_eq!(board.max_tile(), None);
    }
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = Board::new(4).unwrap();
    assert_eq!(board.get(0, 0), Some(None));
    assert_eq!(board.get(4, 0), None);
    assert_eq!(board.get(0, 4), None);
}

#[test]
fn test_board_set_and_get() {
    let mut board = Board::new(3).unwrap();
    assert!(board.set(2, 1, Some(8)));
    assert_eq!(board.get(2, 1), Some(Some(8)));
    assert_eq!(board.row(2), Some(&[None, Some(8), None][..]));

    assert!(!board.set(3, 0, Some(2)));
    assert!(board.set(2, 1, None));
    assert_eq!(board.empty_count(), 9);
}

#[test]
fn test_from_rows_validates_shape() {
    assert_eq!(Board::from_rows(vec![]), Err(GameError::EmptyBoard));
    assert_eq!(
        Board::from_rows(vec![vec![None, None], vec![None, None, None]]),
        Err(GameError::RaggedBoard { row: 1, len: 3, size: 2 })
    );
}

#[test]
fn test_empty_cells_are_row_major() {
    let board = b(&[&[2, 0], &[0, 4]]);
    let empty: Vec<_> = board.empty_cells().collect();
    assert_eq!(empty, vec![(0, 1), (1, 0)]);
}

#[test]
fn test_aggregates() {
    let board = b(&[&[2, 4, 0], &[0, 2048, 0], &[8, 0, 0]]);
    assert_eq!(board.tile_count(), 4);
    assert_eq!(board.tile_sum(), 2062);
    assert_eq!(board.max_tile(), Some(2048));
    assert!(board.contains(2048));
    assert!(!board.contains(16));
}

#[test]
fn test_can_move_with_empty_cell() {
    assert!(b(&[&[2, 4], &[8, 0]]).can_move());
}

#[test]
fn test_can_move_with_horizontal_pair() {
    assert!(b(&[&[2, 2], &[4, 8]]).can_move());
}

#[test]
fn test_can_move_with_vertical_pair() {
    assert!(b(&[&[2, 4], &[2, 8]]).can_move());
}

#[test]
fn test_full_board_without_pairs_is_stuck() {
    let board = b(&[&[2, 4, 2], &[4, 2, 4], &[2, 4, 2]]);
    assert!(!board.can_move());
}

#[test]
fn test_reverse_and_transpose_are_involutions() {
    let board = b(&[&[2, 4, 0], &[0, 8, 16], &[32, 0, 64]]);
    assert_eq!(board.reverse_rows().reverse_rows(), board);
    assert_eq!(board.transpose().transpose(), board);
    assert_eq!(board.reverse_rows().row(0), Some(&[None, Some(4), Some(2)][..]));
}
