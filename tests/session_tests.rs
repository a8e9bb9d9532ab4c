//! Session tests - scoring, flags, restart and resize with scripted spawns

use tui_2048::core::{Board, GameError, GameSession, GameSnapshot, ScriptedTiles};
use tui_2048::types::{Direction, GameAction};

fn b(rows: &[&[u32]]) -> Board {
    Board::from_rows(
        rows.iter()
            .map(|r| r.iter().map(|&v| if v == 0 { None } else { Some(v) }).collect())
            .collect(),
    )
    .unwrap()
}

fn session(rows: &[&[u32]], script: &[(usize, u32)]) -> GameSession<ScriptedTiles> {
    GameSession::with_board(b(rows), ScriptedTiles::new(script.iter().copied())).unwrap()
}

#[test]
fn test_new_session_deals_two_tiles() {
    let s = GameSession::new(4, ScriptedTiles::new([(5, 2), (0, 4)])).unwrap();
    assert_eq!(s.board().tile_count(), 2);
    assert_eq!(s.board().get(1, 1), Some(Some(2)));
    assert_eq!(s.board().get(0, 0), Some(Some(4)));
    assert_eq!(s.score(), 0);
    assert_eq!(s.moves(), 0);
}

#[test]
fn test_move_scores_and_spawns() {
    let mut s = session(&[&[2, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]], &[(0, 2)]);

    assert!(s.apply_move(Direction::Left));
    assert_eq!(
        *s.board(),
        b(&[&[4, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]])
    );
    assert_eq!(s.score(), 4);
    assert_eq!(s.best_score(), 4);
    assert_eq!(s.moves(), 1);
}

#[test]
fn test_blocked_move_changes_nothing() {
    let mut s = session(&[&[2, 4], &[0, 0]], &[(0, 4)]);

    assert!(!s.apply_move(Direction::Left));
    assert_eq!(*s.board(), b(&[&[2, 4], &[0, 0]]));
    assert_eq!(s.moves(), 0);
    assert_eq!(s.tiles_mut().remaining(), 1, "no tile spawns without a move");
}

#[test]
fn test_reaching_2048_sets_sticky_win() {
    let mut s = session(&[&[1024, 1024, 0], &[0, 0, 0], &[0, 0, 0]], &[]);

    assert!(s.apply_move(Direction::Left));
    assert!(s.game_won());
    assert_eq!(s.score(), 2048);

    // Moving the 2048 tile keeps the win.
    assert!(s.apply_move(Direction::Down));
    assert!(s.game_won());
    assert!(s.snapshot().game_won);
}

#[test]
fn test_game_over_after_last_move() {
    let mut s = session(&[&[2, 4], &[0, 8]], &[(0, 2)]);

    assert!(s.apply_move(Direction::Left));
    assert_eq!(*s.board(), b(&[&[2, 4], &[8, 2]]));
    assert!(s.game_over());
    assert!(!s.snapshot().playable());

    // Every move is a no-op once the game is over.
    for dir in Direction::ALL {
        assert!(!s.apply_move(dir));
    }
    assert_eq!(s.moves(), 1);
}

#[test]
fn test_with_board_derives_flags() {
    let stuck = session(&[&[2, 4], &[4, 2]], &[]);
    assert!(stuck.game_over());
    assert!(!stuck.game_won());

    let won = session(&[&[2048, 0], &[0, 0]], &[]);
    assert!(won.game_won());
    assert!(!won.game_over());

    assert_eq!(
        GameSession::with_board(b(&[&[2]]), ScriptedTiles::default()).unwrap_err(),
        GameError::InvalidSize { size: 1 }
    );
}

#[test]
fn test_restart_keeps_best_score() {
    let mut s = session(&[&[1024, 1024, 0], &[0, 0, 0], &[0, 0, 0]], &[]);
    s.apply_move(Direction::Left);
    assert_eq!(s.best_score(), 2048);

    s.restart();
    assert_eq!(s.score(), 0);
    assert_eq!(s.best_score(), 2048);
    assert_eq!(s.moves(), 0);
    assert_eq!(s.episode_id(), 1);
    assert!(!s.game_won());
    assert!(!s.game_over());
    assert_eq!(s.size(), 3);
    assert_eq!(s.board().tile_count(), 2);
}

#[test]
fn test_resize_starts_new_episode() {
    let mut s = session(&[&[2, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]], &[]);
    s.apply_move(Direction::Left);

    s.resize(6).unwrap();
    assert_eq!(s.size(), 6);
    assert_eq!(s.board().tile_count(), 2);
    assert_eq!(s.score(), 0);
    assert_eq!(s.best_score(), 4);
    assert_eq!(s.episode_id(), 1);
}

#[test]
fn test_invalid_resize_leaves_session_untouched() {
    let mut s = session(&[&[2, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]], &[]);
    s.apply_move(Direction::Left);
    let before = s.snapshot();

    for size in [0, 1, 11, 100] {
        assert_eq!(s.resize(size), Err(GameError::InvalidSize { size }));
    }
    assert_eq!(s.snapshot(), before);
}

#[test]
fn test_grow_and_shrink_actions() {
    let mut s = GameSession::new(9, ScriptedTiles::default()).unwrap();

    assert_eq!(s.apply_action(GameAction::GrowBoard), Ok(true));
    assert_eq!(s.size(), 10);
    assert_eq!(
        s.apply_action(GameAction::GrowBoard),
        Err(GameError::InvalidSize { size: 11 })
    );
    assert_eq!(s.size(), 10);

    assert_eq!(s.apply_action(GameAction::ShrinkBoard), Ok(true));
    assert_eq!(s.size(), 9);
    assert_eq!(s.apply_action(GameAction::Resize(2)), Ok(true));
    assert_eq!(s.size(), 2);
    assert_eq!(s.episode_id(), 3);
}

#[test]
fn test_snapshot_into_reuses_buffer() {
    let mut s = GameSession::new(5, ScriptedTiles::default()).unwrap();
    let mut snap = GameSnapshot::default();
    s.snapshot_into(&mut snap);
    assert_eq!(snap.size, 5);
    assert_eq!(snap.board.len(), 5);

    s.resize(3).unwrap();
    s.snapshot_into(&mut snap);
    assert_eq!(snap.board.len(), 3);
    assert!(snap.board.iter().all(|r| r.len() == 3));
    assert_eq!(snap.max_tile(), Some(2));
    assert_eq!(snap.episode_id, 1);
}

#[test]
fn test_seeded_sessions_replay_identically() {
    let mut a = GameSession::seeded(4, 7).unwrap();
    let mut b = GameSession::seeded(4, 7).unwrap();
    for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down].repeat(10) {
        assert_eq!(a.apply_move(dir), b.apply_move(dir));
    }
    assert_eq!(a.snapshot(), b.snapshot());
}
