//! Game session - score, best score and win/loss flags around the engine
//!
//! The session owns the current board and the tile source. Each user action
//! runs to completion before the next one; the session never suspends and is
//! not shared between threads.
//!
//! Lifecycle:
//! - created with two spawned tiles on an empty board
//! - mutated by [`GameSession::apply_move`]
//! - replaced wholesale by [`GameSession::restart`] / [`GameSession::resize`],
//!   except for the best score, which lives as long as the session object

use log::{debug, info};

use crate::board::Board;
use crate::engine;
use crate::error::GameError;
use crate::rng::{spawn_random_tile, RandomTiles, TileSource};
use crate::snapshot::GameSnapshot;
use crate::types::*;

fn validate_size(size: usize) -> Result<(), GameError> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(GameError::InvalidSize { size })
    }
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct GameSession<S = RandomTiles> {
    board: Board,
    score: u64,
    /// Never reset by restart or resize.
    best_score: u64,
    game_over: bool,
    /// Sticky: once set it stays set until the next restart/resize.
    game_won: bool,
    /// Increments on every restart/resize.
    episode_id: u32,
    /// Moves that changed the board in the current episode.
    moves: u32,
    tiles: S,
}

impl GameSession<RandomTiles> {
    /// Session with a reproducible tile sequence
    pub fn seeded(size: usize, seed: u64) -> Result<Self, GameError> {
        Self::new(size, RandomTiles::seeded(seed))
    }

    /// Session seeded from the OS
    pub fn from_entropy(size: usize) -> Result<Self, GameError> {
        Self::new(size, RandomTiles::from_entropy())
    }
}

impl<S: TileSource> GameSession<S> {
    /// Start a new session on a `size` x `size` board with two random tiles.
    ///
    /// Fails with [`GameError::InvalidSize`] unless
    /// `MIN_BOARD_SIZE <= size <= MAX_BOARD_SIZE`.
    pub fn new(size: usize, tiles: S) -> Result<Self, GameError> {
        validate_size(size)?;

        let mut session = Self {
            board: Board::new(size)?,
            score: 0,
            best_score: 0,
            game_over: false,
            game_won: false,
            episode_id: 0,
            moves: 0,
            tiles,
        };
        session.deal(size);
        Ok(session)
    }

    /// Resume from a known position instead of a fresh deal.
    ///
    /// Flags are derived from the board; score starts at 0.
    pub fn with_board(board: Board, tiles: S) -> Result<Self, GameError> {
        validate_size(board.size())?;

        Ok(Self {
            game_over: !board.can_move(),
            game_won: board.contains(WIN_TILE),
            board,
            score: 0,
            best_score: 0,
            episode_id: 0,
            moves: 0,
            tiles,
        })
    }

    /// Replace the board with a fresh deal and reset per-episode state.
    ///
    /// `size` must already be validated.
    fn deal(&mut self, size: usize) {
        let mut board = Board::from_row_iter(size, (0..size).map(|_| vec![None; size]));
        for _ in 0..INITIAL_TILES {
            board = spawn_random_tile(&board, &mut self.tiles);
        }

        self.board = board;
        self.score = 0;
        self.moves = 0;
        self.game_over = false;
        self.game_won = false;
    }

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn game_won(&self) -> bool {
        self.game_won
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn tiles_mut(&mut self) -> &mut S {
        &mut self.tiles
    }

    /// Slide the board and, if anything moved, spawn a tile and update
    /// score and flags.
    ///
    /// Returns whether the board changed. Once the game is over every move is
    /// a no-op.
    pub fn apply_move(&mut self, direction: Direction) -> bool {
        if self.game_over {
            return false;
        }

        let result = engine::apply_move(&self.board, direction);
        if !result.moved {
            return false;
        }

        self.board = spawn_random_tile(&result.board, &mut self.tiles);
        self.score = self.score.saturating_add(result.score);
        self.moves = self.moves.wrapping_add(1);

        if !self.game_won && self.board.contains(WIN_TILE) {
            self.game_won = true;
            info!(
                "reached {} after {} moves (score {})",
                WIN_TILE, self.moves, self.score
            );
        }

        self.game_over = !self.board.can_move();
        if self.game_over {
            info!(
                "game over on {}x{} board: score {}, max tile {}",
                self.size(),
                self.size(),
                self.score,
                self.board.max_tile().unwrap_or(0)
            );
        }

        // Score only changes on a real move, so this is the only place the
        // best score can rise.
        if self.score > self.best_score {
            self.best_score = self.score;
        }

        true
    }

    /// Start over on a board of the current size. Keeps the best score.
    pub fn restart(&mut self) {
        let size = self.size();
        self.deal(size);
        self.episode_id = self.episode_id.wrapping_add(1);
        debug!("restart: episode {} on {}x{}", self.episode_id, size, size);
    }

    /// Start over on a board of `size`. Keeps the best score.
    ///
    /// An invalid size leaves the session untouched.
    pub fn resize(&mut self, size: usize) -> Result<(), GameError> {
        validate_size(size)?;
        self.deal(size);
        self.episode_id = self.episode_id.wrapping_add(1);
        debug!("resize: episode {} on {}x{}", self.episode_id, size, size);
        Ok(())
    }

    /// Apply a game action.
    ///
    /// Returns whether the session changed; resize actions with an
    /// out-of-range size fail with [`GameError::InvalidSize`].
    pub fn apply_action(&mut self, action: GameAction) -> Result<bool, GameError> {
        match action {
            GameAction::MoveUp => Ok(self.apply_move(Direction::Up)),
            GameAction::MoveDown => Ok(self.apply_move(Direction::Down)),
            GameAction::MoveLeft => Ok(self.apply_move(Direction::Left)),
            GameAction::MoveRight => Ok(self.apply_move(Direction::Right)),
            GameAction::Restart => {
                self.restart();
                Ok(true)
            }
            GameAction::GrowBoard => self.resize(self.size() + 1).map(|_| true),
            GameAction::ShrinkBoard => self.resize(self.size().saturating_sub(1)).map(|_| true),
            GameAction::Resize(size) => self.resize(size).map(|_| true),
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_rows_into(&mut out.board);
        out.size = self.size();
        out.score = self.score;
        out.best_score = self.best_score;
        out.game_over = self.game_over;
        out.game_won = self.game_won;
        out.episode_id = self.episode_id;
        out.moves = self.moves;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedTiles;

    #[test]
    fn test_new_session() {
        let session = GameSession::seeded(4, 12345).unwrap();

        assert_eq!(session.size(), 4);
        assert_eq!(session.board.tile_count(), INITIAL_TILES);
        assert_eq!(session.score, 0);
        assert_eq!(session.best_score, 0);
        assert!(!session.game_over);
        assert!(!session.game_won);
        assert_eq!(session.episode_id, 0);
    }

    #[test]
    fn test_size_validation() {
        assert_eq!(
            GameSession::seeded(1, 1).unwrap_err(),
            GameError::InvalidSize { size: 1 }
        );
        assert_eq!(
            GameSession::seeded(11, 1).unwrap_err(),
            GameError::InvalidSize { size: 11 }
        );
        assert!(GameSession::seeded(2, 1).is_ok());
        assert!(GameSession::seeded(10, 1).is_ok());
    }

    #[test]
    fn test_restart_increments_episode_id() {
        let mut session = GameSession::new(4, ScriptedTiles::default()).unwrap();
        assert_eq!(session.episode_id, 0);
        assert!(session.apply_action(GameAction::Restart).unwrap());
        assert_eq!(session.episode_id, 1);
    }

    #[test]
    fn test_restart_after_game_over_deals_fresh_board() {
        let stuck = Board::from_rows(vec![vec![Some(2), Some(4)], vec![Some(4), Some(2)]]).unwrap();
        let mut session = GameSession::with_board(stuck, ScriptedTiles::new([(0, 2), (0, 4)])).unwrap();
        assert!(session.game_over);

        session.restart();

        assert_eq!(session.episode_id, 1);
        assert!(!session.game_over);
        assert_eq!(session.size(), 2);
        assert_eq!(
            session.board.to_rows(),
            vec![vec![Some(2), Some(4)], vec![None, None]]
        );
        assert!(session.apply_move(Direction::Down));
    }

    #[test]
    fn test_shrink_below_minimum_rejected() {
        let mut session = GameSession::seeded(2, 3).unwrap();
        let before = session.board.clone();
        assert_eq!(
            session.apply_action(GameAction::ShrinkBoard),
            Err(GameError::InvalidSize { size: 1 })
        );
        assert_eq!(session.board, before);
        assert_eq!(session.episode_id, 0);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let session = GameSession::seeded(5, 42).unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.size, 5);
        assert_eq!(snap.board, session.board.to_rows());
        assert!(snap.playable());
    }
}
