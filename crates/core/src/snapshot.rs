use crate::types::{Tile, DEFAULT_BOARD_SIZE};

/// Read-only view of a session, handed to renderers and the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub size: usize,
    pub board: Vec<Vec<Tile>>,
    pub score: u64,
    pub best_score: u64,
    pub game_over: bool,
    pub game_won: bool,
    pub episode_id: u32,
    pub moves: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.size = DEFAULT_BOARD_SIZE;
        self.board.clear();
        self.board
            .resize_with(DEFAULT_BOARD_SIZE, || vec![None; DEFAULT_BOARD_SIZE]);
        self.score = 0;
        self.best_score = 0;
        self.game_over = false;
        self.game_won = false;
        self.episode_id = 0;
        self.moves = 0;
    }

    pub fn playable(&self) -> bool {
        !self.game_over
    }

    pub fn max_tile(&self) -> Option<u32> {
        self.board.iter().flatten().flatten().copied().max()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            size: DEFAULT_BOARD_SIZE,
            board: Vec::new(),
            score: 0,
            best_score: 0,
            game_over: false,
            game_won: false,
            episode_id: 0,
            moves: 0,
        };
        s.clear();
        s
    }
}
