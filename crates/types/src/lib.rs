//! Shared types - plain data structures and constants
//!
//! Everything here is dependency-free so it can be used by the engine, the
//! terminal front-end and the control adapter alike.
//!
//! # Board Dimensions
//!
//! The board is always square. Sessions accept sizes in
//! `MIN_BOARD_SIZE..=MAX_BOARD_SIZE`; the board operations themselves work for
//! any size of at least 1.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_BOARD_SIZE` | 2 | Smallest playable board |
//! | `MAX_BOARD_SIZE` | 10 | Largest playable board |
//! | `DEFAULT_BOARD_SIZE` | 4 | Classic 4x4 board |
//! | `WIN_TILE` | 2048 | Tile value that wins the game |
//! | `INITIAL_TILES` | 2 | Tiles spawned onto a fresh board |
//!
//! # Examples
//!
//! ```
//! use tui_2048_types::{Direction, GameAction, DEFAULT_BOARD_SIZE, WIN_TILE};
//!
//! let dir = Direction::from_str("left").unwrap();
//! assert_eq!(dir, Direction::Left);
//!
//! let action = GameAction::from_str("moveUp").unwrap();
//! assert_eq!(action.direction(), Some(Direction::Up));
//!
//! assert_eq!(DEFAULT_BOARD_SIZE, 4);
//! assert_eq!(WIN_TILE, 2048);
//! ```

/// Smallest board size a session accepts
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest board size a session accepts
pub const MAX_BOARD_SIZE: usize = 10;

/// Board size used when none is requested
pub const DEFAULT_BOARD_SIZE: usize = 4;

/// Reaching this tile value wins the game
pub const WIN_TILE: u32 = 2048;

/// Number of tiles spawned onto a fresh board
pub const INITIAL_TILES: usize = 2;

/// Out of ten spawns, how many produce a 4 instead of a 2
pub const SPAWN_FOUR_IN_TEN: u32 = 1;

/// Minimum drag distance (in terminal cells) before a mouse drag counts as a swipe
pub const DEFAULT_SWIPE_THRESHOLD: i32 = 2;

/// Input poll interval of the game loop in milliseconds
pub const TICK_MS: u32 = 16;

/// A cell on the board
///
/// - `None`: empty cell
/// - `Some(v)`: tile holding `v`, a power of two >= 2
pub type Tile = Option<u32>;

/// The four slide directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Parse a direction (case-insensitive).
    ///
    /// Accepts the bare name as well as the `move*` action spelling.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::Direction;
    ///
    /// assert_eq!(Direction::from_str("UP"), Some(Direction::Up));
    /// assert_eq!(Direction::from_str("moveRight"), Some(Direction::Right));
    /// assert_eq!(Direction::from_str("sideways"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "moveup" => Some(Direction::Up),
            "down" | "movedown" => Some(Direction::Down),
            "left" | "moveleft" => Some(Direction::Left),
            "right" | "moveright" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Actions that change the game session
///
/// Produced by keyboard input, mouse swipes and the control adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Slide all tiles up
    MoveUp,
    /// Slide all tiles down
    MoveDown,
    /// Slide all tiles left
    MoveLeft,
    /// Slide all tiles right
    MoveRight,
    /// Start a new game on a board of the current size
    Restart,
    /// Start a new game on a board one larger
    GrowBoard,
    /// Start a new game on a board one smaller
    ShrinkBoard,
    /// Start a new game on a board of the given size
    Resize(usize),
}

impl GameAction {
    /// Parse a size-less action from a string (for the control protocol)
    ///
    /// `Resize` carries a payload and is never produced here.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("left"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("moveDown"), Some(GameAction::MoveDown));
    /// assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("resize"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        if let Some(dir) = Direction::from_str(s) {
            return Some(Self::from_direction(dir));
        }
        match s.to_lowercase().as_str() {
            "restart" => Some(GameAction::Restart),
            "grow" | "growboard" => Some(GameAction::GrowBoard),
            "shrink" | "shrinkboard" => Some(GameAction::ShrinkBoard),
            _ => None,
        }
    }

    /// camelCase name used by the control protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveUp => "moveUp",
            GameAction::MoveDown => "moveDown",
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::Restart => "restart",
            GameAction::GrowBoard => "growBoard",
            GameAction::ShrinkBoard => "shrinkBoard",
            GameAction::Resize(_) => "resize",
        }
    }

    /// The slide direction, if this is a move.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            GameAction::MoveUp => Some(Direction::Up),
            GameAction::MoveDown => Some(Direction::Down),
            GameAction::MoveLeft => Some(Direction::Left),
            GameAction::MoveRight => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn from_direction(dir: Direction) -> Self {
        match dir {
            Direction::Up => GameAction::MoveUp,
            Direction::Down => GameAction::MoveDown,
            Direction::Left => GameAction::MoveLeft,
            Direction::Right => GameAction::MoveRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_size_bounds() {
        assert_eq!(MIN_BOARD_SIZE, 2);
        assert_eq!(MAX_BOARD_SIZE, 10);
        assert!((MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&DEFAULT_BOARD_SIZE));
    }

    #[test]
    fn direction_roundtrips_through_action() {
        for dir in Direction::ALL {
            let action = GameAction::from_direction(dir);
            assert_eq!(action.direction(), Some(dir));
            assert_eq!(GameAction::from_str(action.as_str()), Some(action));
            assert_eq!(Direction::from_str(dir.as_str()), Some(dir));
        }
    }

    #[test]
    fn non_move_actions_have_no_direction() {
        assert_eq!(GameAction::Restart.direction(), None);
        assert_eq!(GameAction::GrowBoard.direction(), None);
        assert_eq!(GameAction::Resize(6).direction(), None);
    }
}
