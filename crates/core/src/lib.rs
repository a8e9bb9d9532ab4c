//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the 2048 rules and the game session around them. It has
//! no dependency on the terminal or the network, so it can run headless for
//! tests, benchmarks and the AI adapter alike.
//!
//! # Module Structure
//!
//! - [`board`]: N x N tile grid with row-major storage
//! - [`engine`]: slide/merge in four directions, derived from one row primitive
//! - [`rng`]: tile spawning behind the [`TileSource`] trait
//! - [`game_state`]: score, best score, win and game-over tracking
//! - [`snapshot`]: read-only view handed to renderers and the adapter
//! - [`error`]: errors for invalid sizes and malformed boards
//!
//! # Game Rules
//!
//! - Tiles slide as far as they can in the chosen direction
//! - Two equal tiles that meet merge into one of double value, at most once per move
//! - When several merges are possible, the pair nearest the destination edge wins
//! - The score grows by the value of every merged tile
//! - After a move that changed the board, one tile (2 with p=0.9, 4 with p=0.1)
//!   spawns on a uniformly chosen empty cell
//! - Reaching 2048 wins; the game goes on until no move is possible
//!
//! # Example
//!
//! ```
//! use tui_2048_core::{GameSession, ScriptedTiles};
//! use tui_2048_types::Direction;
//!
//! // Spawns land on the first empty cell with value 2.
//! let mut game = GameSession::new(4, ScriptedTiles::default()).unwrap();
//! assert_eq!(game.board().tile_count(), 2);
//!
//! // The two tiles sit side by side in the top row and merge.
//! assert!(game.apply_move(Direction::Left));
//! assert_eq!(game.score(), 4);
//! ```

pub mod board;
pub mod engine;
pub mod error;
pub mod game_state;
pub mod rng;
pub mod snapshot;

pub use tui_2048_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use engine::{apply_move, move_down, move_left, move_right, move_up, MoveResult};
pub use error::GameError;
pub use game_state::GameSession;
pub use rng::{spawn_random_tile, RandomTiles, ScriptedTiles, TileSource};
pub use snapshot::GameSnapshot;
