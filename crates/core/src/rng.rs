//! Tile spawning - the only source of randomness in the game
//!
//! A spawn makes two choices: which empty cell, then which value. Both go
//! through the [`TileSource`] trait so tests can script them exactly.
//!
//! - [`RandomTiles`]: uniform cell choice, 2 with probability 0.9 and 4 with 0.1
//! - [`ScriptedTiles`]: replays a fixed list of `(cell_choice, value)` pairs

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::Board;
use crate::types::SPAWN_FOUR_IN_TEN;

/// Supplies the random choices made when a tile spawns.
pub trait TileSource {
    /// Pick an index in `0..empty`. Only called with `empty > 0`.
    fn pick_cell(&mut self, empty: usize) -> usize;

    /// Pick the value of the new tile (2 or 4).
    fn pick_value(&mut self) -> u32;
}

impl<T: TileSource + ?Sized> TileSource for &mut T {
    fn pick_cell(&mut self, empty: usize) -> usize {
        (**self).pick_cell(empty)
    }

    fn pick_value(&mut self) -> u32 {
        (**self).pick_value()
    }
}

/// Uniform tile source backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomTiles<R = SmallRng> {
    rng: R,
}

impl<R: Rng> RandomTiles<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomTiles<SmallRng> {
    /// Deterministic source: the same seed spawns the same tiles.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Production source seeded from the OS.
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

impl<R: Rng> TileSource for RandomTiles<R> {
    fn pick_cell(&mut self, empty: usize) -> usize {
        self.rng.gen_range(0..empty)
    }

    fn pick_value(&mut self) -> u32 {
        if self.rng.gen_range(0..10) < SPAWN_FOUR_IN_TEN {
            4
        } else {
            2
        }
    }
}

/// Scripted tile source for tests.
///
/// Each spawn consumes one `(cell_choice, value)` pair. `cell_choice` indexes
/// the empty cells in row-major order and wraps modulo their count. Once the
/// script runs out every spawn is `(0, 2)`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTiles {
    script: VecDeque<(usize, u32)>,
    pending_value: Option<u32>,
}

impl ScriptedTiles {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = (usize, u32)>,
    {
        Self {
            script: script.into_iter().collect(),
            pending_value: None,
        }
    }

    /// Spawns left before the script is exhausted.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl TileSource for ScriptedTiles {
    fn pick_cell(&mut self, empty: usize) -> usize {
        let (cell, value) = self.script.pop_front().unwrap_or((0, 2));
        self.pending_value = Some(value);
        cell % empty
    }

    fn pick_value(&mut self) -> u32 {
        self.pending_value.take().unwrap_or(2)
    }
}

/// Place one new tile on a random empty cell.
///
/// Returns the board unchanged when it has no empty cell.
pub fn spawn_random_tile<S: TileSource + ?Sized>(board: &Board, source: &mut S) -> Board {
    let empty = board.empty_count();
    if empty == 0 {
        return board.clone();
    }

    let pick = source.pick_cell(empty);
    let value = source.pick_value();

    let mut next = board.clone();
    if let Some((row, col)) = board.empty_cells().nth(pick) {
        next.set(row, col, Some(value));
    }
    next
}
