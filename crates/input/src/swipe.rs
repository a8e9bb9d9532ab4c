//! Mouse drag gestures.
//!
//! A press followed by a release further than the threshold away is a swipe.
//! The dominant axis picks the direction; ties go to the vertical axis.
//! Terminal coordinates grow rightwards and downwards, so a positive `dy`
//! is a swipe down.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::{Direction, GameAction, DEFAULT_SWIPE_THRESHOLD};

/// Classify a drag by its displacement.
///
/// Returns `None` unless the larger of `|dx|` and `|dy|` exceeds `threshold`.
pub fn classify_swipe(dx: i32, dy: i32, threshold: i32) -> Option<Direction> {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax.max(ay) <= threshold {
        return None;
    }

    if ax > ay {
        Some(if dx > 0 { Direction::Right } else { Direction::Left })
    } else {
        Some(if dy > 0 { Direction::Down } else { Direction::Up })
    }
}

/// Tracks a left-button drag across mouse events.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: i32,
    start: Option<(u16, u16)>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl SwipeTracker {
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }

    /// Remember where the drag started.
    pub fn press(&mut self, column: u16, row: u16) {
        self.start = Some((column, row));
    }

    /// Finish the drag. Returns the swipe direction, if any.
    pub fn release(&mut self, column: u16, row: u16) -> Option<Direction> {
        let (c0, r0) = self.start.take()?;
        let dx = column as i32 - c0 as i32;
        let dy = row as i32 - r0 as i32;
        classify_swipe(dx, dy, self.threshold)
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }

    /// Feed a raw mouse event; returns a move once a swipe completes.
    pub fn handle_mouse_event(&mut self, event: MouseEvent) -> Option<GameAction> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.press(event.column, event.row);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => self
                .release(event.column, event.row)
                .map(GameAction::from_direction),
            MouseEventKind::Down(_) => {
                self.cancel();
                None
            }
            _ => None,
        }
    }
}
