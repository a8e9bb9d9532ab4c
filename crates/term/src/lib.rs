//! Terminal rendering for the 2048 board.
//!
//! A small, game-oriented rendering layer: the view draws into a plain
//! framebuffer and the renderer flushes only what changed since the last
//! frame. No widget toolkit is involved.
//!
//! - [`fb`]: styled cell framebuffer
//! - [`game_view`]: board, side panel, status line and overlays (pure)
//! - [`renderer`]: raw mode, alternate screen, mouse capture, diff flushing

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{tile_colors, tile_label, AdapterStatusView, AnchorY, GameView, ViewStatus, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
