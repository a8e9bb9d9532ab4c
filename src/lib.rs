//! TUI 2048 (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so tests, benches and the
//! binary can write `tui_2048::{core, input, term, adapter, types}`.

pub use tui_2048_adapter as adapter;
pub use tui_2048_core as core;
pub use tui_2048_input as input;
pub use tui_2048_term as term;
pub use tui_2048_types as types;
