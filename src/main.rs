//! Terminal 2048 runner (default binary).
//!
//! Keyboard and mouse swipes drive the local session. Unless disabled, the
//! control adapter lets an external client play the same session over TCP.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use env_logger::{Env, Target};
use log::{info, warn};

use tui_2048::adapter::{Adapter, StatusSnapshot};
use tui_2048::core::{GameError, GameSession};
use tui_2048::input::{handle_key_event, should_quit, SwipeTracker};
use tui_2048::term::{AdapterStatusView, FrameBuffer, GameView, TerminalRenderer, ViewStatus, Viewport};
use tui_2048::types::{DEFAULT_BOARD_SIZE, TICK_MS};

const SIZE_MESSAGE: &str = "Board size must be between 2 and 10.";

#[derive(Parser, Debug)]
#[command(name = "tui-2048")]
#[command(author, version, about = "Play 2048 in the terminal")]
struct Args {
    /// Board size (2 to 10)
    #[arg(short, long, env = "G2048_SIZE", default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Seed for tile spawns (random when omitted)
    #[arg(long, env = "G2048_SEED")]
    seed: Option<u64>,

    /// Do not start the TCP control adapter
    #[arg(long, env = "G2048_AI_DISABLED")]
    no_adapter: bool,

    /// Leave the mouse alone (no swipes, terminal text selection still works)
    #[arg(long, env = "G2048_NO_MOUSE")]
    no_mouse: bool,

    /// Write logs to this file (no logging otherwise)
    #[arg(long, env = "G2048_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let session = match args.seed {
        Some(seed) => GameSession::seeded(args.size, seed)?,
        None => GameSession::from_entropy(args.size)?,
    };
    info!("starting {}x{} game", session.size(), session.size());

    let adapter = if args.no_adapter {
        None
    } else {
        match Adapter::start_from_env() {
            Ok(adapter) => Some(adapter),
            Err(e) => {
                warn!("adapter disabled: {:#}", e);
                None
            }
        }
    };

    let mut term = TerminalRenderer::new();
    if args.no_mouse {
        term = term.without_mouse();
    }
    term.enter()?;

    let result = run(&mut term, session, adapter);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Logs go to a file; the terminal belongs to the game.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn adapter_view(status: StatusSnapshot) -> AdapterStatusView {
    AdapterStatusView {
        client_count: status.client_count,
        controller_id: status.controller_id,
        streaming_count: status.streaming_count,
    }
}

fn run(term: &mut TerminalRenderer, mut session: GameSession, mut adapter: Option<Adapter>) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = session.snapshot();
    let mut swipes = SwipeTracker::default();
    let mut message: Option<&'static str> = None;
    let tick = Duration::from_millis(TICK_MS as u64);

    loop {
        if let Some(adapter) = adapter.as_mut() {
            adapter.pump(&mut session);
        }

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        session.snapshot_into(&mut snap);
        let status = ViewStatus {
            message,
            adapter: adapter.as_ref().map(|a| adapter_view(a.status())),
        };
        view.render_into(&snap, &status, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        if !event::poll(tick)? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) => {
                if should_quit(key) {
                    return Ok(());
                }
                handle_key_event(key)
            }
            Event::Mouse(mouse) => swipes.handle_mouse_event(mouse),
            Event::Resize(_, _) => {
                term.invalidate();
                None
            }
            _ => None,
        };

        let Some(action) = action else {
            continue;
        };
        match session.apply_action(action) {
            Ok(changed) => {
                message = None;
                if changed {
                    if let Some(adapter) = adapter.as_mut() {
                        session.snapshot_into(&mut snap);
                        adapter.broadcast(&snap);
                    }
                }
            }
            Err(GameError::InvalidSize { .. }) => message = Some(SIZE_MESSAGE),
            Err(e) => warn!("{} rejected: {}", action.as_str(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_mouse_flag_parses() {
        let args = Args::try_parse_from(["tui-2048", "--no-mouse", "--size", "5"]).unwrap();
        assert!(args.no_mouse);
        assert_eq!(args.size, 5);

        let args = Args::try_parse_from(["tui-2048"]).unwrap();
        assert!(!args.no_mouse);
    }
}
