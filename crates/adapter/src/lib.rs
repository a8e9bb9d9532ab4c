//! Adapter module - external control of the game over TCP
//!
//! Lets an AI agent (or any script) drive the 2048 session through a
//! line-delimited JSON protocol, while observers watch the same game.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, the game answers with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observations**: Clients that asked for streaming get the full state
//!    after every change
//! 5. **Commanding**: Only the controller may send `command`
//!
//! Every client numbers its messages with a strictly increasing `seq`.
//! Replies echo the `seq` of the message they answer.
//!
//! ## Client → Game
//!
//! - **hello**: client info, protocol version, requested capabilities
//! - **command**: `actions` (`moveUp`, `moveDown`, `moveLeft`, `moveRight`,
//!   `restart`, `growBoard`, `shrinkBoard`) and/or `resize` (board size)
//! - **control**: `claim` or `release` the controller role
//!
//! ## Game → Client
//!
//! - **welcome**: assigned role, controller id, supported actions and sizes
//! - **observation**: board, score, best score, flags, `state_hash`
//! - **ack**: the command was applied
//! - **error**: `code` and `message`
//!
//! # Environment Variables
//!
//! - `G2048_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `G2048_AI_PORT`: Port number (default: 7878)
//! - `G2048_AI_MAX_PENDING`: Command queue capacity (default: 10)
//! - `G2048_AI_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! -> {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! <- {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1,...}
//! <- {"type":"observation","seq":1,"ts":1700000000002,"episode_id":0,"size":4,"board":{...},"score":0,...}
//! -> {"type":"command","seq":2,"ts":1700000000100,"actions":["moveLeft","moveUp"]}
//! <- {"type":"ack","seq":2,"ts":1700000000117,"status":"ok"}
//! <- {"type":"observation","seq":2,...}
//! ```
//!
//! # Threading
//!
//! The server runs on its own tokio runtime ([`Adapter`]). The game loop owns
//! the session and drains commands with [`Adapter::pump`] once per tick, so
//! the session is never shared across threads.

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{
    apply_inbound, Adapter, Applied, InboundCommand, InboundPayload, OutboundMessage, ServerStatus,
    StatusSnapshot,
};
pub use server::{build_observation, run_server, ServerConfig};
