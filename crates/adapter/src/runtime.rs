//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server: commands flow
//! in through a bounded channel, replies and observations flow out through an
//! unbounded one. The game loop never blocks on the network.

use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, error};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::{GameError, GameSession, GameSnapshot, TileSource};
use crate::protocol::*;
use crate::server::{build_observation, run_server, ServerConfig};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// A client asked for observations; send it the current state.
    SnapshotRequest,
    /// Actions to apply in order. A `resize` field arrives as the first entry.
    Command(ActionBatch),
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    /// Sent to every handshaken client that asked for streaming.
    BroadcastObservation { obs: ObservationMessage },
}

/// Live connection counters, written by the server and read by the UI.
#[derive(Debug, Default)]
pub struct ServerStatus {
    clients: AtomicU16,
    streaming: AtomicU16,
    /// Controller id, 0 when none (ids start at 1).
    controller: AtomicUsize,
}

/// Point-in-time copy of [`ServerStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub client_count: u16,
    pub streaming_count: u16,
    pub controller_id: Option<usize>,
}

impl ServerStatus {
    pub(crate) fn publish(&self, clients: u16, streaming: u16, controller: Option<usize>) {
        self.clients.store(clients, Ordering::Relaxed);
        self.streaming.store(streaming, Ordering::Relaxed);
        self.controller.store(controller.unwrap_or(0), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let controller = self.controller.load(Ordering::Relaxed);
        StatusSnapshot {
            client_count: self.clients.load(Ordering::Relaxed),
            streaming_count: self.streaming.load(Ordering::Relaxed),
            controller_id: (controller != 0).then_some(controller),
        }
    }
}

/// Result of applying one inbound command.
#[derive(Debug, Clone)]
pub struct Applied {
    /// Ack, error or observation for the sender.
    pub reply: OutboundMessage,
    /// Whether the session changed (observers need a fresh observation).
    pub changed: bool,
}

/// Apply an inbound command to the session and build the reply.
///
/// Actions run in order. The first one that fails stops the batch with an
/// `invalid_size` error; actions before it stay applied.
pub fn apply_inbound<S: TileSource>(
    session: &mut GameSession<S>,
    inbound: &InboundCommand,
    obs_seq: u64,
) -> Applied {
    let client_id = inbound.client_id;
    match &inbound.payload {
        InboundPayload::SnapshotRequest => Applied {
            reply: OutboundMessage::ToClientObservation {
                client_id,
                obs: build_observation(&session.snapshot(), obs_seq),
            },
            changed: false,
        },
        InboundPayload::Command(actions) => {
            let mut changed = false;
            for &action in actions {
                match session.apply_action(action) {
                    Ok(c) => changed |= c,
                    Err(e @ GameError::InvalidSize { .. }) => {
                        debug!("client {} seq {}: {}", client_id, inbound.seq, e);
                        return Applied {
                            reply: OutboundMessage::ToClientError {
                                client_id,
                                err: create_error(inbound.seq, ErrorCode::InvalidSize, &e.to_string()),
                            },
                            changed,
                        };
                    }
                    Err(e) => {
                        return Applied {
                            reply: OutboundMessage::ToClientError {
                                client_id,
                                err: create_error(inbound.seq, ErrorCode::InvalidCommand, &e.to_string()),
                            },
                            changed,
                        };
                    }
                }
            }
            Applied {
                reply: OutboundMessage::ToClientAck {
                    client_id,
                    ack: create_ack(inbound.seq),
                },
                changed,
            }
        }
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<ServerStatus>,
    obs_seq: u64,
}

impl Adapter {
    /// Start the server on its own runtime using settings from the environment.
    pub fn start_from_env() -> Result<Self> {
        Self::start(ServerConfig::from_env())
    }

    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let status = Arc::new(ServerStatus::default());

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server_status = Arc::clone(&status);
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None, Some(server_status)).await {
                error!("adapter server stopped: {:#}", e);
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
            obs_seq: 0,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    fn next_obs_seq(&mut self) -> u64 {
        self.obs_seq += 1;
        self.obs_seq
    }

    /// Drain pending commands into the session.
    ///
    /// Returns whether any command changed the session; in that case every
    /// streaming client has already been sent a fresh observation.
    pub fn pump<S: TileSource>(&mut self, session: &mut GameSession<S>) -> bool {
        let mut changed = false;
        while let Some(inbound) = self.try_recv() {
            let seq = self.next_obs_seq();
            let applied = apply_inbound(session, &inbound, seq);
            changed |= applied.changed;
            self.send(applied.reply);
        }
        if changed {
            self.broadcast(&session.snapshot());
        }
        changed
    }

    /// Stream the current state to every observing client.
    pub fn broadcast(&mut self, snap: &GameSnapshot) {
        let seq = self.next_obs_seq();
        self.send(OutboundMessage::BroadcastObservation {
            obs: build_observation(snap, seq),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptedTiles;
    use crate::types::GameAction;

    fn command(actions: &[GameAction]) -> InboundCommand {
        InboundCommand {
            client_id: 3,
            seq: 11,
            payload: InboundPayload::Command(actions.iter().copied().collect()),
        }
    }

    #[test]
    fn ack_after_successful_batch() {
        let mut session = GameSession::new(4, ScriptedTiles::default()).unwrap();
        let applied = apply_inbound(&mut session, &command(&[GameAction::MoveLeft]), 1);
        assert!(applied.changed);
        match applied.reply {
            OutboundMessage::ToClientAck { client_id, ack } => {
                assert_eq!(client_id, 3);
                assert_eq!(ack.seq, 11);
            }
            other => panic!("expected ack, got {:?}", other),
        }
    }

    #[test]
    fn invalid_resize_stops_batch() {
        let mut session = GameSession::new(4, ScriptedTiles::default()).unwrap();
        let applied = apply_inbound(
            &mut session,
            &command(&[GameAction::Resize(11), GameAction::MoveLeft]),
            1,
        );
        assert!(!applied.changed);
        assert_eq!(session.moves(), 0);
        match applied.reply {
            OutboundMessage::ToClientError { err, .. } => {
                assert_eq!(err.code, ErrorCode::InvalidSize);
                assert_eq!(err.seq, 11);
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn snapshot_request_replies_with_observation() {
        let mut session = GameSession::new(3, ScriptedTiles::default()).unwrap();
        let inbound = InboundCommand {
            client_id: 1,
            seq: 1,
            payload: InboundPayload::SnapshotRequest,
        };
        let applied = apply_inbound(&mut session, &inbound, 42);
        assert!(!applied.changed);
        match applied.reply {
            OutboundMessage::ToClientObservation { obs, .. } => {
                assert_eq!(obs.seq, 42);
                assert_eq!(obs.size, 3);
            }
            other => panic!("expected observation, got {:?}", other),
        }
    }

    #[test]
    fn status_snapshot_maps_zero_to_no_controller() {
        let status = ServerStatus::default();
        assert_eq!(status.snapshot().controller_id, None);
        status.publish(2, 1, Some(5));
        assert_eq!(
            status.snapshot(),
            StatusSnapshot {
                client_count: 2,
                streaming_count: 1,
                controller_id: Some(5)
            }
        );
    }
}
