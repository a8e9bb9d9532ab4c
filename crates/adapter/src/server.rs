//! TCP server for the control adapter
//!
//! One task per connection reads lines and answers protocol errors directly.
//! Valid commands go through the bounded command channel to the game loop,
//! which replies once they are applied. A dispatcher task routes those replies
//! (and broadcast observations) to the per-client writer tasks.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::GameSnapshot;
use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage, ServerStatus};
use crate::types::GameAction;

/// Stable 64-bit FNV-1a hasher for a deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust releases.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Capacity of the command queue to the game loop.
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Read `G2048_AI_HOST`, `G2048_AI_PORT` and `G2048_AI_MAX_PENDING`,
    /// falling back to the defaults for missing or unparsable values.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("G2048_AI_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("G2048_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("G2048_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
            ..defaults
        }
    }
}

/// Per-connection bookkeeping
#[derive(Debug)]
struct ClientHandle {
    id: usize,
    handshaken: bool,
    stream_observations: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Default)]
struct Registry {
    clients: Vec<ClientHandle>,
    controller: Option<usize>,
}

impl Registry {
    fn get(&self, id: usize) -> Option<&ClientHandle> {
        self.clients.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: usize) -> Option<&mut ClientHandle> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    fn is_handshaken(&self, id: usize) -> bool {
        self.get(id).map(|c| c.handshaken).unwrap_or(false)
    }

    /// Record `seq` if it is strictly greater than the last one seen.
    fn check_and_update_seq(&mut self, id: usize, seq: u64) -> bool {
        let Some(client) = self.get_mut(id) else {
            return false;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    fn send_to(&self, id: usize, msg: ClientOutbound) {
        if let Some(c) = self.get(id) {
            let _ = c.tx.send(msg);
        }
    }

    fn publish(&self, status: Option<&ServerStatus>) {
        if let Some(status) = status {
            let handshaken = self.clients.iter().filter(|c| c.handshaken);
            let clients = handshaken.clone().count() as u16;
            let streaming = handshaken.filter(|c| c.stream_observations).count() as u16;
            status.publish(clients, streaming, self.controller);
        }
    }
}

struct ServerState {
    config: ServerConfig,
    registry: RwLock<Registry>,
    status: Option<Arc<ServerStatus>>,
}

impl ServerState {
    async fn publish(&self) {
        self.registry.read().await.publish(self.status.as_deref());
    }
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Run the server until the listener fails.
///
/// `ready_tx` receives the bound address (useful with port 0). `status`, when
/// given, is kept up to date with client and controller counts.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    status: Option<Arc<ServerStatus>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!("adapter listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        registry: RwLock::new(Registry::default()),
        status,
    });
    state.publish().await;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let registry = state.registry.read().await;
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        registry.send_to(client_id, ClientOutbound::Ack(ack))
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        registry.send_to(client_id, ClientOutbound::Error(err))
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        registry.send_to(client_id, ClientOutbound::Observation(obs))
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        for c in registry
                            .clients
                            .iter()
                            .filter(|c| c.handshaken && c.stream_observations)
                        {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
        });
    }

    let mut next_client_id = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        next_client_id += 1;
        let client_id = next_client_id;
        info!("client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, &state, command_tx).await {
                warn!("client {} error: {}", client_id, e);
            }
            info!("client {} disconnected", client_id);
        });
    }
}

/// Drop a client and hand control to the lowest remaining handshaken id.
async fn remove_client(state: &ServerState, client_id: usize) {
    let mut registry = state.registry.write().await;
    registry.clients.retain(|c| c.id != client_id);

    if registry.controller == Some(client_id) {
        registry.controller = registry
            .clients
            .iter()
            .filter(|c| c.handshaken)
            .map(|c| c.id)
            .min();
        match registry.controller {
            Some(id) => info!("client {} promoted to controller", id),
            None => info!("controller {} released", client_id),
        }
    }
    registry.publish(state.status.as_deref());
}

async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.registry.write().await.clients.push(ClientHandle {
        id: client_id,
        handshaken: false,
        stream_observations: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Welcome(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Ack(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Error(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Observation(m) => serde_json::to_writer(&mut buf, m),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let result = serve_lines(&mut reader, client_id, state, &tx, &command_tx).await;

    // The registry holds a sender too; the writer drains once both are gone.
    remove_client(state, client_id).await;
    drop(tx);
    let _ = write_task.await;
    result
}

async fn serve_lines(
    reader: &mut BufReader<OwnedReadHalf>,
    client_id: usize,
    state: &ServerState,
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    command_tx: &mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let msg = match parse_message(trimmed) {
            Ok(msg) => msg,
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
                continue;
            }
        };
        match msg {
            ParsedMessage::Hello(hello) => {
                let mut registry = state.registry.write().await;
                if registry.is_handshaken(client_id)
                    && !registry.check_and_update_seq(client_id, hello.seq)
                {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if !hello.protocol_version.starts_with(PROTOCOL_MAJOR) {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    return Ok(());
                }

                if let Some(client) = registry.get_mut(client_id) {
                    client.handshaken = true;
                    client.last_seq = Some(hello.seq);
                    client.stream_observations = hello.requested.stream_observations;
                }
                if registry.controller.is_none() {
                    registry.controller = Some(client_id);
                    info!("client {} ({}) is now controller", client_id, hello.client.name);
                }
                let role = if registry.controller == Some(client_id) {
                    AssignedRole::Controller
                } else {
                    AssignedRole::Observer
                };

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    registry.controller.map(|id| id as u64),
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));
                registry.publish(state.status.as_deref());
                drop(registry);

                if hello.requested.stream_observations
                    && command_tx
                        .try_send(InboundCommand {
                            client_id,
                            seq: hello.seq,
                            payload: InboundPayload::SnapshotRequest,
                        })
                        .is_err()
                {
                    debug!("client {} seq {}: no room for initial snapshot", client_id, hello.seq);
                    reply_error(hello.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }

            ParsedMessage::Command(cmd) => {
                {
                    let mut registry = state.registry.write().await;
                    if !registry.is_handshaken(client_id) {
                        reply_error(cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                        continue;
                    }
                    if !registry.check_and_update_seq(client_id, cmd.seq) {
                        reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                        continue;
                    }
                    if registry.controller != Some(client_id) {
                        reply_error(cmd.seq, ErrorCode::NotController, "only the controller may send commands");
                        continue;
                    }
                }

                let actions = match map_command(&cmd) {
                    Ok(a) => a,
                    Err(message) => {
                        reply_error(cmd.seq, ErrorCode::InvalidCommand, &message);
                        continue;
                    }
                };

                // The game loop acks once the command has been applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(actions),
                    })
                    .is_err()
                {
                    debug!("client {} seq {}: command queue full", client_id, cmd.seq);
                    reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }

            ParsedMessage::Control(ctrl) => {
                let mut registry = state.registry.write().await;
                if !registry.is_handshaken(client_id) {
                    reply_error(ctrl.seq, ErrorCode::HandshakeRequired, "send hello before control");
                    continue;
                }
                if !registry.check_and_update_seq(client_id, ctrl.seq) {
                    reply_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                match ctrl.action {
                    ControlAction::Claim => match registry.controller {
                        None => {
                            registry.controller = Some(client_id);
                            info!("client {} claimed control", client_id);
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        }
                        Some(id) if id == client_id => {
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        }
                        Some(_) => {
                            reply_error(ctrl.seq, ErrorCode::ControllerActive, "controller already assigned")
                        }
                    },
                    ControlAction::Release => {
                        if registry.controller == Some(client_id) {
                            registry.controller = None;
                            info!("client {} released control", client_id);
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        } else {
                            reply_error(ctrl.seq, ErrorCode::NotController, "only the controller may release");
                        }
                    }
                }
                registry.publish(state.status.as_deref());
            }

            ParsedMessage::Unknown(unknown) => {
                let mut registry = state.registry.write().await;
                if registry.is_handshaken(client_id)
                    && !registry.check_and_update_seq(client_id, unknown.seq)
                {
                    reply_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                reply_error(unknown.seq, ErrorCode::InvalidCommand, "unknown message type");
            }
        }
    }
}

/// Flatten a command into the action batch the game loop applies.
fn map_command(cmd: &CommandMessage) -> Result<ActionBatch, String> {
    let mut out = ActionBatch::new();
    if let Some(size) = cmd.resize {
        out.push(GameAction::Resize(size));
    }
    if let Some(actions) = &cmd.actions {
        for &a in &actions.0 {
            out.try_push(a).map_err(|_| "too many actions".to_string())?;
        }
    }
    if out.is_empty() {
        return Err("command needs actions or resize".to_string());
    }
    Ok(out)
}

/// Build an observation from a session snapshot.
pub fn build_observation(snap: &GameSnapshot, seq: u64) -> ObservationMessage {
    use std::hash::{Hash, Hasher};

    let cells: Vec<Vec<u32>> = snap
        .board
        .iter()
        .map(|row| row.iter().map(|t| t.unwrap_or(0)).collect())
        .collect();

    let mut hasher = Fnv1aHasher::new();
    snap.size.hash(&mut hasher);
    cells.hash(&mut hasher);
    snap.score.hash(&mut hasher);
    snap.best_score.hash(&mut hasher);
    snap.game_over.hash(&mut hasher);
    snap.game_won.hash(&mut hasher);
    snap.episode_id.hash(&mut hasher);
    snap.moves.hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        episode_id: snap.episode_id,
        size: snap.size,
        board: BoardSnapshot {
            size: snap.size,
            cells,
        },
        score: snap.score,
        best_score: snap.best_score,
        game_over: snap.game_over,
        game_won: snap.game_won,
        playable: snap.playable(),
        moves: snap.moves,
        max_tile: snap.max_tile().unwrap_or(0),
        state_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameSession, ScriptedTiles};
    use crate::types::Direction;

    #[test]
    fn test_map_command_puts_resize_first() {
        let cmd = create_command(1, &[GameAction::MoveLeft], Some(5));
        let batch = map_command(&cmd).unwrap();
        assert_eq!(batch.as_slice(), &[GameAction::Resize(5), GameAction::MoveLeft]);
    }

    #[test]
    fn test_map_command_rejects_empty() {
        let cmd = create_command(1, &[], None);
        assert!(map_command(&cmd).is_err());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(config.max_pending_commands, 10);
        assert!(config.protocol_version.starts_with(PROTOCOL_MAJOR));
    }

    #[test]
    fn test_observation_encodes_empty_as_zero() {
        let session = GameSession::new(2, ScriptedTiles::default()).unwrap();
        let obs = build_observation(&session.snapshot(), 1);
        assert_eq!(obs.board.cells, vec![vec![2, 2], vec![0, 0]]);
        assert_eq!(obs.size, 2);
        assert!(obs.playable);
        assert_eq!(obs.max_tile, 2);
    }

    #[test]
    fn test_state_hash_tracks_state_not_seq() {
        let mut session = GameSession::new(4, ScriptedTiles::default()).unwrap();
        let a = build_observation(&session.snapshot(), 1);
        let b = build_observation(&session.snapshot(), 2);
        assert_eq!(a.state_hash, b.state_hash);

        assert!(session.apply_move(Direction::Left));
        let c = build_observation(&session.snapshot(), 3);
        assert_ne!(a.state_hash, c.state_hash);
    }

    #[test]
    fn test_state_hash_changes_with_episode() {
        let mut session = GameSession::new(4, ScriptedTiles::default()).unwrap();
        let a = build_observation(&session.snapshot(), 1);
        session.restart();
        let b = build_observation(&session.snapshot(), 1);
        // Same deal, new episode.
        assert_eq!(a.board, b.board);
        assert_ne!(a.state_hash, b.state_hash);
    }
}
