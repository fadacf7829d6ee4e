//! Session module - host accept loop and joiner connection
//!
//! The host binds an ephemeral port and accepts any number of joiners; a
//! joiner opens one connection to the host. Every connection gets one
//! reader task and one writer task. Parsed tokens cross into the update
//! domain through a bounded channel; nothing in here ever touches game
//! state directly, and a dead or misbehaving connection only ever takes
//! itself down.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::net::protocol::{self, NetMessage};
use crate::types::CELL_COUNT;

/// The peer slot a joiner sees its host under
pub const HOST_PEER: u8 = 0;

/// Session configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub bind_host: String,
    /// 0 picks an ephemeral port
    pub bind_port: u16,
    /// Address advertised inside the join code. Looking this up (UPnP,
    /// STUN, a what's-my-ip service) is the caller's business.
    pub advertise_ip: Ipv4Addr,
    /// Capacity of the inbound event queue read by the update domain
    pub max_pending_events: usize,
    /// Drop a peer silent for this long; `None` reads forever
    pub read_timeout_ms: Option<u64>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 0,
            advertise_ip: Ipv4Addr::LOCALHOST,
            max_pending_events: 64,
            read_timeout_ms: None,
        }
    }
}

impl NetConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let bind_host = env::var("NET_TETRIS_HOST").unwrap_or(defaults.bind_host);
        let bind_port = env::var("NET_TETRIS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.bind_port);
        let advertise_ip = env::var("NET_TETRIS_ADVERTISE_IP")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.advertise_ip);
        let max_pending_events = env::var("NET_TETRIS_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_events);
        let read_timeout_ms = env::var("NET_TETRIS_READ_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok());

        Self {
            bind_host,
            bind_port,
            advertise_ip,
            max_pending_events,
            read_timeout_ms,
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

/// Parsed network activity delivered to the update domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PeerJoined { peer: u8 },
    PeerLeft { peer: u8 },
    Start,
    Board { peer: u8, cells: [u8; CELL_COUNT] },
    PeerGameOver { peer: u8 },
}

/// Message queued by the update domain for delivery
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Broadcast(NetMessage),
    ToPeer { peer: u8, message: NetMessage },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Host,
    Joiner,
}

/// Writer-side handle to one connection
struct PeerHandle {
    index: u8,
    tx: mpsc::UnboundedSender<String>,
}

type PeerRegistry = Arc<RwLock<Vec<PeerHandle>>>;

/// Run the hosting side: bind, report the bound address, accept forever.
/// Each accepted joiner takes the next peer slot.
pub async fn run_host(
    config: NetConfig,
    event_tx: mpsc::Sender<SessionEvent>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    let listener = TcpListener::bind((config.bind_host.as_str(), config.bind_port)).await?;
    let bound = listener.local_addr()?;
    println!("[Net] listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let peers: PeerRegistry = Arc::new(RwLock::new(Vec::new()));
    tokio::spawn(dispatch_outbound(Arc::clone(&peers), out_rx));

    let read_timeout = config.read_timeout();
    let mut next_index: u8 = HOST_PEER;

    loop {
        let (socket, addr) = listener.accept().await?;
        next_index = next_index.wrapping_add(1);
        let peer = next_index;

        println!("[Net] peer {} connected from {}", peer, addr);

        // Register the writer before announcing the peer, so a broadcast
        // queued on the announcement already reaches it
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        {
            let mut peers = peers.write().await;
            peers.push(PeerHandle { index: peer, tx });
        }
        deliver(&event_tx, SessionEvent::PeerJoined { peer });

        let peers = Arc::clone(&peers);
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) =
                handle_connection(socket, peer, Role::Host, peers, event_tx, read_timeout, rx)
                    .await
            {
                eprintln!("[Net] peer {} error: {}", peer, e);
            }
        });
    }
}

/// Run the joining side over an already-connected stream. The host sits in
/// peer slot 0.
pub async fn run_joiner(
    socket: TcpStream,
    event_tx: mpsc::Sender<SessionEvent>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    read_timeout: Option<Duration>,
) -> Result<()> {
    let peers: PeerRegistry = Arc::new(RwLock::new(Vec::new()));
    tokio::spawn(dispatch_outbound(Arc::clone(&peers), out_rx));

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    {
        let mut peers = peers.write().await;
        peers.push(PeerHandle {
            index: HOST_PEER,
            tx,
        });
    }
    deliver(&event_tx, SessionEvent::PeerJoined { peer: HOST_PEER });

    handle_connection(socket, HOST_PEER, Role::Joiner, peers, event_tx, read_timeout, rx).await
}

/// Forward queued outbound messages to connection writers
async fn dispatch_outbound(peers: PeerRegistry, mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>) {
    while let Some(msg) = out_rx.recv().await {
        match msg {
            OutboundMessage::Broadcast(message) => {
                let line = protocol::encode(&message);
                let peers = peers.read().await;
                for peer in peers.iter() {
                    let _ = peer.tx.send(line.clone());
                }
            }
            OutboundMessage::ToPeer { peer, message } => {
                let line = protocol::encode(&message);
                let peers = peers.read().await;
                if let Some(p) = peers.iter().find(|p| p.index == peer) {
                    let _ = p.tx.send(line);
                }
            }
        }
    }
}

/// Serve one already-registered connection until it closes: pump queued
/// lines out, read tokens in until EOF, error or timeout. Unregisters and
/// reports `PeerLeft` on the way out.
async fn handle_connection(
    socket: TcpStream,
    peer: u8,
    role: Role,
    peers: PeerRegistry,
    event_tx: mpsc::Sender<SessionEvent>,
    read_timeout: Option<Duration>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
) -> Result<()> {
    let addr = socket.peer_addr()?;
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    let write_task = tokio::spawn(async move {
        while let Some(line) = outbound_rx.recv().await {
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if write_half.write_all(b"\n").await.is_err() {
                break;
            }
            if write_half.flush().await.is_err() {
                break;
            }
        }
    });

    let result = read_loop(&mut reader, peer, role, &event_tx, read_timeout).await;

    {
        let mut peers = peers.write().await;
        peers.retain(|p| p.index != peer);
    }
    deliver(&event_tx, SessionEvent::PeerLeft { peer });
    println!("[Net] peer {} ({}) disconnected", peer, addr);

    // Registry drop closed the writer channel; let it drain
    let _ = write_task.await;

    result
}

async fn read_loop(
    reader: &mut BufReader<OwnedReadHalf>,
    peer: u8,
    role: Role,
    event_tx: &mpsc::Sender<SessionEvent>,
    read_timeout: Option<Duration>,
) -> Result<()> {
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = match read_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, reader.read_line(&mut line)).await {
                    Ok(read) => read?,
                    Err(_) => {
                        println!("[Net] peer {} silent for {:?}, dropping", peer, limit);
                        return Ok(());
                    }
                }
            }
            None => reader.read_line(&mut line).await?,
        };

        if bytes_read == 0 {
            return Ok(());
        }

        let token = line.trim_end_matches(['\n', '\r']);
        if token.is_empty() {
            continue;
        }

        match protocol::parse(token) {
            Ok(NetMessage::Start) => match role {
                // Only the host may start the match
                Role::Joiner => deliver(event_tx, SessionEvent::Start),
                Role::Host => println!("[Net] ignoring start_game from peer {}", peer),
            },
            // Attribution comes from the connection, not the embedded index
            Ok(NetMessage::Board { cells, .. }) => {
                deliver(event_tx, SessionEvent::Board { peer, cells })
            }
            Ok(NetMessage::GameOver) => deliver(event_tx, SessionEvent::PeerGameOver { peer }),
            Err(e) => println!("[Net] peer {}: ignoring token: {}", peer, e),
        }
    }
}

/// Hand an event to the update domain without ever blocking a reader.
/// Overflow drops the event - the protocol is advisory.
fn deliver(event_tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    if event_tx.try_send(event).is_err() {
        println!("[Net] inbound queue full, event dropped");
    }
}
