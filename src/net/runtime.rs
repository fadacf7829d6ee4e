//! Runtime module - sync facade over the async session tasks
//!
//! The update domain is a single synchronous thread; the listener and
//! per-connection tasks run on a dedicated tokio runtime owned here.
//! State crosses only through channels. Dropping the facade drops the
//! runtime, which cancels the accept loop and every reader at its await
//! point - nothing is left blocking on a dead session.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::net::join_code;
use crate::net::protocol::NetMessage;
use crate::net::session::{run_host, run_joiner, NetConfig, OutboundMessage, SessionEvent};

/// How long setup waits for a bind or connect before giving up
const SETUP_WAIT: Duration = Duration::from_secs(10);

/// One hosted or joined match connection pool, driven from the game loop
#[derive(Debug)]
pub struct NetSession {
    _rt: Runtime,
    event_rx: mpsc::Receiver<SessionEvent>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    local_addr: SocketAddr,
    join_code: String,
    loopback_code: String,
    is_host: bool,
}

impl NetSession {
    /// Bind a listener and start accepting joiners. Returns once the
    /// ephemeral port is known and the join code can be shared.
    pub fn host(config: NetConfig) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel(config.max_pending_events.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create network runtime")?;
        let advertise_ip = config.advertise_ip;
        rt.spawn(async move {
            if let Err(e) = run_host(config, event_tx, out_rx, Some(ready_tx)).await {
                eprintln!("[Net] host loop failed: {}", e);
            }
        });

        let local_addr = rt
            .block_on(async { tokio::time::timeout(SETUP_WAIT, ready_rx).await })
            .context("timed out waiting for the listener to bind")?
            .map_err(|_| anyhow!("listener task exited before binding"))?;

        let join_code = join_code::encode(advertise_ip, local_addr.port());
        let loopback_code = join_code::encode(Ipv4Addr::LOCALHOST, local_addr.port());
        println!("[Net] join code: {}", join_code);
        println!("[Net] loopback code: {}", loopback_code);

        Ok(Self {
            _rt: rt,
            event_rx,
            out_tx,
            local_addr,
            join_code,
            loopback_code,
            is_host: true,
        })
    }

    /// Host with configuration taken from the environment
    pub fn host_from_env() -> Result<Self> {
        Self::host(NetConfig::from_env())
    }

    /// Decode a join code and connect to its host
    pub fn join(code: &str, config: NetConfig) -> Result<Self> {
        let target = join_code::decode_socket_addr(code)?;

        let (event_tx, event_rx) = mpsc::channel(config.max_pending_events.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        let rt = Runtime::new().context("failed to create network runtime")?;
        let socket = rt
            .block_on(async {
                tokio::time::timeout(SETUP_WAIT, TcpStream::connect(SocketAddr::from(target))).await
            })
            .context("timed out connecting to host")?
            .with_context(|| format!("could not connect to host at {}", target))?;
        let local_addr = socket.local_addr()?;
        println!("[Net] connected to host at {}", target);

        let read_timeout = config.read_timeout();
        rt.spawn(async move {
            if let Err(e) = run_joiner(socket, event_tx, out_rx, read_timeout).await {
                eprintln!("[Net] connection to host failed: {}", e);
            }
        });

        Ok(Self {
            _rt: rt,
            event_rx,
            out_tx,
            local_addr,
            join_code: code.trim().to_string(),
            loopback_code: join_code::encode(Ipv4Addr::LOCALHOST, target.port()),
            is_host: false,
        })
    }

    /// Next queued network event, if any. Never blocks.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn send(&self, message: OutboundMessage) {
        let _ = self.out_tx.send(message);
    }

    /// Queue a message for every connected peer
    pub fn broadcast(&self, message: NetMessage) {
        self.send(OutboundMessage::Broadcast(message));
    }

    /// Code to share with joiners (host) or the code joined with
    pub fn join_code(&self) -> &str {
        &self.join_code
    }

    /// Same port, loopback address - for a joiner on the host's machine
    pub fn loopback_code(&self) -> &str {
        &self.loopback_code
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }
}
