//! Multiplayer module - one engine pumped against one network session
//!
//! All engine mutation happens on the caller's thread. Inbound network
//! events are drained at tick boundaries and outbound snapshots are queued
//! right after the mutation that produced them, so reader tasks never
//! touch game state.

use anyhow::Result;

use crate::core::{GameSnapshot, GameState};
use crate::net::protocol::NetMessage;
use crate::net::runtime::NetSession;
use crate::net::session::{NetConfig, SessionEvent, HOST_PEER};
use crate::types::{GameAction, GameEvent, CELL_COUNT};

/// A remote player's board as last broadcast
#[derive(Debug, Clone)]
pub struct OpponentView {
    pub peer: u8,
    pub cells: [u8; CELL_COUNT],
    pub defeated: bool,
    pub connected: bool,
}

impl OpponentView {
    fn new(peer: u8) -> Self {
        Self {
            peer,
            cells: [0u8; CELL_COUNT],
            defeated: false,
            connected: true,
        }
    }
}

/// One player's end of a match: local session plus everything known about
/// the opponents
#[derive(Debug)]
pub struct MultiplayerMatch {
    state: GameState,
    net: NetSession,
    self_index: u8,
    opponents: Vec<OpponentView>,
    match_started: bool,
}

impl MultiplayerMatch {
    /// Host a match; the join code is available immediately
    pub fn host(seed: u32, config: NetConfig) -> Result<Self> {
        Ok(Self {
            state: GameState::new(seed),
            net: NetSession::host(config)?,
            self_index: HOST_PEER,
            opponents: Vec::new(),
            match_started: false,
        })
    }

    /// Join a hosted match by code and wait for its start signal
    pub fn join(seed: u32, code: &str, config: NetConfig) -> Result<Self> {
        Ok(Self {
            state: GameState::new(seed),
            net: NetSession::join(code, config)?,
            self_index: HOST_PEER + 1,
            opponents: Vec::new(),
            match_started: false,
        })
    }

    /// Host-side: broadcast the start signal and begin the local session
    pub fn start(&mut self) -> bool {
        if !self.net.is_host() || self.match_started {
            return false;
        }

        self.net.broadcast(NetMessage::Start);
        self.match_started = true;
        self.state.start();
        self.flush_engine_events();
        true
    }

    /// One external tick: consume queued network events, advance gravity,
    /// push resulting snapshots out
    pub fn tick(&mut self) {
        self.pump_network();
        if self.match_started {
            self.state.advance();
            self.flush_engine_events();
        }
    }

    /// Drain inbound network events without advancing gravity. Lobby
    /// screens and render loops call this between ticks.
    pub fn poll(&mut self) {
        self.pump_network();
    }

    /// Apply a discrete input to the local session
    pub fn input(&mut self, action: GameAction) -> bool {
        self.pump_network();
        if !self.match_started {
            return false;
        }

        let applied = self.state.apply_input(action);
        self.flush_engine_events();
        applied
    }

    pub fn match_started(&self) -> bool {
        self.match_started
    }

    pub fn engine(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    pub fn opponents(&self) -> &[OpponentView] {
        &self.opponents
    }

    pub fn net(&self) -> &NetSession {
        &self.net
    }

    fn flush_engine_events(&mut self) {
        for event in self.state.take_events() {
            match event {
                GameEvent::BoardCommitted => {
                    self.net.broadcast(NetMessage::Board {
                        peer: self.self_index,
                        cells: self.state.board().wire_cells(),
                    });
                }
                GameEvent::GameOver => {
                    self.net.broadcast(NetMessage::GameOver);
                }
            }
        }
    }

    fn pump_network(&mut self) {
        while let Some(event) = self.net.try_recv() {
            match event {
                SessionEvent::PeerJoined { peer } => {
                    self.opponent_mut(peer).connected = true;
                }
                SessionEvent::PeerLeft { peer } => {
                    // A vanished peer only disappears from view; the local
                    // session keeps running
                    self.opponent_mut(peer).connected = false;
                }
                SessionEvent::Start => {
                    if !self.match_started {
                        self.match_started = true;
                        self.state.start();
                        self.flush_engine_events();
                    }
                }
                SessionEvent::Board { peer, cells } => {
                    self.opponent_mut(peer).cells = cells;
                }
                SessionEvent::PeerGameOver { peer } => {
                    self.opponent_mut(peer).defeated = true;
                }
            }
        }
    }

    fn opponent_mut(&mut self, peer: u8) -> &mut OpponentView {
        if let Some(i) = self.opponents.iter().position(|o| o.peer == peer) {
            return &mut self.opponents[i];
        }
        self.opponents.push(OpponentView::new(peer));
        self.opponents.last_mut().expect("just pushed")
    }
}
