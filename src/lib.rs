//! Falling-block puzzle engine with peer-to-peer match synchronization.
//!
//! `core` holds the pure game rules; `net` hosts or joins a match over a
//! raw TCP stream and hands parsed tokens to the update domain through
//! channels; `multiplayer` pumps one engine against one network session.
//! Rendering, input devices and timers live outside this crate: callers
//! deliver ticks and actions, and read snapshots back.

pub mod core;
pub mod multiplayer;
pub mod net;
pub mod types;
