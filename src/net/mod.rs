//! Net module - join codes, wire tokens and the match session
//!
//! Hosting is bind-and-listen; NAT and firewall traversal are deployment
//! concerns outside this crate.

pub mod join_code;
pub mod protocol;
pub mod runtime;
pub mod session;

// Re-export the types callers wire together
pub use join_code::MalformedCodeError;
pub use protocol::NetMessage;
pub use runtime::NetSession;
pub use session::{NetConfig, OutboundMessage, SessionEvent, HOST_PEER};
