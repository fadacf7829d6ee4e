//! Join code module - reversible IPv4+port token
//!
//! Packs the four address octets and the big-endian port into six bytes,
//! then base64 (unpadded standard alphabet). Six bytes always encode to
//! exactly eight characters, so there is no padding to disagree about.
//! Players exchange the token out-of-band.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;

/// Length of every valid join code
pub const CODE_LEN: usize = 8;

const RAW_LEN: usize = 6;

/// A join code that failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedCodeError {
    /// Not valid base64 for the expected alphabet
    Encoding,
    /// Decoded to the wrong number of bytes
    Length(usize),
}

impl fmt::Display for MalformedCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedCodeError::Encoding => write!(f, "join code is not valid base64"),
            MalformedCodeError::Length(n) => {
                write!(f, "join code decodes to {} bytes, expected {}", n, RAW_LEN)
            }
        }
    }
}

impl std::error::Error for MalformedCodeError {}

/// Encode an address and port as a join code
pub fn encode(addr: Ipv4Addr, port: u16) -> String {
    let mut raw = [0u8; RAW_LEN];
    raw[..4].copy_from_slice(&addr.octets());
    raw[4..].copy_from_slice(&port.to_be_bytes());
    STANDARD_NO_PAD.encode(raw)
}

/// Decode a join code back to its address and port
pub fn decode(token: &str) -> Result<(Ipv4Addr, u16), MalformedCodeError> {
    let raw = STANDARD_NO_PAD
        .decode(token.trim())
        .map_err(|_| MalformedCodeError::Encoding)?;
    let raw: [u8; RAW_LEN] = raw
        .as_slice()
        .try_into()
        .map_err(|_| MalformedCodeError::Length(raw.len()))?;

    let addr = Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3]);
    let port = u16::from_be_bytes([raw[4], raw[5]]);
    Ok((addr, port))
}

/// Decode straight to a connectable socket address
pub fn decode_socket_addr(token: &str) -> Result<SocketAddrV4, MalformedCodeError> {
    let (addr, port) = decode(token)?;
    Ok(SocketAddrV4::new(addr, port))
}
