//! Request context shared across pipeline stages.

use std::collections::HashMap;
use std::net::IpAddr;

/// The peer address of a request, in whatever form the host captured it.
///
/// Hosts that terminate connections themselves usually have a structured
/// [`IpAddr`]; hosts bridging other runtimes may only have text or raw
/// octets/segments. The gate normalizes all of these before deciding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerAddr {
    /// Textual form, e.g. `"10.0.0.1"` or `"1:2:3::4"`.
    Text(String),

    /// A structured address.
    Ip(IpAddr),

    /// Raw IPv4 octets.
    V4Octets([u8; 4]),

    /// Raw IPv6 16-bit segments.
    V6Segments([u16; 8]),
}

impl From<&str> for PeerAddr {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PeerAddr {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<IpAddr> for PeerAddr {
    fn from(addr: IpAddr) -> Self {
        Self::Ip(addr)
    }
}

impl From<[u8; 4]> for PeerAddr {
    fn from(octets: [u8; 4]) -> Self {
        Self::V4Octets(octets)
    }
}

impl From<[u16; 8]> for PeerAddr {
    fn from(segments: [u16; 8]) -> Self {
        Self::V6Segments(segments)
    }
}

/// A request flowing through the pipeline.
///
/// Carries the peer address the host captured for the connection, the
/// response the pipeline has staged so far, and the halted flag. A halted
/// context tells the host to send the staged response and skip the remaining
/// stages.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Peer address of the connection, if the host captured one.
    pub peer: Option<PeerAddr>,

    /// Request headers.
    pub headers: HashMap<String, String>,

    /// Staged response status code.
    pub response_code: Option<u16>,

    /// Staged response body.
    pub response_body: Option<String>,

    /// Whether further pipeline processing should stop.
    pub halted: bool,
}

impl RequestContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the peer address.
    #[must_use]
    pub fn with_peer(mut self, peer: impl Into<PeerAddr>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Stage a response code and body.
    #[must_use]
    pub fn respond(mut self, code: u16, body: impl Into<String>) -> Self {
        self.response_code = Some(code);
        self.response_body = Some(body.into());
        self
    }

    /// Stop further pipeline processing.
    #[must_use]
    pub fn halt(mut self) -> Self {
        self.halted = true;
        self
    }

    /// Whether the context has been halted.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}
