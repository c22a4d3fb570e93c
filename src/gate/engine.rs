//! The access decision.
//!
//! Pure functions from a peer address and resolved options to an
//! allow/block verdict. Acting on the verdict (halting the pipeline,
//! staging a response) belongs to the stage handler and the host, not here.

use std::net::{IpAddr, Ipv6Addr};

use crate::pipeline::{PeerAddr, RequestContext};

use super::codec::{self, Address};
use super::options::ResolvedOptions;

/// Decide whether the peer address is permitted by the resolved options.
///
/// Absent or empty input is denied without a parse attempt, and textual
/// input that fails to parse is denied silently: at decision time, malformed
/// client input resolves to the safe default instead of raising. An empty
/// allow list denies unconditionally.
#[must_use]
pub fn decide(peer: Option<&PeerAddr>, options: &ResolvedOptions) -> bool {
    let Some(peer) = peer else {
        return false;
    };
    let Some(addr) = normalize(peer) else {
        return false;
    };

    if options.allow.is_empty() {
        return false;
    }

    options.allow.contains(&addr)
}

/// Decide for a request context, using its carried peer address.
#[must_use]
pub fn decide_request(ctx: &RequestContext, options: &ResolvedOptions) -> bool {
    decide(ctx.peer.as_ref(), options)
}

fn normalize(peer: &PeerAddr) -> Option<Address> {
    match peer {
        PeerAddr::Text(text) => {
            if text.is_empty() {
                return None;
            }
            codec::parse_address(text).ok()
        },
        PeerAddr::Ip(addr) => Some(codec::encode(*addr)),
        PeerAddr::V4Octets(octets) => Some(codec::encode(IpAddr::from(*octets))),
        PeerAddr::V6Segments(s) => Some(codec::encode(IpAddr::V6(Ipv6Addr::new(
            s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7],
        )))),
    }
}
