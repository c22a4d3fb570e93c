//! Address and CIDR parsing.
//!
//! Everything the gate compares is first normalized into a fixed-width
//! numeric form: IPv4 addresses become big-endian `u32`, IPv6 addresses
//! become big-endian `u128`. CIDR blocks store their network masked to the
//! prefix length, so containment is a mask-and-compare.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::error::{GateError, GateResult};

/// A normalized IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// IPv4 address as a big-endian u32.
    V4(u32),

    /// IPv6 address as a big-endian u128.
    V6(u128),
}

impl Address {
    /// Returns `true` for IPv4 addresses.
    #[must_use]
    pub fn is_v4(&self) -> bool {
        matches!(self, Self::V4(_))
    }
}

impl From<IpAddr> for Address {
    fn from(addr: IpAddr) -> Self {
        encode(addr)
    }
}

/// A CIDR block: a network prefix plus length.
///
/// Invariant: `network` has no bits set beyond `prefix_len`. Constructors
/// normalize, so two blocks spelled differently but denoting the same range
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CidrBlock {
    /// IPv4 block.
    V4 {
        /// Network address, masked to the prefix.
        network: u32,
        /// Prefix length, 0-32.
        prefix_len: u8,
    },

    /// IPv6 block.
    V6 {
        /// Network address, masked to the prefix.
        network: u128,
        /// Prefix length, 0-128.
        prefix_len: u8,
    },
}

/// Subnet mask for an IPv4 prefix length.
fn mask_v4(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        !0u32 << (32 - u32::from(prefix_len))
    }
}

/// Subnet mask for an IPv6 prefix length.
fn mask_v6(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        !0u128 << (128 - u32::from(prefix_len))
    }
}

impl CidrBlock {
    /// Create a block from an address and prefix length, normalizing the
    /// network to the prefix.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidCidr`] if the prefix length is out of
    /// range for the address family.
    pub fn new(addr: Address, prefix_len: u8) -> GateResult<Self> {
        match addr {
            Address::V4(value) => {
                if prefix_len > 32 {
                    return Err(GateError::InvalidCidr(format!(
                        "prefix length must be 0-32, got {prefix_len}"
                    )));
                }
                Ok(Self::V4 {
                    network: value & mask_v4(prefix_len),
                    prefix_len,
                })
            },
            Address::V6(value) => {
                if prefix_len > 128 {
                    return Err(GateError::InvalidCidr(format!(
                        "prefix length must be 0-128, got {prefix_len}"
                    )));
                }
                Ok(Self::V6 {
                    network: value & mask_v6(prefix_len),
                    prefix_len,
                })
            },
        }
    }

    /// Create a full-length block matching exactly one address.
    #[must_use]
    pub fn host(addr: Address) -> Self {
        match addr {
            Address::V4(value) => Self::V4 {
                network: value,
                prefix_len: 32,
            },
            Address::V6(value) => Self::V6 {
                network: value,
                prefix_len: 128,
            },
        }
    }

    /// The block's prefix length.
    #[must_use]
    pub fn prefix_len(&self) -> u8 {
        match self {
            Self::V4 { prefix_len, .. } | Self::V6 { prefix_len, .. } => *prefix_len,
        }
    }

    /// Whether the address falls inside this block.
    ///
    /// Cross-family comparisons never match.
    #[must_use]
    pub fn matches(&self, addr: &Address) -> bool {
        match (self, addr) {
            (
                Self::V4 {
                    network,
                    prefix_len,
                },
                Address::V4(value),
            ) => (value & mask_v4(*prefix_len)) == *network,
            (
                Self::V6 {
                    network,
                    prefix_len,
                },
                Address::V6(value),
            ) => (value & mask_v6(*prefix_len)) == *network,
            _ => false,
        }
    }

    /// Whether every address in `other` also falls inside this block.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::V4 {
                    network,
                    prefix_len,
                },
                Self::V4 {
                    network: other_network,
                    prefix_len: other_prefix,
                },
            ) => prefix_len <= other_prefix && (other_network & mask_v4(*prefix_len)) == *network,
            (
                Self::V6 {
                    network,
                    prefix_len,
                },
                Self::V6 {
                    network: other_network,
                    prefix_len: other_prefix,
                },
            ) => prefix_len <= other_prefix && (other_network & mask_v6(*prefix_len)) == *network,
            _ => false,
        }
    }
}

/// Encode a structured address into the normalized numeric form.
///
/// Never fails: every [`IpAddr`] has exactly one numeric encoding.
#[must_use]
pub fn encode(addr: IpAddr) -> Address {
    match addr {
        IpAddr::V4(v4) => Address::V4(u32::from(v4)),
        IpAddr::V6(v6) => Address::V6(u128::from(v6)),
    }
}

/// Parse a textual IPv4 or IPv6 address.
///
/// # Errors
///
/// Returns [`GateError::InvalidAddress`] if the text is not a valid address
/// of either family.
pub fn parse_address(text: &str) -> GateResult<Address> {
    text.parse::<IpAddr>()
        .map(encode)
        .map_err(|_| GateError::InvalidAddress(text.to_string()))
}

/// Parse `address` or `address/prefix` into a CIDR block.
///
/// A bare address becomes a full-length block (exact host match). The prefix
/// length is validated against the family detected from the address portion.
///
/// # Errors
///
/// Returns [`GateError::InvalidCidr`] for any malformed `address/prefix`
/// form, and [`GateError::InvalidAddress`] for a bare entry that is not a
/// valid address.
pub fn parse_cidr(text: &str) -> GateResult<CidrBlock> {
    let Some((addr_str, prefix_str)) = text.split_once('/') else {
        return Ok(CidrBlock::host(parse_address(text)?));
    };

    let prefix_len: u8 = prefix_str
        .parse()
        .map_err(|_| GateError::InvalidCidr(format!("invalid prefix length in '{text}'")))?;

    let addr = parse_address(addr_str)
        .map_err(|_| GateError::InvalidCidr(format!("invalid address in '{text}'")))?;

    CidrBlock::new(addr, prefix_len)
}

/// One entry in an allow list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowEntry {
    /// An address or CIDR string, e.g. `"10.0.0.0/24"`.
    Literal(String),

    /// A structured address (exact host match).
    Addr(IpAddr),

    /// A nested group of entries, flattened in order.
    Group(Vec<AllowEntry>),
}

impl From<&str> for AllowEntry {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_string())
    }
}

impl From<String> for AllowEntry {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl From<IpAddr> for AllowEntry {
    fn from(addr: IpAddr) -> Self {
        Self::Addr(addr)
    }
}

/// Allow-list data in one of its accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowData {
    /// A single comma-delimited string; entries are trimmed before parsing.
    Delimited(String),

    /// An ordered sequence of entries.
    Entries(Vec<AllowEntry>),
}

/// Parse allow-list data into an ordered sequence of CIDR blocks.
///
/// Nested groups are flattened into one flat sequence, preserving relative
/// order and duplicates. The first entry that fails to parse aborts the
/// whole parse; partial results are never returned.
///
/// # Errors
///
/// Propagates [`GateError::InvalidAddress`] / [`GateError::InvalidCidr`]
/// from the failing entry.
pub fn parse_list(data: &AllowData) -> GateResult<Vec<CidrBlock>> {
    let mut blocks = Vec::new();
    match data {
        AllowData::Delimited(text) => {
            for entry in text.split(',') {
                blocks.push(parse_cidr(entry.trim())?);
            }
        },
        AllowData::Entries(entries) => {
            collect_entries(entries, &mut blocks)?;
        },
    }
    Ok(blocks)
}

fn collect_entries(entries: &[AllowEntry], blocks: &mut Vec<CidrBlock>) -> GateResult<()> {
    for entry in entries {
        match entry {
            AllowEntry::Literal(text) => blocks.push(parse_cidr(text)?),
            AllowEntry::Addr(addr) => blocks.push(CidrBlock::host(encode(*addr))),
            AllowEntry::Group(group) => collect_entries(group, blocks)?,
        }
    }
    Ok(())
}
