//! Ordered collections of CIDR blocks.

use super::codec::{self, Address, AllowData, CidrBlock};
use super::error::GateResult;

/// An ordered collection of CIDR blocks with a containment test.
///
/// Duplicates are permitted and order is preserved; containment does not
/// depend on order. An empty set contains nothing (default-deny).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSet {
    blocks: Vec<CidrBlock>,
}

impl BlockSet {
    /// Create an empty block set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block set from already-parsed blocks.
    #[must_use]
    pub fn from_blocks(blocks: Vec<CidrBlock>) -> Self {
        Self { blocks }
    }

    /// Parse allow-list data into a block set.
    ///
    /// # Errors
    ///
    /// Propagates parse errors from the first failing entry.
    pub fn parse(data: &AllowData) -> GateResult<Self> {
        Ok(Self::from_blocks(codec::parse_list(data)?))
    }

    /// Whether the address falls inside any block in the set.
    ///
    /// Short-circuits on the first match; cross-family blocks never match.
    #[must_use]
    pub fn contains(&self, addr: &Address) -> bool {
        self.blocks.iter().any(|block| block.matches(addr))
    }

    /// The blocks in the set, in order.
    #[must_use]
    pub fn blocks(&self) -> &[CidrBlock] {
        &self.blocks
    }

    /// Number of blocks in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the set holds no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Produce an equivalent set that is cheaper to scan.
    ///
    /// Deduplicates, drops blocks covered by a broader block, and orders
    /// broad-before-narrow so the linear scan short-circuits sooner.
    /// Containment behavior is identical to the original set for every
    /// address.
    #[must_use]
    pub fn optimize(&self) -> Self {
        let mut sorted = self.blocks.clone();
        sorted.sort_by_key(CidrBlock::prefix_len);

        let mut kept: Vec<CidrBlock> = Vec::with_capacity(sorted.len());
        for block in sorted {
            if !kept.iter().any(|k| k.covers(&block)) {
                kept.push(block);
            }
        }

        Self { blocks: kept }
    }
}
