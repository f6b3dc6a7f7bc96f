//! # Light Store
//!
//! Verified light blocks by height. Only blocks that passed verification
//! from an already trusted block are inserted.

use super::light_block::LightBlock;
use std::collections::BTreeMap;

/// Store of verified light blocks.
#[derive(Debug, Default)]
pub struct LightStore {
    blocks: BTreeMap<i64, LightBlock>,
}

impl LightStore {
    /// Store rooted at a trust anchor.
    pub fn with_anchor(anchor: LightBlock) -> Self {
        let mut store = Self::default();
        store.insert(anchor);
        store
    }

    /// Insert a verified block.
    pub fn insert(&mut self, block: LightBlock) {
        self.blocks.insert(block.height(), block);
    }

    /// Verified block at `height`.
    pub fn get(&self, height: i64) -> Option<&LightBlock> {
        self.blocks.get(&height)
    }

    /// Highest verified block.
    pub fn highest(&self) -> Option<&LightBlock> {
        self.blocks.values().next_back()
    }

    /// Lowest verified block.
    pub fn lowest(&self) -> Option<&LightBlock> {
        self.blocks.values().next()
    }

    /// Highest verified block at or below `height`.
    pub fn highest_at_or_below(&self, height: i64) -> Option<&LightBlock> {
        self.blocks.range(..=height).next_back().map(|(_, b)| b)
    }

    /// Drop blocks outside the trusting period, then keep the lowest
    /// remaining block and the newest `keep - 1`. The highest block is
    /// never dropped.
    pub fn prune(&mut self, keep: usize, now: u64, trusting_period_secs: u64) {
        let Some(highest) = self.highest().map(LightBlock::height) else {
            return;
        };
        self.blocks.retain(|&height, block| {
            height == highest || block.header().time.saturating_add(trusting_period_secs) > now
        });

        let keep = keep.max(2);
        while self.blocks.len() > keep {
            let Some(second) = self.blocks.keys().nth(1).copied() else {
                break;
            };
            self.blocks.remove(&second);
        }
    }

    /// Number of stored blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
