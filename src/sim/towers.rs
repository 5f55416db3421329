//! Turning an order book into a block field
//!
//! Each side of the book fills its own section of the canvas. Level `i` of
//! a side becomes tower `i` in that section, one block per
//! `base_block_value` of quantity, stacked down from the top margin.

use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::{Block, Tower};
use crate::book::{OrderBookSnapshot, Side};
use crate::consts::*;

/// Horizontal bounds of one side's section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub start: f32,
    pub width: f32,
    /// x of the first tower
    pub towers_start: f32,
}

impl SectionLayout {
    pub fn end(&self) -> f32 {
        self.start + self.width
    }
}

/// Layout and capacity constants for tower construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerLayout {
    pub bid: SectionLayout,
    pub ask: SectionLayout,
    pub tower_width: f32,
    pub tower_spacing: f32,
    pub max_towers: usize,
    pub block_width: f32,
    pub block_height: f32,
    pub block_spacing: f32,
    pub top_margin: f32,
    pub base_block_value: f64,
    pub max_blocks_per_tower: usize,
}

impl Default for TowerLayout {
    fn default() -> Self {
        Self {
            bid: SectionLayout {
                start: BID_SECTION_START,
                width: BID_SECTION_WIDTH,
                towers_start: BID_TOWERS_START,
            },
            ask: SectionLayout {
                start: ASK_SECTION_START,
                width: ASK_SECTION_WIDTH,
                towers_start: ASK_TOWERS_START,
            },
            tower_width: TOWER_WIDTH,
            tower_spacing: TOWER_SPACING,
            max_towers: MAX_TOWERS,
            block_width: BLOCK_WIDTH,
            block_height: BLOCK_HEIGHT,
            block_spacing: BLOCK_SPACING,
            top_margin: TOP_MARGIN,
            base_block_value: BASE_BLOCK_VALUE,
            max_blocks_per_tower: MAX_BLOCKS_PER_TOWER,
        }
    }
}

impl TowerLayout {
    pub fn section(&self, side: Side) -> &SectionLayout {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }

    /// Blocks a level of this quantity is worth, capped
    pub fn block_count(&self, quantity: f64) -> usize {
        // NaN and negatives saturate to zero
        let count = (quantity / self.base_block_value).floor() as usize;
        count.min(self.max_blocks_per_tower)
    }

    /// x of the tower at `rank`, or None if it would overflow the section
    pub fn tower_x(&self, side: Side, rank: usize) -> Option<f32> {
        let section = self.section(side);
        let x = section.towers_start + rank as f32 * (self.tower_width + self.tower_spacing);
        (x + self.tower_width <= section.end()).then_some(x)
    }
}

/// Output of the builder, ready to load into a world
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TowerSet {
    pub towers: Vec<Tower>,
    pub blocks: Vec<Block>,
    pub total_blocks: usize,
}

/// Build the towers and blocks for a snapshot
///
/// Bids first, then asks. Levels too thin for a single block, or past the
/// section edge, get no tower at all. Block ids start at 1 and follow build
/// order, so identical snapshots produce identical sets.
pub fn build_towers(snapshot: &OrderBookSnapshot, layout: &TowerLayout) -> TowerSet {
    let mut set = TowerSet::default();
    let mut next_id = 1u32;

    for side in [Side::Bid, Side::Ask] {
        let levels = snapshot.side(side).iter().take(layout.max_towers);
        for (rank, level) in levels.enumerate() {
            let count = layout.block_count(level.quantity);
            if count == 0 {
                continue;
            }
            let Some(x) = layout.tower_x(side, rank) else {
                continue;
            };

            let tower_idx = set.towers.len();
            let mut tower = Tower {
                x,
                side,
                price: level.price,
                rank,
                blocks: Vec::with_capacity(count),
            };

            for index in 0..count {
                let y = layout.top_margin
                    + index as f32 * (layout.block_height + layout.block_spacing);
                let block = Block {
                    id: next_id,
                    rect: Rect::new(x, y, layout.block_width, layout.block_height),
                    price: level.price,
                    value: layout.base_block_value,
                    side,
                    tower: tower_idx,
                    index,
                };
                next_id += 1;
                tower.blocks.push(block.id);
                set.blocks.push(block);
                set.total_blocks += 1;
            }

            set.towers.push(tower);
        }
    }

    log::debug!(
        "Built {} towers ({} blocks) for {}",
        set.towers.len(),
        set.total_blocks,
        snapshot.symbol
    );
    set
}
