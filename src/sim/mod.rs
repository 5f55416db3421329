//! Simulation engine
//!
//! All gameplay physics lives here. This module is deterministic given its
//! seed and inputs:
//! - One fixed step per tick
//! - Seeded RNG only
//! - Stable iteration order (blocks by id)
//! - No rendering, timing or I/O

pub mod collision;
pub mod state;
pub mod tick;
pub mod towers;

pub use collision::{Rect, ball_rect_collision};
pub use state::{Ball, Block, GameEvent, Paddle, Tower, World};
pub use tick::{TickInput, TickOutcome, TickReport, tick};
pub use towers::{SectionLayout, TowerLayout, TowerSet, build_towers};
