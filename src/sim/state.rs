//! Simulation entities and the world that owns them
//!
//! The world holds exactly one level's worth of state: the ball, the paddle
//! and the block field. Session-wide counters (score, lives, level) live in
//! [`crate::session`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::towers::TowerSet;
use crate::book::Side;
use crate::consts::*;
use crate::format_price;

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Center
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    /// A ball at the spawn point, launched up and to the right
    pub fn new() -> Self {
        Self {
            pos: Self::spawn_point(),
            vel: Vec2::new(BALL_SPEED, -BALL_SPEED),
            radius: BALL_RADIUS,
        }
    }

    /// Centered horizontally, just above the paddle
    pub fn spawn_point() -> Vec2 {
        Vec2::new(CANVAS_WIDTH / 2.0, PADDLE_Y - BALL_SPAWN_HEIGHT)
    }

    /// Put the ball back at the spawn point, heading up in a random direction
    pub fn reset(&mut self, rng: &mut Pcg32) {
        let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.pos = Self::spawn_point();
        self.vel = Vec2::new(BALL_SPEED * dir, -BALL_SPEED);
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec2::new((CANVAS_WIDTH - PADDLE_WIDTH) / 2.0, PADDLE_Y),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    /// Bounding box, top-left at `pos`
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Back to the centre of the bottom edge
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Step left/right at constant speed, staying on the canvas
    pub fn steer(&mut self, left: bool, right: bool) {
        if left && self.pos.x > 0.0 {
            self.pos.x -= PADDLE_SPEED;
        }
        if right && self.pos.x + self.width < CANVAS_WIDTH {
            self.pos.x += PADDLE_SPEED;
        }
        self.pos.x = self.pos.x.clamp(0.0, CANVAS_WIDTH - self.width);
    }
}

/// A destructible block, one unit of quantity at a price level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub rect: Rect,
    /// Price of the level this block came from
    pub price: f64,
    /// Score weight
    pub value: f64,
    pub side: Side,
    /// Position of the owning tower in the world's tower list
    pub tower: usize,
    /// Position within the tower, 0 = top
    pub index: usize,
}

impl Block {
    /// Points awarded for destroying this block
    pub fn points(&self) -> u64 {
        (self.price * self.value * 100.0).floor() as u64
    }
}

/// A vertical stack of blocks at one price level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    pub x: f32,
    pub side: Side,
    pub price: f64,
    /// Position in the book, 0 = best price on this side
    pub rank: usize,
    /// Remaining block ids, top to bottom
    pub blocks: Vec<u32>,
}

impl Tower {
    /// Blocks still standing in this tower
    pub fn remaining(&self) -> usize {
        self.blocks.len()
    }

    /// A cleared tower keeps its slot but loses its label
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Price label, hidden once the tower is cleared
    pub fn label(&self) -> Option<String> {
        (!self.is_empty()).then(|| format_price(self.price))
    }
}

/// Things that happened during a tick (for UI, audio, logging)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PaddleHit { offset: f32 },
    BlockDestroyed { id: u32, tower: usize, points: u64 },
    LevelCleared,
    BallLost,
}

/// One level's simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub ball: Ball,
    pub paddle: Paddle,
    /// Live blocks in stable (id) order
    pub blocks: Vec<Block>,
    /// Every tower built this level, including cleared ones
    pub towers: Vec<Tower>,
    /// Price shown between the bid and ask sections
    pub reference_price: f64,
    /// Blocks the level started with
    pub total_blocks: usize,
    rng: Pcg32,
}

impl World {
    /// Create an empty world; the seed drives ball launch directions
    pub fn new(seed: u64) -> Self {
        Self {
            ball: Ball::new(),
            paddle: Paddle::default(),
            blocks: Vec::new(),
            towers: Vec::new(),
            reference_price: 0.0,
            total_blocks: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Replace the block field wholesale and reset ball and paddle
    pub fn load_level(&mut self, set: TowerSet, reference_price: f64) {
        self.blocks = set.blocks;
        self.towers = set.towers;
        self.total_blocks = set.total_blocks;
        self.reference_price = reference_price;
        self.reset_ball_and_paddle();
    }

    /// Serve a fresh ball; blocks are untouched
    pub fn reset_ball_and_paddle(&mut self) {
        self.paddle.reset();
        self.ball.reset(&mut self.rng);
    }

    pub fn blocks_remaining(&self) -> usize {
        self.blocks.len()
    }

    /// Remove a block from the field and from its tower
    pub fn remove_block(&mut self, idx: usize) -> Block {
        let block = self.blocks.remove(idx);
        if let Some(tower) = self.towers.get_mut(block.tower) {
            tower.blocks.retain(|&id| id != block.id);
        }
        block
    }
}
