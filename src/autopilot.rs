//! Demo-mode player
//!
//! Steers the paddle toward where the ball will cross the paddle line,
//! folding the path off the side walls. A slow oscillating offset moves the
//! contact point along the paddle so rallies don't settle into a loop.

use crate::consts::*;
use crate::sim::{TickInput, World};

/// Produces paddle input from the current world
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    ticks: u64,
}

impl Autopilot {
    /// Starts at tick zero of its sway cycle
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide this tick's input
    pub fn input(&mut self, world: &World) -> TickInput {
        self.ticks = self.ticks.wrapping_add(1);

        let time_factor = self.ticks as f32 * 0.01;
        let wobble = time_factor.sin() * 0.3 + (time_factor * 0.7).sin() * 0.15;
        let offset = wobble * world.paddle.width / 2.0;

        let target = predict_landing_x(world) + offset;
        let center = world.paddle.pos.x + world.paddle.width / 2.0;
        let deadzone = PADDLE_SPEED / 2.0;

        TickInput {
            left: center > target + deadzone,
            right: center < target - deadzone,
        }
    }
}

/// Where the ball will be when it reaches the paddle line
///
/// A rising ball is simply tracked.
pub fn predict_landing_x(world: &World) -> f32 {
    let ball = &world.ball;
    if ball.vel.y <= 0.0 {
        return ball.pos.x;
    }
    let drop = world.paddle.pos.y - ball.radius - ball.pos.y;
    if drop <= 0.0 {
        return ball.pos.x;
    }
    let x = ball.pos.x + ball.vel.x * (drop / ball.vel.y);
    fold_between(x, ball.radius, CANVAS_WIDTH - ball.radius)
}

/// Reflect `x` back into `[lo, hi]` as many times as needed
fn fold_between(x: f32, lo: f32, hi: f32) -> f32 {
    let span = hi - lo;
    if span <= 0.0 {
        return lo;
    }
    let u = (x - lo).rem_euclid(2.0 * span);
    lo + if u > span { 2.0 * span - u } else { u }
}
