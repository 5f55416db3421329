//! Per-tick simulation step
//!
//! One call advances the world by one display frame. Movement is in pixels
//! per tick with a single Euler step; there is no substepping.

use super::collision::{
    ball_rect_collision, ball_wall_collision, paddle_bounce_velocity, paddle_hit_offset,
};
use super::state::{GameEvent, World};
use crate::consts::*;

/// Held-key state sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

/// What the session needs to react to after a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TickOutcome {
    #[default]
    Continue,
    /// The block field is empty
    LevelCleared,
    /// The ball fell past the bottom edge
    BallLost,
}

/// Everything a tick produced
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Score earned this tick
    pub points: u64,
    pub outcome: TickOutcome,
}

/// Advance the world by one tick
pub fn tick(world: &mut World, input: &TickInput) -> TickReport {
    let mut report = TickReport::default();

    world.paddle.steer(input.left, input.right);

    let ball = &mut world.ball;
    ball.pos += ball.vel;
    ball.vel = ball_wall_collision(ball.pos, ball.vel, ball.radius, CANVAS_WIDTH);

    // Paddle: only a falling ball can be caught, so a ball still inside the
    // paddle band on its way up is left alone
    let paddle = world.paddle.rect();
    if ball.bottom() >= paddle.y
        && ball.pos.x >= paddle.x
        && ball.pos.x <= paddle.right()
        && ball.vel.y > 0.0
    {
        let offset = paddle_hit_offset(ball.pos.x, &paddle);
        ball.vel = paddle_bounce_velocity(ball.vel, offset);
        report.events.push(GameEvent::PaddleHit { offset });
    }

    // Blocks: at most one per tick
    let (center, radius) = (ball.pos, ball.radius);
    if let Some(idx) = world
        .blocks
        .iter()
        .position(|b| ball_rect_collision(center, radius, &b.rect))
    {
        let block = world.remove_block(idx);
        let points = block.points();
        report.points += points;
        world.ball.vel.y = -world.ball.vel.y;
        report.events.push(GameEvent::BlockDestroyed {
            id: block.id,
            tower: block.tower,
            points,
        });
    }

    if world.blocks.is_empty() {
        report.events.push(GameEvent::LevelCleared);
        report.outcome = TickOutcome::LevelCleared;
        return report;
    }

    if world.ball.pos.y > CANVAS_HEIGHT + OUT_OF_BOUNDS_MARGIN {
        report.events.push(GameEvent::BallLost);
        report.outcome = TickOutcome::BallLost;
    }

    report
}
