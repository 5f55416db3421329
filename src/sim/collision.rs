//! Collision detection and response
//!
//! Everything here is axis-aligned: the ball is a circle, blocks and the
//! paddle are rectangles, the canvas has three solid walls and an open floor.
//! Screen coordinates: origin top-left, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_BOUNCE_ANGLE_DEG;

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Rectangle from its top-left corner and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Point of the rectangle nearest to `p` (p itself when inside)
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.x, self.right()), p.y.clamp(self.y, self.bottom()))
    }
}

/// Check whether a ball overlaps a rectangle
///
/// Clamps the ball center onto the rectangle and compares the distance to
/// that closest point against the radius. Touching exactly is not a hit.
pub fn ball_rect_collision(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce off the left, right and top walls
///
/// The ball bounces once its extent passes a wall; resting exactly against
/// one is not a bounce. A wall only reflects a ball that is moving into it,
/// so a ball that is still overlapping after a bounce does not get flipped
/// back.
pub fn ball_wall_collision(pos: Vec2, vel: Vec2, radius: f32, width: f32) -> Vec2 {
    let mut vel = vel;
    if pos.x - radius < 0.0 && vel.x < 0.0 {
        vel = reflect_velocity(vel, Vec2::X);
    } else if pos.x + radius > width && vel.x > 0.0 {
        vel = reflect_velocity(vel, Vec2::NEG_X);
    }
    if pos.y - radius < 0.0 && vel.y < 0.0 {
        vel = reflect_velocity(vel, Vec2::Y);
    }
    vel
}

/// Where along the paddle the ball struck, 0.0 (left edge) to 1.0 (right edge)
pub fn paddle_hit_offset(ball_x: f32, paddle: &Rect) -> f32 {
    ((ball_x - paddle.x) / paddle.width).clamp(0.0, 1.0)
}

/// Launch angle from vertical for a hit offset, in radians
///
/// Linear from -60° at the left edge through 0° at the center to +60°.
pub fn paddle_launch_angle(offset: f32) -> f32 {
    (offset - 0.5) * 2.0 * MAX_BOUNCE_ANGLE_DEG.to_radians()
}

/// New ball velocity after a paddle hit
///
/// Keeps the current speed, always heads upward.
pub fn paddle_bounce_velocity(velocity: Vec2, offset: f32) -> Vec2 {
    let speed = velocity.length();
    let angle = paddle_launch_angle(offset);
    Vec2::new(speed * angle.sin(), -speed * angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_ball_inside_rect_hits() {
        let rect = Rect::new(100.0, 100.0, 25.0, 25.0);
        assert!(ball_rect_collision(Vec2::new(110.0, 110.0), 8.0, &rect));
    }

    #[test]
    fn test_ball_near_edge() {
        let rect = Rect::new(100.0, 100.0, 25.0, 25.0);
        // 5px left of the rectangle, radius 8
        assert!(ball_rect_collision(Vec2::new(95.0, 110.0), 8.0, &rect));
        // 10px left, out of reach
        assert!(!ball_rect_collision(Vec2::new(90.0, 110.0), 8.0, &rect));
        // Diagonal from the corner: distance sqrt(50) ≈ 7.07 < 8
        assert!(ball_rect_collision(Vec2::new(95.0, 95.0), 8.0, &rect));
        // Diagonal: distance sqrt(72) ≈ 8.49 > 8
        assert!(!ball_rect_collision(Vec2::new(94.0, 94.0), 8.0, &rect));
    }

    #[test]
    fn test_reflect_velocity() {
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_wall_bounces() {
        let width = 800.0;
        // Left wall
        let v = ball_wall_collision(Vec2::new(5.0, 300.0), Vec2::new(-3.0, 2.0), 8.0, width);
        assert_eq!(v, Vec2::new(3.0, 2.0));
        // Right wall
        let v = ball_wall_collision(Vec2::new(795.0, 300.0), Vec2::new(3.0, 2.0), 8.0, width);
        assert_eq!(v, Vec2::new(-3.0, 2.0));
        // Top wall
        let v = ball_wall_collision(Vec2::new(400.0, 4.0), Vec2::new(3.0, -3.0), 8.0, width);
        assert_eq!(v, Vec2::new(3.0, 3.0));
        // Already leaving the wall: untouched
        let v = ball_wall_collision(Vec2::new(5.0, 300.0), Vec2::new(3.0, 2.0), 8.0, width);
        assert_eq!(v, Vec2::new(3.0, 2.0));
    }

    #[test]
    fn test_touching_wall_does_not_bounce() {
        let width = 800.0;
        // Extent exactly on each wall
        let v = ball_wall_collision(Vec2::new(8.0, 300.0), Vec2::new(-3.0, 2.0), 8.0, width);
        assert_eq!(v, Vec2::new(-3.0, 2.0));
        let v = ball_wall_collision(Vec2::new(792.0, 300.0), Vec2::new(3.0, 2.0), 8.0, width);
        assert_eq!(v, Vec2::new(3.0, 2.0));
        let v = ball_wall_collision(Vec2::new(400.0, 8.0), Vec2::new(3.0, -3.0), 8.0, width);
        assert_eq!(v, Vec2::new(3.0, -3.0));

        // One step further and it bounces
        let v = ball_wall_collision(Vec2::new(5.0, 300.0), Vec2::new(-3.0, 2.0), 8.0, width);
        assert_eq!(v, Vec2::new(3.0, 2.0));
    }

    #[test]
    fn test_paddle_angle_mapping() {
        assert!((paddle_launch_angle(0.0) - (-60f32).to_radians()).abs() < EPS);
        assert!(paddle_launch_angle(0.5).abs() < EPS);
        assert!((paddle_launch_angle(1.0) - 60f32.to_radians()).abs() < EPS);

        // Center hit goes straight up
        let v = paddle_bounce_velocity(Vec2::new(3.0, 3.0), 0.5);
        assert!(v.x.abs() < EPS);
        assert!(v.y < 0.0);
    }

    #[test]
    fn test_paddle_hit_offset_clamps() {
        let paddle = Rect::new(350.0, 560.0, 100.0, 20.0);
        assert_eq!(paddle_hit_offset(350.0, &paddle), 0.0);
        assert_eq!(paddle_hit_offset(400.0, &paddle), 0.5);
        assert_eq!(paddle_hit_offset(450.0, &paddle), 1.0);
        assert_eq!(paddle_hit_offset(500.0, &paddle), 1.0);
    }

    proptest! {
        #[test]
        fn prop_wall_bounce_preserves_speed(
            x in -20.0f32..820.0,
            y in -20.0f32..600.0,
            dx in -10.0f32..10.0,
            dy in -10.0f32..10.0,
        ) {
            let vel = Vec2::new(dx, dy);
            let out = ball_wall_collision(Vec2::new(x, y), vel, 8.0, 800.0);
            prop_assert!((out.length() - vel.length()).abs() < EPS);
        }

        #[test]
        fn prop_paddle_bounce_preserves_speed_and_goes_up(
            offset in 0.0f32..=1.0,
            dx in -10.0f32..10.0,
            dy in 0.1f32..10.0,
        ) {
            let vel = Vec2::new(dx, dy);
            let out = paddle_bounce_velocity(vel, offset);
            prop_assert!((out.length() - vel.length()).abs() < EPS);
            prop_assert!(out.y < 0.0);
        }

        #[test]
        fn prop_paddle_angle_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            if a < b {
                prop_assert!(paddle_launch_angle(a) <= paddle_launch_angle(b));
            }
        }

        #[test]
        fn prop_center_inside_rect_hits(
            fx in 0.01f32..0.99,
            fy in 0.01f32..0.99,
            radius in 0.5f32..20.0,
        ) {
            let rect = Rect::new(40.0, 40.0, 25.0, 25.0);
            let center = Vec2::new(rect.x + fx * rect.width, rect.y + fy * rect.height);
            prop_assert!(ball_rect_collision(center, radius, &rect));
        }

        #[test]
        fn prop_far_ball_misses(gap in 0.01f32..100.0, radius in 0.5f32..20.0) {
            let rect = Rect::new(40.0, 40.0, 25.0, 25.0);
            let center = Vec2::new(rect.right() + radius + gap, rect.y + 10.0);
            prop_assert!(!ball_rect_collision(center, radius, &rect));
        }
    }
}
