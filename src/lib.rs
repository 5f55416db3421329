//! Book Breaker - a breakout arcade game built from a market order book
//!
//! Core modules:
//! - `sim`: Simulation engine (ball/paddle kinematics, collisions, towers)
//! - `session`: Game state machine (menu, loading, playing, level flow)
//! - `book`: Order-book snapshots, sources and the synthetic fallback
//! - `view`: Read-only snapshots and the text renderer
//! - `autopilot`: Demo-mode paddle control
//! - `settings`, `highscores`: JSON-backed preferences and leaderboard

pub mod autopilot;
pub mod book;
pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;
pub mod symbol;
pub mod view;

pub use highscores::HighScores;
pub use session::{GameSession, Mode};
pub use settings::Settings;
pub use symbol::Symbol;

/// Game configuration constants
pub mod consts {
    /// Canvas dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Vertical layout
    pub const TOP_MARGIN: f32 = 40.0;
    pub const PADDLE_Y: f32 = 560.0;
    /// How far below the canvas the ball may travel before a life is lost
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 20.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    /// Pixels per tick
    pub const PADDLE_SPEED: f32 = 8.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Per-axis launch speed (pixels per tick)
    pub const BALL_SPEED: f32 = 3.0;
    /// Ball spawns this far above the paddle
    pub const BALL_SPAWN_HEIGHT: f32 = 30.0;
    /// Maximum paddle deflection either side of vertical (degrees)
    pub const MAX_BOUNCE_ANGLE_DEG: f32 = 60.0;

    /// Block defaults
    pub const BLOCK_WIDTH: f32 = 25.0;
    pub const BLOCK_HEIGHT: f32 = 25.0;
    pub const BLOCK_SPACING: f32 = 2.0;
    /// Quantity represented by one block, also its score weight
    pub const BASE_BLOCK_VALUE: f64 = 0.1;
    pub const MAX_BLOCKS_PER_TOWER: usize = 12;

    /// Tower defaults
    pub const TOWER_WIDTH: f32 = 30.0;
    pub const TOWER_SPACING: f32 = 8.0;
    pub const MAX_TOWERS: usize = 8;

    /// Bid section (left)
    pub const BID_SECTION_START: f32 = 0.0;
    pub const BID_SECTION_WIDTH: f32 = 350.0;
    pub const BID_TOWERS_START: f32 = 27.0;

    /// Ask section (right)
    pub const ASK_SECTION_START: f32 = 450.0;
    pub const ASK_SECTION_WIDTH: f32 = 350.0;
    pub const ASK_TOWERS_START: f32 = 477.0;

    /// Session defaults
    pub const STARTING_LIVES: u8 = 3;
    pub const FETCH_TIMEOUT_MS: u64 = 3000;
    pub const LEVEL_COMPLETE_DELAY_MS: u64 = 2000;
}

/// Format a price the way tower labels show it
///
/// Prices above 1 get cents, sub-unit prices keep six decimals.
pub fn format_price(price: f64) -> String {
    if price > 1.0 {
        format!("${:.2}", price)
    } else {
        format!("${:.6}", price)
    }
}
