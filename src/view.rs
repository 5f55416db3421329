//! Read-only snapshots for presentation
//!
//! A [`Frame`] is taken after a tick completes and carries everything a
//! renderer needs. [`render_text`] is the built-in renderer: it rasterizes a
//! frame onto a character grid for terminals and logs.

use serde::Serialize;

use crate::book::Side;
use crate::consts::*;
use crate::format_price;
use crate::session::{GameSession, Mode, NotificationSink};
use crate::sim::{Ball, Block, Paddle, Rect};

/// Tower as the presentation layer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TowerView {
    pub x: f32,
    pub side: Side,
    pub price: f64,
    pub remaining: usize,
    /// None once the tower is cleared
    pub label: Option<String>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub mode: Mode,
    pub symbol: &'static str,
    pub score: u64,
    pub level: u32,
    pub lives: u8,
    pub blocks_remaining: usize,
    pub reference_price: f64,
    pub ball: Ball,
    pub paddle: Paddle,
    pub blocks: Vec<Block>,
    pub towers: Vec<TowerView>,
}

impl Frame {
    /// Snapshot everything a renderer needs from the session
    pub fn capture<S: NotificationSink>(session: &GameSession<S>) -> Self {
        let world = session.world();
        Self {
            mode: session.mode(),
            symbol: session.symbol().ticker(),
            score: session.score(),
            level: session.level(),
            lives: session.lives(),
            blocks_remaining: world.blocks_remaining(),
            reference_price: world.reference_price,
            ball: world.ball.clone(),
            paddle: world.paddle.clone(),
            blocks: world.blocks.clone(),
            towers: world
                .towers
                .iter()
                .map(|t| TowerView {
                    x: t.x,
                    side: t.side,
                    price: t.price,
                    remaining: t.remaining(),
                    label: t.label(),
                })
                .collect(),
        }
    }
}

/// Canvas pixels per character cell
const CELL_WIDTH: f32 = 10.0;
const CELL_HEIGHT: f32 = 20.0;

/// Draw a frame as text, one line of HUD followed by the playfield
pub fn render_text(frame: &Frame) -> String {
    let cols = (CANVAS_WIDTH / CELL_WIDTH) as usize;
    let rows = (CANVAS_HEIGHT / CELL_HEIGHT) as usize;
    let mut grid = vec![vec![' '; cols]; rows];

    // Section dividers down to just above the paddle
    let divider_rows = ((PADDLE_Y - 40.0) / CELL_HEIGHT) as usize;
    for x in [BID_SECTION_START + BID_SECTION_WIDTH, ASK_SECTION_START] {
        let col = (x / CELL_WIDTH) as usize;
        for row in grid.iter_mut().take(divider_rows) {
            if let Some(cell) = row.get_mut(col) {
                *cell = ':';
            }
        }
    }

    for block in &frame.blocks {
        let glyph = match block.side {
            Side::Bid => 'B',
            Side::Ask => 'A',
        };
        fill(&mut grid, &block.rect, glyph);
    }
    fill(&mut grid, &frame.paddle.rect(), '=');

    let bx = (frame.ball.pos.x / CELL_WIDTH).floor();
    let by = (frame.ball.pos.y / CELL_HEIGHT).floor();
    if bx >= 0.0 && by >= 0.0 {
        if let Some(cell) = grid.get_mut(by as usize).and_then(|r| r.get_mut(bx as usize)) {
            *cell = 'o';
        }
    }

    let mut out = format!(
        "{} {}  score {}  level {}  lives {}  blocks {}  [{}]\n",
        frame.symbol,
        format_price(frame.reference_price),
        frame.score,
        frame.level,
        frame.lives,
        frame.blocks_remaining,
        frame.mode.as_str()
    );
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

fn fill(grid: &mut [Vec<char>], rect: &Rect, glyph: char) {
    let c0 = (rect.x / CELL_WIDTH).floor().max(0.0) as usize;
    let c1 = (rect.right() / CELL_WIDTH).ceil().max(0.0) as usize;
    let r0 = (rect.y / CELL_HEIGHT).floor().max(0.0) as usize;
    let r1 = (rect.bottom() / CELL_HEIGHT).ceil().max(0.0) as usize;
    for row in grid.iter_mut().take(r1).skip(r0) {
        let end = c1.min(row.len());
        for cell in row.iter_mut().take(end).skip(c0) {
            *cell = glyph;
        }
    }
}
