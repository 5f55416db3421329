//! Game state machine
//!
//! A [`GameSession`] owns everything that outlives a single level (mode,
//! score, level, lives, symbol) plus the [`World`] for the current level. It
//! never does I/O or sleeps. Loading is split in two: the session hands out
//! a [`LoadRequest`], the driver acquires a snapshot however it likes, then
//! passes the result to [`GameSession::finish_loading`]. The post-level
//! delay is an [`Alarm`] the driver polls with its own clock.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::book::{Provenance, SnapshotLoad};
use crate::consts::STARTING_LIVES;
use crate::settings::Settings;
use crate::sim::{GameEvent, TickInput, TickOutcome, TickReport, TowerLayout, World};
use crate::symbol::Symbol;

/// Current mode of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Waiting for the first start
    Menu,
    /// Waiting for an order-book snapshot
    Loading,
    /// Simulation running
    Playing,
    /// Simulation frozen, state preserved
    Paused,
    /// Out of lives, waiting for restart
    GameOver,
    /// All blocks gone, next level loads after a delay
    LevelComplete,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Menu => "menu",
            Mode::Loading => "loading",
            Mode::Playing => "playing",
            Mode::Paused => "paused",
            Mode::GameOver => "gameOver",
            Mode::LevelComplete => "levelComplete",
        }
    }

    /// Which start/pause controls are usable in this mode
    pub fn controls(&self) -> Controls {
        match self {
            Mode::Playing => Controls {
                start_enabled: false,
                pause_enabled: true,
                pause_label: "Pause",
            },
            Mode::Paused => Controls {
                start_enabled: false,
                pause_enabled: true,
                pause_label: "Resume",
            },
            _ => Controls {
                start_enabled: true,
                pause_enabled: false,
                pause_label: "Pause",
            },
        }
    }
}

/// Enablement of the start and pause buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub pause_label: &'static str,
}

/// Overlay message the UI should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overlay {
    Loading,
    Paused,
    GameOver { final_score: u64 },
    LevelComplete,
}

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
}

/// HUD counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub score: u64,
    pub level: u32,
    pub lives: u8,
    pub blocks_remaining: usize,
    pub symbol: Symbol,
}

/// Something the UI should reflect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Notification {
    Stats(Stats),
    ModeChanged {
        mode: Mode,
        overlay: Option<Overlay>,
        controls: Controls,
    },
    Status {
        message: String,
        kind: StatusKind,
    },
}

/// Receiver for UI notifications
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, notification: Notification) {
        match notification {
            Notification::Stats(stats) => log::debug!(
                "score={} level={} lives={} blocks={}",
                stats.score,
                stats.level,
                stats.lives,
                stats.blocks_remaining
            ),
            Notification::ModeChanged { mode, overlay, .. } => {
                log::info!("Mode -> {} (overlay {:?})", mode.as_str(), overlay)
            }
            Notification::Status { message, kind } => match kind {
                StatusKind::Warning => log::warn!("{}", message),
                _ => log::info!("{}", message),
            },
        }
    }
}

/// Ask the driver for an order-book snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub symbol: Symbol,
}

/// A scheduled wake-up on the driver's clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm {
    pub due: Duration,
}

impl Alarm {
    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.due
    }
}

/// One player's game, from menu to game over and back
pub struct GameSession<S> {
    mode: Mode,
    score: u64,
    level: u32,
    lives: u8,
    symbol: Symbol,
    final_score: Option<u64>,
    provenance: Option<Provenance>,
    world: World,
    layout: TowerLayout,
    level_delay: Duration,
    alarm: Option<Alarm>,
    sink: S,
}

impl<S: NotificationSink> GameSession<S> {
    /// New session in the menu, announcing its initial stats to `sink`
    pub fn new(settings: &Settings, sink: S) -> Self {
        let mut session = Self {
            mode: Mode::Menu,
            score: 0,
            level: 1,
            lives: STARTING_LIVES,
            symbol: settings.symbol,
            final_score: None,
            provenance: None,
            world: World::new(settings.seed),
            layout: TowerLayout::default(),
            level_delay: settings.level_delay(),
            alarm: None,
            sink,
        };
        session.notify_stats();
        session.status("Ready to start game", StatusKind::Info);
        session
    }

    /// Override the tower layout used for future levels
    pub fn with_layout(mut self, layout: TowerLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Score recorded at the last game over
    pub fn final_score(&self) -> Option<u64> {
        self.final_score
    }

    /// Provenance of the snapshot the current level was built from
    pub fn provenance(&self) -> Option<Provenance> {
        self.provenance
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for drivers and tests that stage positions
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Pending level-complete alarm
    pub fn alarm(&self) -> Option<Alarm> {
        self.alarm
    }

    /// Where notifications went
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Whether the driver should be calling [`Self::tick`]
    pub fn is_ticking(&self) -> bool {
        self.mode == Mode::Playing
    }

    pub fn stats(&self) -> Stats {
        Stats {
            score: self.score,
            level: self.level,
            lives: self.lives,
            blocks_remaining: self.world.blocks_remaining(),
            symbol: self.symbol,
        }
    }

    /// Pick the symbol for the next snapshot request
    pub fn select_symbol(&mut self, symbol: Symbol) {
        if symbol != self.symbol {
            self.symbol = symbol;
            self.notify_stats();
        }
    }

    /// Start from the menu, or start over after a game over
    pub fn start(&mut self) -> Option<LoadRequest> {
        match self.mode {
            Mode::Menu => Some(self.begin_loading()),
            Mode::GameOver => self.restart(),
            _ => {
                log::debug!("Ignoring start in {}", self.mode.as_str());
                None
            }
        }
    }

    /// Reset score, level and lives, then start
    pub fn restart(&mut self) -> Option<LoadRequest> {
        if !matches!(self.mode, Mode::GameOver | Mode::Menu) {
            log::debug!("Ignoring restart in {}", self.mode.as_str());
            return None;
        }
        self.score = 0;
        self.level = 1;
        self.lives = STARTING_LIVES;
        self.final_score = None;
        self.cancel_alarm();
        self.notify_stats();
        Some(self.begin_loading())
    }

    fn begin_loading(&mut self) -> LoadRequest {
        self.set_mode(Mode::Loading);
        self.status("Fetching orderbook data...", StatusKind::Info);
        LoadRequest {
            symbol: self.symbol,
        }
    }

    /// Build the level from an acquired snapshot and start playing
    ///
    /// Returns false (and drops the load) unless a load was pending.
    pub fn finish_loading(&mut self, load: SnapshotLoad) -> bool {
        if self.mode != Mode::Loading {
            log::debug!("Dropping snapshot, no load pending");
            return false;
        }

        let set = crate::sim::build_towers(&load.snapshot, &self.layout);
        log::info!(
            "Level {}: {} towers, {} blocks from {} ({:?})",
            self.level,
            set.towers.len(),
            set.total_blocks,
            load.snapshot.symbol,
            load.provenance
        );
        self.world.load_level(set, load.snapshot.reference_price);
        self.provenance = Some(load.provenance);

        self.set_mode(Mode::Playing);
        self.notify_stats();
        match (load.provenance, &load.fallback_reason) {
            (Provenance::Real, _) => {
                self.status("Real orderbook data loaded successfully", StatusKind::Success)
            }
            (Provenance::Synthetic, Some(_)) => {
                self.status("Using sample data - API unavailable", StatusKind::Warning)
            }
            (Provenance::Synthetic, None) => self.status("Using sample data", StatusKind::Warning),
        }
        true
    }

    /// Freeze play; ignored outside `Playing`
    pub fn pause(&mut self) {
        if self.mode == Mode::Playing {
            self.set_mode(Mode::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.mode == Mode::Paused {
            self.set_mode(Mode::Playing);
        }
    }

    /// Edge-triggered pause key
    pub fn toggle_pause(&mut self) {
        match self.mode {
            Mode::Playing => self.pause(),
            Mode::Paused => self.resume(),
            _ => log::debug!("Ignoring pause in {}", self.mode.as_str()),
        }
    }

    /// Advance the simulation one tick; `now` is the driver's clock
    ///
    /// Does nothing unless playing.
    pub fn tick(&mut self, input: &TickInput, now: Duration) -> Option<TickReport> {
        if !self.is_ticking() {
            return None;
        }

        let report = crate::sim::tick(&mut self.world, input);
        let destroyed = report
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::BlockDestroyed { .. }));
        self.score += report.points;

        match report.outcome {
            TickOutcome::Continue => {
                if destroyed {
                    self.notify_stats();
                }
            }
            TickOutcome::LevelCleared => self.level_complete(now),
            TickOutcome::BallLost => self.lose_life(),
        }
        Some(report)
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.game_over();
        } else {
            log::info!("Ball lost, {} lives left", self.lives);
            self.world.reset_ball_and_paddle();
            self.notify_stats();
        }
    }

    fn level_complete(&mut self, now: Duration) {
        self.level += 1;
        self.alarm = Some(Alarm {
            due: now + self.level_delay,
        });
        self.set_mode(Mode::LevelComplete);
        self.notify_stats();
    }

    fn game_over(&mut self) {
        self.final_score = Some(self.score);
        log::info!("Game over at level {} with {} points", self.level, self.score);
        self.set_mode(Mode::GameOver);
        self.notify_stats();
    }

    /// Fire the post-level alarm if it is due
    ///
    /// Returns the load request for the next level when it fires.
    pub fn poll_alarm(&mut self, now: Duration) -> Option<LoadRequest> {
        let alarm = self.alarm?;
        if !alarm.is_due(now) {
            return None;
        }
        self.alarm = None;
        (self.mode == Mode::LevelComplete).then(|| self.begin_loading())
    }

    /// Drop any pending alarm
    pub fn cancel_alarm(&mut self) -> Option<Alarm> {
        self.alarm.take()
    }

    fn overlay(&self) -> Option<Overlay> {
        match self.mode {
            Mode::Loading => Some(Overlay::Loading),
            Mode::Paused => Some(Overlay::Paused),
            Mode::GameOver => Some(Overlay::GameOver {
                final_score: self.final_score.unwrap_or(self.score),
            }),
            Mode::LevelComplete => Some(Overlay::LevelComplete),
            Mode::Menu | Mode::Playing => None,
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        let overlay = self.overlay();
        self.sink.notify(Notification::ModeChanged {
            mode,
            overlay,
            controls: mode.controls(),
        });
    }

    fn notify_stats(&mut self) {
        let stats = self.stats();
        self.sink.notify(Notification::Stats(stats));
    }

    fn status(&mut self, message: &str, kind: StatusKind) {
        self.sink.notify(Notification::Status {
            message: message.to_string(),
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{OrderBookSnapshot, PriceLevel};
    use glam::Vec2;

    fn session() -> GameSession<Vec<Notification>> {
        GameSession::new(&Settings::default(), Vec::new())
    }

    fn load(bids: &[(f64, f64)], provenance: Provenance) -> SnapshotLoad {
        SnapshotLoad::direct(
            OrderBookSnapshot {
                symbol: "BTC".into(),
                bids: bids.iter().map(|&(p, q)| PriceLevel::new(p, q)).collect(),
                asks: Vec::new(),
                reference_price: 100.0,
            },
            provenance,
        )
    }

    fn playing() -> GameSession<Vec<Notification>> {
        let mut s = session();
        s.start().unwrap();
        assert!(s.finish_loading(load(&[(100.0, 1.0)], Provenance::Real)));
        s
    }

    fn modes(sink: &[Notification]) -> Vec<Mode> {
        sink.iter()
            .filter_map(|n| match n {
                Notification::ModeChanged { mode, .. } => Some(*mode),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_load_play() {
        let mut s = session();
        assert_eq!(s.mode(), Mode::Menu);
        assert!(!s.is_ticking());

        let req = s.start().unwrap();
        assert_eq!(req.symbol, Symbol::Btc);
        assert_eq!(s.mode(), Mode::Loading);
        // A second start while loading is ignored
        assert!(s.start().is_none());

        assert!(s.finish_loading(load(&[(100.0, 1.0)], Provenance::Real)));
        assert_eq!(s.mode(), Mode::Playing);
        assert_eq!(s.world().blocks_remaining(), 10);
        assert_eq!(s.provenance(), Some(Provenance::Real));
        assert_eq!(modes(s.sink()), vec![Mode::Loading, Mode::Playing]);

        let statuses: Vec<_> = s
            .sink()
            .iter()
            .filter_map(|n| match n {
                Notification::Status { message, kind } => Some((message.as_str(), *kind)),
                _ => None,
            })
            .collect();
        assert_eq!(
            statuses.last(),
            Some(&("Real orderbook data loaded successfully", StatusKind::Success))
        );
    }

    #[test]
    fn test_snapshot_without_pending_load_is_dropped() {
        let mut s = session();
        assert!(!s.finish_loading(load(&[(100.0, 1.0)], Provenance::Real)));
        assert_eq!(s.mode(), Mode::Menu);
    }

    #[test]
    fn test_pause_preserves_state() {
        let mut s = playing();
        s.tick(&TickInput::default(), Duration::ZERO);
        let ball = s.world().ball.pos;

        s.toggle_pause();
        assert_eq!(s.mode(), Mode::Paused);
        assert_eq!(s.mode().controls().pause_label, "Resume");
        assert!(s.tick(&TickInput::default(), Duration::ZERO).is_none());
        assert_eq!(s.world().ball.pos, ball);

        s.toggle_pause();
        assert_eq!(s.mode(), Mode::Playing);
        s.tick(&TickInput::default(), Duration::ZERO);
        assert_ne!(s.world().ball.pos, ball);
    }

    #[test]
    fn test_pause_ignored_outside_play() {
        let mut s = session();
        s.toggle_pause();
        assert_eq!(s.mode(), Mode::Menu);
    }

    #[test]
    fn test_ball_loss_until_game_over() {
        let mut s = playing();
        s.score = 1234;

        for expected_lives in [2, 1, 0] {
            s.world_mut().ball.pos = Vec2::new(50.0, 700.0);
            s.world_mut().ball.vel = Vec2::new(0.0, 3.0);
            s.tick(&TickInput::default(), Duration::ZERO);
            assert_eq!(s.lives(), expected_lives);
        }

        assert_eq!(s.mode(), Mode::GameOver);
        assert_eq!(s.final_score(), Some(1234));
        assert_eq!(s.score(), 1234);
        assert!(matches!(
            s.sink().iter().rev().find(|n| matches!(n, Notification::ModeChanged { .. })),
            Some(Notification::ModeChanged {
                overlay: Some(Overlay::GameOver { final_score: 1234 }),
                ..
            })
        ));
    }

    #[test]
    fn test_life_loss_resets_ball_keeps_blocks() {
        let mut s = playing();
        s.world_mut().blocks.truncate(4);
        s.world_mut().ball.pos = Vec2::new(50.0, 700.0);
        s.world_mut().ball.vel = Vec2::new(0.0, 3.0);
        s.tick(&TickInput::default(), Duration::ZERO);

        assert_eq!(s.mode(), Mode::Playing);
        assert_eq!(s.lives(), 2);
        assert_eq!(s.world().ball.pos, crate::sim::Ball::spawn_point());
        assert_eq!(s.world().blocks_remaining(), 4);
    }

    #[test]
    fn test_level_complete_then_alarm_reloads() {
        let mut s = playing();
        s.world_mut().blocks.clear();
        let now = Duration::from_secs(10);

        s.tick(&TickInput::default(), now);
        assert_eq!(s.mode(), Mode::LevelComplete);
        assert_eq!(s.level(), 2);
        assert!(!s.is_ticking());
        let alarm = s.alarm().unwrap();
        assert_eq!(alarm.due, now + Settings::default().level_delay());

        // Not yet
        assert!(s.poll_alarm(now + Duration::from_millis(500)).is_none());
        assert_eq!(s.mode(), Mode::LevelComplete);

        let req = s.poll_alarm(alarm.due).unwrap();
        assert_eq!(req.symbol, Symbol::Btc);
        assert_eq!(s.mode(), Mode::Loading);
        assert!(s.alarm().is_none());

        assert!(s.finish_loading(load(&[(200.0, 0.5), (199.0, 0.35)], Provenance::Synthetic)));
        assert_eq!(s.level(), 2);
        assert_eq!(s.lives(), 3);
        assert_eq!(s.world().blocks_remaining(), 8);

        // Old tower gone, new ones indexed from zero
        let prices: Vec<f64> = s.world().towers.iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![200.0, 199.0]);
        for block in &s.world().blocks {
            let tower = &s.world().towers[block.tower];
            assert_eq!(tower.price, block.price);
            assert!(tower.blocks.contains(&block.id));
        }
    }

    #[test]
    fn test_level_cleared_by_hits_empties_every_tower() {
        let mut s = session();
        s.start();
        assert!(s.finish_loading(load(&[(100.0, 0.2), (99.0, 0.1)], Provenance::Real)));
        assert_eq!(s.world().towers.len(), 2);

        let mut destroyed = Vec::new();
        while let Some(target) = s.world().blocks.first().map(|b| b.rect) {
            s.world_mut().ball.pos = Vec2::new(target.x + 5.0, target.y + 5.0);
            s.world_mut().ball.vel = Vec2::ZERO;
            let report = s.tick(&TickInput::default(), Duration::ZERO).unwrap();
            destroyed.extend(report.events.iter().filter_map(|e| match e {
                GameEvent::BlockDestroyed { tower, .. } => Some(*tower),
                _ => None,
            }));
        }

        assert_eq!(destroyed, vec![0, 0, 1]);
        assert_eq!(s.mode(), Mode::LevelComplete);
        assert!(s.world().towers.iter().all(|t| t.is_empty() && t.label().is_none()));
    }

    #[test]
    fn test_cancelled_alarm_never_fires() {
        let mut s = playing();
        s.world_mut().blocks.clear();
        s.tick(&TickInput::default(), Duration::ZERO);
        assert!(s.cancel_alarm().is_some());
        assert!(s.poll_alarm(Duration::from_secs(60)).is_none());
        assert_eq!(s.mode(), Mode::LevelComplete);
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut s = playing();
        s.score = 500;
        s.level = 4;
        s.lives = 1;
        s.world_mut().ball.pos = Vec2::new(50.0, 700.0);
        s.world_mut().ball.vel = Vec2::new(0.0, 3.0);
        s.tick(&TickInput::default(), Duration::ZERO);
        assert_eq!(s.mode(), Mode::GameOver);

        let req = s.restart().unwrap();
        assert_eq!(req.symbol, Symbol::Btc);
        assert_eq!((s.score(), s.level(), s.lives()), (0, 1, 3));
        assert_eq!(s.final_score(), None);
        assert_eq!(s.mode(), Mode::Loading);
        // Only allowed once the game has ended
        assert!(s.restart().is_none());
    }

    #[test]
    fn test_symbol_selection_applies_to_next_load() {
        let mut s = session();
        s.select_symbol(Symbol::Sol);
        assert_eq!(s.start().unwrap().symbol, Symbol::Sol);
    }

    #[test]
    fn test_synthetic_fallback_status() {
        let mut s = session();
        s.start();
        let mut fallback = load(&[(100.0, 1.0)], Provenance::Synthetic);
        fallback.fallback_reason = Some(crate::book::FetchError::Timeout(Duration::from_secs(3)));
        s.finish_loading(fallback);
        assert!(s.sink().contains(&Notification::Status {
            message: "Using sample data - API unavailable".into(),
            kind: StatusKind::Warning,
        }));
    }

    #[test]
    fn test_score_accumulates_from_blocks() {
        let mut s = playing();
        let target = s.world().blocks[0].rect;
        s.world_mut().ball.pos = Vec2::new(target.x + 5.0, target.y + 5.0);
        s.world_mut().ball.vel = Vec2::ZERO;
        s.tick(&TickInput::default(), Duration::ZERO);
        assert_eq!(s.score(), 1000);
        assert_eq!(s.world().blocks_remaining(), 9);
        assert!(matches!(
            s.sink().last(),
            Some(Notification::Stats(Stats { score: 1000, blocks_remaining: 9, .. }))
        ));
    }
}
