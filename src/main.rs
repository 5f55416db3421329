//! Book Breaker headless runner
//!
//! Plays the game with the autopilot on a simulated 60 Hz clock, logging
//! every notification, then records the high score and prints the final
//! frame. Usage: `book-breaker [settings.json]`

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use book_breaker::autopilot::Autopilot;
use book_breaker::book::{
    CoinGeckoSource, Feed, FileSource, OfflineSource, OrderBookSource, SyntheticBook,
};
use book_breaker::session::{GameSession, LoadRequest, LogSink, Mode};
use book_breaker::settings::{PriceSource, SETTINGS_FILE};
use book_breaker::view::{Frame, render_text};
use book_breaker::{HighScores, Settings};

/// One display frame
const TICK_PERIOD: Duration = Duration::from_micros(16_667);

/// Stop after this many cleared levels
const MAX_LEVELS: u32 = 5;

/// Stop after this many ticks (about an hour of play)
const MAX_TICKS: u64 = 60 * 60 * 60;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Book Breaker (headless) starting...");

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
    let settings = Settings::load(&settings_path);
    if !settings_path.exists() {
        // Leave an editable copy of the defaults behind
        if let Err(e) = settings.save(&settings_path) {
            log::warn!("Failed to write {}: {}", settings_path.display(), e);
        }
    }
    log::info!(
        "Playing {} with seed {}",
        settings.symbol.name(),
        settings.seed
    );

    let fallback = SyntheticBook::new(settings.seed);
    let timeout = settings.fetch_timeout();
    let session = match settings.price_source() {
        PriceSource::File(path) => {
            log::info!("Order books from {}", path.display());
            play(Feed::new(FileSource::new(path), fallback, timeout), &settings).await
        }
        PriceSource::Live(url) => match CoinGeckoSource::new(url, settings.seed) {
            Ok(source) => {
                log::info!("Order books around live prices");
                play(Feed::new(source, fallback, timeout), &settings).await
            }
            Err(e) => {
                log::warn!("Live prices unavailable ({}), playing offline", e);
                play(Feed::new(OfflineSource, fallback, timeout), &settings).await
            }
        },
        PriceSource::Offline => {
            play(Feed::new(OfflineSource, fallback, timeout), &settings).await
        }
    };

    record_high_score(&session, &settings);

    let frame = Frame::capture(&session);
    print!("{}", render_text(&frame));
    match serde_json::to_string_pretty(&frame) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize final frame: {}", e),
    }
}

/// Run one game to completion or until a cap is hit
async fn play<S: OrderBookSource>(mut feed: Feed<S>, settings: &Settings) -> GameSession<LogSink> {
    let mut session = GameSession::new(settings, LogSink);
    let mut pilot = Autopilot::new();
    let mut now = Duration::ZERO;
    let mut ticks: u64 = 0;

    let mut pending = session.start();
    loop {
        if let Some(LoadRequest { symbol }) = pending.take() {
            let load = feed.request(symbol).await;
            session.finish_loading(load);
        }

        match session.mode() {
            Mode::Playing => {
                let input = pilot.input(session.world());
                session.tick(&input, now);
                now += TICK_PERIOD;
                ticks += 1;
                if ticks >= MAX_TICKS {
                    log::info!("Tick limit reached");
                    break;
                }
            }
            Mode::LevelComplete => {
                if session.level() > MAX_LEVELS {
                    log::info!("Level limit reached");
                    break;
                }
                let Some(alarm) = session.alarm() else {
                    log::error!("Level complete without a pending alarm");
                    break;
                };
                // Nothing moves during the delay, so skip the clock ahead
                now = now.max(alarm.due);
                pending = session.poll_alarm(now);
            }
            Mode::GameOver => break,
            Mode::Menu | Mode::Loading | Mode::Paused => {
                log::error!("Stalled in {}", session.mode().as_str());
                break;
            }
        }
    }
    session
}

fn record_high_score(session: &GameSession<LogSink>, settings: &Settings) {
    let path = &settings.high_scores_path;
    let mut scores = HighScores::load(path);
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    if let Some(best) = scores.best_for(session.symbol()) {
        log::info!(
            "Best on {} so far: {} (level {})",
            session.symbol().ticker(),
            best.score,
            best.level
        );
    }
    match scores.add_score(session.score(), session.level(), session.symbol(), timestamp_ms) {
        Some(rank) => {
            log::info!("New high score #{}: {}", rank, session.score());
            if let Err(e) = scores.save(path) {
                log::warn!("Failed to save high scores: {}", e);
            }
        }
        None => log::info!(
            "Score {} did not make the board (top score {})",
            session.score(),
            scores.top_score().unwrap_or(0)
        ),
    }
}
