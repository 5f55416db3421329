//! Leaderboard of finished games
//!
//! Kept as a JSON file. Entries remember which book the game was played on.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// Board size
pub const MAX_HIGH_SCORES: usize = 10;

/// Default leaderboard file name
pub const HIGH_SCORES_FILE: &str = "book_breaker_highscores.json";

/// One finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Order book the game was played on
    pub symbol: Symbol,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

/// Finished games, best first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// An empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot a score would take (0-indexed), None when it misses the board
    ///
    /// Ties rank below the existing entry. Zero never ranks.
    fn slot_for(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let slot = self
            .entries
            .iter()
            .take_while(|e| e.score >= score)
            .count();
        (slot < MAX_HIGH_SCORES).then_some(slot)
    }

    /// Record a finished game; returns the rank reached, if any
    pub fn add_score(
        &mut self,
        score: u64,
        level: u32,
        symbol: Symbol,
        timestamp_ms: u64,
    ) -> Option<usize> {
        let slot = self.slot_for(score)?;
        let entry = HighScoreEntry {
            score,
            level,
            symbol,
            timestamp_ms,
        };
        self.entries.insert(slot, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    /// No games recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest recorded score
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Best game played on one symbol's book
    pub fn best_for(&self, symbol: Symbol) -> Option<&HighScoreEntry> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    /// Read the board; a missing or corrupt file gives an empty one
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str::<Self>(&json).map_err(|e| e.to_string()));
        match parsed {
            Ok(board) => {
                log::info!("{} high scores from {}", board.entries.len(), path.display());
                board
            }
            Err(e) => {
                log::info!("Empty leaderboard ({}: {})", path.display(), e);
                Self::new()
            }
        }
    }

    /// Write the board as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::debug!("Leaderboard written to {}", path.display());
        Ok(())
    }
}
