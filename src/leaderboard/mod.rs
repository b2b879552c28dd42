//! Leaderboard collaborator
//!
//! The game core only ever needs three things from a leaderboard: record a
//! finished run, read the top N for a mode, and check whether a name is
//! taken. Backends come and go (local storage, HTTP functions), so they sit
//! behind `LeaderboardBackend` and every failure is absorbed here: a broken
//! leaderboard never blocks or alters gameplay.

pub mod local;
#[cfg(target_arch = "wasm32")]
pub mod remote;

pub use local::{LocalLeaderboard, ModeBoard};
#[cfg(target_arch = "wasm32")]
pub use remote::RemoteLeaderboard;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Mode;

/// Rows kept per mode by backends that trim
pub const MAX_ENTRIES: usize = 10;

/// A recorded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub mode: Mode,
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// One displayed leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub name: String,
    pub score: u64,
}

impl From<&LeaderboardEntry> for ScoreRow {
    fn from(entry: &LeaderboardEntry) -> Self {
        Self {
            name: entry.name.clone(),
            score: entry.score,
        }
    }
}

/// Leaderboard backend failures
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("storage unavailable")]
    StorageUnavailable,
    #[error("malformed leaderboard data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("network error: {0}")]
    Network(String),
    #[error("rejected by server (status {0})")]
    Rejected(u16),
    #[error("invalid entry: {0}")]
    InvalidEntry(&'static str),
}

/// A leaderboard store
///
/// Implementations make a single attempt per call; retries are not part of
/// the contract.
#[allow(async_fn_in_trait)]
pub trait LeaderboardBackend {
    /// Record one finished run
    async fn submit(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError>;

    /// Best rows for `mode`, at most `limit`
    async fn top_scores(&self, mode: Mode, limit: usize) -> Result<Vec<ScoreRow>, LeaderboardError>;

    /// Whether nobody has claimed `name` yet
    async fn is_name_available(&self, name: &str) -> Result<bool, LeaderboardError>;

    /// Claim `name` for this player
    async fn register_name(&self, name: &str) -> Result<(), LeaderboardError>;
}

/// Wall-clock milliseconds since the Unix epoch, for `LeaderboardEntry::timestamp`
#[cfg(target_arch = "wasm32")]
pub fn unix_millis() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock milliseconds since the Unix epoch, for `LeaderboardEntry::timestamp`
#[cfg(not(target_arch = "wasm32"))]
pub fn unix_millis() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_millis() as f64)
}

/// Submit a finished run. Failures are logged and otherwise ignored.
pub async fn submit_run_result<B: LeaderboardBackend>(
    backend: &B,
    mode: Mode,
    player_name: &str,
    score: u64,
    timestamp: f64,
) {
    let entry = LeaderboardEntry {
        mode,
        name: player_name.to_string(),
        score,
        timestamp,
    };
    match backend.submit(&entry).await {
        Ok(()) => log::info!(
            "Score submitted for {} ({} in {})",
            player_name,
            score,
            mode.as_str()
        ),
        Err(e) => log::warn!("Score submission failed: {}", e),
    }
}

/// Top scores for a mode, best first. Empty on any failure.
pub async fn fetch_top_scores<B: LeaderboardBackend>(
    backend: &B,
    mode: Mode,
    limit: usize,
) -> Vec<ScoreRow> {
    match backend.top_scores(mode, limit).await {
        Ok(mut rows) => {
            // Backends are not trusted to sort or trim
            rows.sort_by(|a, b| b.score.cmp(&a.score));
            rows.truncate(limit);
            rows
        }
        Err(e) => {
            log::warn!("Leaderboard fetch for {} failed: {}", mode.as_str(), e);
            Vec::new()
        }
    }
}

/// Name availability check. An unreachable backend never blocks the player.
pub async fn check_name_available<B: LeaderboardBackend>(backend: &B, name: &str) -> bool {
    match backend.is_name_available(name).await {
        Ok(available) => available,
        Err(e) => {
            log::warn!("Name check for {} failed, allowing it: {}", name, e);
            true
        }
    }
}

/// Render rows as `"1. name - score"` lines
pub fn format_leaderboard(rows: &[ScoreRow]) -> String {
    if rows.is_empty() {
        return "No entries".to_string();
    }
    rows.iter()
        .enumerate()
        .map(|(i, row)| format!("{}. {} - {}", i + 1, row.name, row.score))
        .collect::<Vec<_>>()
        .join("\n")
}
