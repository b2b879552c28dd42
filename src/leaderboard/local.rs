//! Local leaderboard
//!
//! Persisted to the key/value store, tracks the top 10 scores per mode and
//! the set of claimed player names.

use serde::{Deserialize, Serialize};

use super::{LeaderboardBackend, LeaderboardEntry, LeaderboardError, MAX_ENTRIES, ScoreRow};
use crate::persistence::KeyValueStore;
use crate::sim::Mode;

/// Top runs of one mode, best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModeBoard {
    pub entries: Vec<LeaderboardEntry>,
}

impl ModeBoard {
    /// Zero never places; otherwise a free slot or beating the last row does
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        match self.entries.get(MAX_ENTRIES - 1) {
            Some(last) => score > last.score,
            None => true,
        }
    }

    /// Place `entry`, returning its 1-based rank, or `None` if it missed the cut
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Equal scores keep the earlier run ahead
        let index = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(index + 1)
    }
}

/// Leaderboard kept entirely on this device
#[derive(Debug, Clone)]
pub struct LocalLeaderboard<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> LocalLeaderboard<S> {
    const NAMES_KEY: &'static str = "block_dodger_names";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn board_key(mode: Mode) -> String {
        format!("block_dodger_leaderboard_{}", mode.as_str())
    }

    /// Current board for a mode (empty if missing or unreadable)
    pub fn board(&self, mode: Mode) -> ModeBoard {
        self.store
            .get_json::<ModeBoard>(&Self::board_key(mode))
            .unwrap_or_default()
    }

    fn names(&self) -> Vec<String> {
        self.store.get_json(Self::NAMES_KEY).unwrap_or_default()
    }
}

impl<S: KeyValueStore> LeaderboardBackend for LocalLeaderboard<S> {
    async fn submit(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        if entry.name.trim().is_empty() {
            return Err(LeaderboardError::InvalidEntry("empty name"));
        }

        let mut board = self.board(entry.mode);
        match board.insert(entry.clone()) {
            Some(rank) => {
                let json = serde_json::to_string(&board)?;
                if !self.store.set(&Self::board_key(entry.mode), &json) {
                    return Err(LeaderboardError::StorageUnavailable);
                }
                log::info!(
                    "{} placed #{} on the {} board",
                    entry.name,
                    rank,
                    entry.mode.as_str()
                );
            }
            None => log::debug!("Score {} did not make the board", entry.score),
        }
        Ok(())
    }

    async fn top_scores(
        &self,
        mode: Mode,
        limit: usize,
    ) -> Result<Vec<ScoreRow>, LeaderboardError> {
        let raw = match self.store.get(&Self::board_key(mode)) {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        let board: ModeBoard = serde_json::from_str(&raw)?;
        Ok(board.entries.iter().take(limit).map(ScoreRow::from).collect())
    }

    async fn is_name_available(&self, name: &str) -> Result<bool, LeaderboardError> {
        let name = name.trim();
        Ok(!self.names().iter().any(|n| n == name))
    }

    async fn register_name(&self, name: &str) -> Result<(), LeaderboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeaderboardError::InvalidEntry("empty name"));
        }
        let mut names = self.names();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
            if !self.store.set_json(Self::NAMES_KEY, &names) {
                return Err(LeaderboardError::StorageUnavailable);
            }
        }
        Ok(())
    }
}
