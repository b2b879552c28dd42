//! Player preferences and personal bests
//!
//! Persisted as individual LocalStorage keys so values written by older
//! builds stay readable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;
use crate::sim::Mode;

/// Name used when the player never entered one
pub const DEFAULT_PLAYER_NAME: &str = "Guest";

/// Best score in any mode that unlocks the gold skin
pub const GOLD_UNLOCK_SCORE: u64 = 100;
/// Asian mode best score that unlocks the neon skin
pub const NEON_UNLOCK_SCORE: u64 = 120;

/// Player sprite skins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Skin {
    #[default]
    Classic,
    Gold,
    /// Also swaps the obstacle art
    Neon,
}

impl Skin {
    pub const ALL: [Skin; 3] = [Skin::Classic, Skin::Gold, Skin::Neon];

    /// Stored value ("1", "2", "3")
    pub fn as_str(&self) -> &'static str {
        match self {
            Skin::Classic => "1",
            Skin::Gold => "2",
            Skin::Neon => "3",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(Skin::Classic),
            "2" => Some(Skin::Gold),
            "3" => Some(Skin::Neon),
            _ => None,
        }
    }

    /// Hint shown when a locked skin is clicked
    pub fn unlock_hint(&self) -> Option<String> {
        match self {
            Skin::Classic => None,
            Skin::Gold => Some(format!(
                "Unlock by reaching a score of {} in any mode!",
                GOLD_UNLOCK_SCORE
            )),
            Skin::Neon => Some(format!(
                "Unlock by reaching a score of {} in {}!",
                NEON_UNLOCK_SCORE,
                Mode::Asian.label()
            )),
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preferences {
    /// `None` until the player picks a name
    pub player_name: Option<String>,
    pub skin: Skin,
    high_scores: HashMap<Mode, u64>,
}

impl Preferences {
    const NAME_KEY: &'static str = "playerName";
    const SKIN_KEY: &'static str = "playerSkin";

    fn high_score_key(mode: Mode) -> String {
        format!("highscore_{}", mode.as_str())
    }

    /// Name to submit scores under
    pub fn display_name(&self) -> &str {
        self.player_name.as_deref().unwrap_or(DEFAULT_PLAYER_NAME)
    }

    /// Set the player name; blank input falls back to the default
    pub fn set_player_name(&mut self, name: &str) {
        let name = name.trim();
        self.player_name = if name.is_empty() {
            Some(DEFAULT_PLAYER_NAME.to_string())
        } else {
            Some(name.to_string())
        };
    }

    pub fn high_score(&self, mode: Mode) -> u64 {
        self.high_scores.get(&mode).copied().unwrap_or(0)
    }

    /// Best score across all modes
    pub fn best_score(&self) -> u64 {
        self.high_scores.values().copied().max().unwrap_or(0)
    }

    /// Record a finished run. Returns true on a new personal best.
    pub fn record_score(&mut self, mode: Mode, score: u64) -> bool {
        if score > self.high_score(mode) {
            self.high_scores.insert(mode, score);
            log::info!("New {} personal best: {}", mode.as_str(), score);
            true
        } else {
            false
        }
    }

    pub fn is_unlocked(&self, skin: Skin) -> bool {
        match skin {
            Skin::Classic => true,
            Skin::Gold => self.best_score() >= GOLD_UNLOCK_SCORE,
            Skin::Neon => self.high_score(Mode::Asian) >= NEON_UNLOCK_SCORE,
        }
    }

    /// Select a skin if it is unlocked
    pub fn select_skin(&mut self, skin: Skin) -> bool {
        if !self.is_unlocked(skin) {
            return false;
        }
        self.skin = skin;
        true
    }

    /// Load preferences; missing or unreadable values fall back to defaults
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let mut prefs = Self {
            player_name: store.get(Self::NAME_KEY).filter(|n| !n.trim().is_empty()),
            skin: store
                .get(Self::SKIN_KEY)
                .and_then(|s| Skin::from_str(&s))
                .unwrap_or_default(),
            high_scores: HashMap::new(),
        };
        for mode in Mode::ALL {
            let score = store
                .get(&Self::high_score_key(mode))
                .and_then(|s| s.trim().parse::<u64>().ok());
            if let Some(score) = score {
                prefs.high_scores.insert(mode, score);
            }
        }
        // Stored skin may predate a reset of the personal bests
        if !prefs.is_unlocked(prefs.skin) {
            prefs.skin = Skin::Classic;
        }
        log::info!("Loaded preferences for {}", prefs.display_name());
        prefs
    }

    /// Save preferences
    pub fn save<S: KeyValueStore>(&self, store: &S) {
        let mut ok = true;
        if let Some(name) = &self.player_name {
            ok &= store.set(Self::NAME_KEY, name);
        }
        ok &= store.set(Self::SKIN_KEY, self.skin.as_str());
        for (mode, score) in &self.high_scores {
            ok &= store.set(&Self::high_score_key(*mode), &score.to_string());
        }
        if ok {
            log::info!("Preferences saved");
        } else {
            log::warn!("Preferences only partially saved");
        }
    }
}
