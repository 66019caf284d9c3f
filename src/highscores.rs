//! Leaderboards built from the per-player record files
//!
//! Scores are grouped by (level, mode) and ranked descending.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::{RecordRow, RecordStore};
use crate::settings::Mode;

/// Entries shown on the end-of-run screen
pub const DEFAULT_TOP_SCORES: usize = 3;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player: String,
    /// Whole seconds survived
    pub score: u64,
    pub cleared: bool,
}

/// Best result of one player on one (level, mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalBest {
    pub best_score: u64,
    /// Whether the best-scoring run cleared the level
    pub cleared: bool,
}

/// Anything that can answer top-score queries
pub trait LeaderboardQuery {
    fn top_scores(&self, level: &str, mode: Mode, limit: usize) -> Vec<LeaderboardEntry>;
}

/// Scores for every (level, mode), each list sorted descending
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    boards: BTreeMap<(String, Mode), Vec<LeaderboardEntry>>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from every record file in `store`
    pub fn load(store: &RecordStore) -> Self {
        let mut board = Self::new();
        for (player, row) in store.read_all() {
            board.add(&player, &row);
        }
        log::debug!("Loaded leaderboard with {} boards", board.boards.len());
        board
    }

    /// Insert one record keeping the board sorted; ties keep arrival order.
    /// Returns the rank achieved (1-indexed).
    pub fn add(&mut self, player: &str, row: &RecordRow) -> usize {
        let entries = self.boards.entry((row.level.clone(), row.mode)).or_default();
        let entry = LeaderboardEntry {
            player: player.to_string(),
            score: row.score,
            cleared: row.cleared,
        };

        // Find insertion point (sorted descending by score)
        let pos = entries
            .iter()
            .position(|e| row.score > e.score)
            .unwrap_or(entries.len());
        entries.insert(pos, entry);
        pos + 1
    }

    /// Rank `score` would get on (level, mode) if added now (1-indexed)
    pub fn potential_rank(&self, level: &str, mode: Mode, score: u64) -> usize {
        self.entries(level, mode)
            .iter()
            .position(|e| score > e.score)
            .unwrap_or_else(|| self.entries(level, mode).len())
            + 1
    }

    /// Full sorted board for (level, mode)
    pub fn entries(&self, level: &str, mode: Mode) -> &[LeaderboardEntry] {
        self.boards
            .get(&(level.to_string(), mode))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Top score on (level, mode), if any
    pub fn top_score(&self, level: &str, mode: Mode) -> Option<u64> {
        self.entries(level, mode).first().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Top `limit` entries of every board, ordered by level then mode
    pub fn general(&self, limit: usize) -> Vec<(String, Mode, Vec<LeaderboardEntry>)> {
        self.boards
            .iter()
            .map(|((level, mode), entries)| {
                (
                    level.clone(),
                    *mode,
                    entries.iter().take(limit).cloned().collect(),
                )
            })
            .collect()
    }
}

impl LeaderboardQuery for Leaderboard {
    fn top_scores(&self, level: &str, mode: Mode, limit: usize) -> Vec<LeaderboardEntry> {
        self.entries(level, mode).iter().take(limit).cloned().collect()
    }
}

impl LeaderboardQuery for RecordStore {
    fn top_scores(&self, level: &str, mode: Mode, limit: usize) -> Vec<LeaderboardEntry> {
        Leaderboard::load(self).top_scores(level, mode, limit)
    }
}

/// Best score per (level, mode) among one player's rows
pub fn personal_bests(rows: &[RecordRow]) -> BTreeMap<(String, Mode), PersonalBest> {
    let mut bests: BTreeMap<(String, Mode), PersonalBest> = BTreeMap::new();
    for row in rows {
        let key = (row.level.clone(), row.mode);
        let better = bests.get(&key).is_none_or(|best| row.score > best.best_score);
        if better {
            bests.insert(
                key,
                PersonalBest {
                    best_score: row.score,
                    cleared: row.cleared,
                },
            );
        }
    }
    bests
}
