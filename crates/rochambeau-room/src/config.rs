//! Match configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A room never holds more than two participants.
pub const ROOM_CAPACITY: usize = 2;

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Score that wins a match ("first to N"). Checked after every round
    /// that has a winner.
    pub win_threshold: u32,

    /// How long a rematch vote may wait for the opponent before the
    /// gateway withdraws it. Rooms never read this; it is carried here so
    /// there is one place to configure a match.
    pub rematch_vote_timeout: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            win_threshold: 5,
            rematch_vote_timeout: Duration::from_secs(15),
        }
    }
}

impl MatchConfig {
    /// A default config with a different win threshold.
    pub fn first_to(win_threshold: u32) -> Self {
        Self {
            win_threshold,
            ..Self::default()
        }
    }

    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// A threshold of 0 would end every match before its first round, so
    /// it is raised to 1.
    pub fn validated(mut self) -> Self {
        if self.win_threshold == 0 {
            tracing::warn!("win_threshold of 0 is meaningless, using 1");
            self.win_threshold = 1;
        }
        self
    }
}
