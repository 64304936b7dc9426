use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the system produces an Event.
/// The dashboard prints them; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    FocusStarted {
        minutes: u32,
        /// Milliseconds since the Unix epoch.
        end_time: u64,
        at: DateTime<Utc>,
    },
    /// Session ended early via the passphrase-gated stop path.
    FocusStopped {
        at: DateTime<Utc>,
    },
    /// Session ran its full length (timer fired or reconciliation found the
    /// deadline elapsed).
    FocusExpired {
        at: DateTime<Utc>,
    },
    /// The enforcement engine's rule set was replaced wholesale.
    RulesActivated {
        removed: usize,
        added: usize,
        at: DateTime<Utc>,
    },
    /// The enforcement engine's rule set was replaced with the empty set.
    RulesCleared {
        removed: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        is_focusing: bool,
        /// Milliseconds since the Unix epoch; zero while idle.
        end_time: u64,
        remaining_ms: u64,
        /// mm:ss, recomputed from `end_time - now` -- never stored.
        countdown: String,
        blocked_sites: usize,
        blocked_keywords: usize,
        at: DateTime<Utc>,
    },
}
