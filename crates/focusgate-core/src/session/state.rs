//! Persisted session state.
//!
//! Exactly one instance exists process-wide, held in the
//! [`Database`](crate::storage::Database) kv store and mutated only by the
//! [`SessionController`](super::SessionController). All time arithmetic is
//! wall-clock epoch milliseconds with saturating ops.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusPhase {
    Idle,
    Focusing,
}

/// The single source of truth for the focus-session lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub is_focusing: bool,
    /// Session deadline, milliseconds since the Unix epoch.
    /// Meaningful only while `is_focusing` is set.
    pub end_time: u64,
    /// Passphrase required to stop early. Cleared when the session ends.
    pub unlock_phrase: String,
}

impl SessionState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FocusPhase {
        if self.is_focusing {
            FocusPhase::Focusing
        } else {
            FocusPhase::Idle
        }
    }

    /// Milliseconds until the deadline; zero while idle or past-deadline.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        if self.is_focusing {
            self.end_time.saturating_sub(now_ms)
        } else {
            0
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.is_focusing && self.end_time <= now_ms
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// mm:ss rendering of a remaining-time value.
///
/// Always recomputed from `end_time - now`; the countdown is never stored
/// as its own counter, so it cannot drift.
pub fn format_countdown(remaining_ms: u64) -> String {
    let mins = remaining_ms / 60_000;
    let secs = (remaining_ms % 60_000) / 1_000;
    format!("{mins:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_has_no_remaining_time() {
        let state = SessionState::idle();
        assert_eq!(state.phase(), FocusPhase::Idle);
        assert_eq!(state.remaining_ms(1_000), 0);
        assert!(!state.is_expired(u64::MAX));
    }

    #[test]
    fn remaining_saturates_past_deadline() {
        let state = SessionState {
            is_focusing: true,
            end_time: 10_000,
            unlock_phrase: "open sesame".into(),
        };
        assert_eq!(state.remaining_ms(4_000), 6_000);
        assert_eq!(state.remaining_ms(10_000), 0);
        assert_eq!(state.remaining_ms(99_000), 0);
    }

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let state = SessionState {
            is_focusing: true,
            end_time: 10_000,
            unlock_phrase: String::new(),
        };
        assert!(!state.is_expired(9_999));
        assert!(state.is_expired(10_000));
        assert!(state.is_expired(10_001));
    }

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(61_000), "01:01");
        assert_eq!(format_countdown(25 * 60_000), "25:00");
        assert_eq!(format_countdown(125 * 60_000 + 9_000), "125:09");
    }
}
