//! Commands accepted by the session controller.
//!
//! The dashboard surface never mutates session state directly; it sends one
//! of these commands and the controller applies it. No return payload is
//! required by callers -- the emitted [`Event`](crate::events::Event)s are
//! informational.

use serde::{Deserialize, Serialize};

/// A command delivered to the [`SessionController`](crate::SessionController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Begin a focus session of the given length. Sending this while a
    /// session is already running overwrites it -- last call wins.
    StartFocus { minutes: u32 },
    /// End the current session. Passphrase verification happens in the UI
    /// before this is ever sent; the controller trusts the command.
    StopFocus,
    /// Reconcile enforcement state against the persisted session state.
    CheckStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_dashboard_protocol() {
        let json = serde_json::to_string(&Command::StartFocus { minutes: 25 }).unwrap();
        assert_eq!(json, r#"{"action":"start_focus","minutes":25}"#);

        let cmd: Command = serde_json::from_str(r#"{"action":"stop_focus"}"#).unwrap();
        assert_eq!(cmd, Command::StopFocus);

        let cmd: Command = serde_json::from_str(r#"{"action":"check_status"}"#).unwrap();
        assert_eq!(cmd, Command::CheckStatus);
    }
}
