mod controller;
mod state;

pub use controller::SessionController;
pub use state::{format_countdown, now_ms, FocusPhase, SessionState};
