//! # Focusgate Core Library
//!
//! This library provides the core logic for Focusgate, a timed focus-mode
//! enforcement engine. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary that is a thin
//! layer over this library.
//!
//! ## Architecture
//!
//! - **Session Controller**: wall-clock state machine over `{Idle, Focusing}`;
//!   the sole writer of persisted session state, reconciled via `check_status`
//! - **Rule Compiler**: pure derivation of blocking rules from the block-list,
//!   activated through an atomic replace-all seam
//! - **Navigation Guard**: fail-safe URL check independent of the rule engine
//! - **Timer Trigger**: named one-shot deferred wake-up for session expiry
//! - **Storage**: SQLite-backed key/value state plus session history, and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionController`]: session lifecycle and reconciliation
//! - [`NavigationGuard`]: redundant enforcement path
//! - [`Database`]: state and history persistence
//! - [`Config`]: application configuration management

pub mod command;
pub mod error;
pub mod events;
pub mod guard;
pub mod rules;
pub mod session;
pub mod storage;
pub mod trigger;

pub use command::Command;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use guard::{BlockReason, GuardVerdict, NavigationGuard, INTERNAL_PAGES};
pub use rules::{compile, BlockList, CompiledRule, MemoryRuleEngine, ResourceType, RuleEngine};
pub use session::{format_countdown, now_ms, FocusPhase, SessionController, SessionState};
pub use storage::{Config, Database, SessionOutcome, SessionRecord, SessionStats};
pub use trigger::{FocusTrigger, TriggerFire, FOCUS_TIMER};
