//! Session controller.
//!
//! The controller is the sole writer of [`SessionState`] and the only code
//! that touches the enforcement engine or the timer trigger. Correctness
//! across restarts and interleaved callbacks relies on `check_status` being
//! idempotent and safe to call redundantly, not on locks.
//!
//! Write ordering: the store write always happens first; a failed write
//! propagates without touching enforcement or trigger state.

use chrono::Utc;

use crate::command::Command;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::rules::{compile, RuleEngine};
use crate::session::state::{format_countdown, now_ms, SessionState};
use crate::storage::{Database, SessionOutcome};
use crate::trigger::{FocusTrigger, TriggerFire, FOCUS_TIMER};

pub struct SessionController<E: RuleEngine> {
    db: Database,
    engine: E,
    trigger: FocusTrigger,
}

impl<E: RuleEngine> SessionController<E> {
    pub fn new(db: Database, engine: E, trigger: FocusTrigger) -> Self {
        Self {
            db,
            engine,
            trigger,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn trigger(&self) -> &FocusTrigger {
        &self.trigger
    }

    /// Apply a dashboard command.
    pub fn handle(&mut self, command: Command) -> Result<Vec<Event>> {
        match command {
            Command::StartFocus { minutes } => self.start_focus(minutes),
            Command::StopFocus => self.stop_focus(),
            Command::CheckStatus => self.check_status(),
        }
    }

    /// Begin a focus session.
    ///
    /// Calling while already focusing overwrites the running session --
    /// last call wins, no stacking. The overwritten session is closed out
    /// in history as superseded.
    pub fn start_focus(&mut self, minutes: u32) -> Result<Vec<Event>> {
        if minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "minutes".into(),
                message: "must be a positive number of minutes".into(),
            }
            .into());
        }

        let now = Utc::now();
        let mut state = self.db.load_session_state()?;
        if state.is_focusing {
            tracing::warn!("start received while already focusing; overwriting");
            self.db.finish_session(SessionOutcome::Superseded, now)?;
        }

        state.is_focusing = true;
        state.end_time = now_ms() + u64::from(minutes) * 60_000;
        self.db.save_session_state(&state)?;
        self.db.begin_session(minutes, now)?;

        self.trigger.arm(f64::from(minutes));
        let rules_event = self.activate_rules()?;

        tracing::info!(minutes, end_time = state.end_time, "focus session started");
        Ok(vec![
            Event::FocusStarted {
                minutes,
                end_time: state.end_time,
                at: now,
            },
            rules_event,
        ])
    }

    /// End the current session early.
    ///
    /// Passphrase verification happened in the dashboard before this command
    /// was sent; the controller trusts it.
    pub fn stop_focus(&mut self) -> Result<Vec<Event>> {
        self.end_session(SessionOutcome::Stopped)
    }

    /// Reconcile enforcement state against the persisted session state.
    ///
    /// Called on process startup and on demand; idempotent. The enforcement
    /// engine and the trigger do not survive a restart, so an unexpired
    /// session re-asserts both.
    pub fn check_status(&mut self) -> Result<Vec<Event>> {
        let state = self.db.load_session_state()?;
        let now = now_ms();

        if state.is_expired(now) {
            tracing::info!("session deadline elapsed; expiring");
            return self.end_session(SessionOutcome::Completed);
        }

        if state.is_focusing {
            let remaining_min = state.remaining_ms(now) as f64 / 60_000.0;
            self.trigger.arm(remaining_min);
            let event = self.activate_rules()?;
            Ok(vec![event])
        } else {
            let event = self.clear_rules()?;
            Ok(vec![event])
        }
    }

    /// React to a timer fire. Unknown or stale names are ignored.
    pub fn on_trigger(&mut self, fire: TriggerFire) -> Result<Vec<Event>> {
        if fire.name != FOCUS_TIMER {
            tracing::debug!(name = %fire.name, "ignoring fire for unknown trigger");
            return Ok(Vec::new());
        }
        self.check_status()
    }

    /// Current state as a snapshot event. Read-only.
    pub fn snapshot(&self) -> Result<Event> {
        let state = self.db.load_session_state()?;
        let list = self.db.load_block_list()?;
        let remaining_ms = state.remaining_ms(now_ms());
        Ok(Event::StateSnapshot {
            is_focusing: state.is_focusing,
            end_time: state.end_time,
            remaining_ms,
            countdown: format_countdown(remaining_ms),
            blocked_sites: list.sites().len(),
            blocked_keywords: list.keywords().len(),
            at: Utc::now(),
        })
    }

    fn end_session(&mut self, outcome: SessionOutcome) -> Result<Vec<Event>> {
        let now = Utc::now();
        self.db.save_session_state(&SessionState::idle())?;
        self.db.finish_session(outcome, now)?;

        self.trigger.disarm();
        let cleared = self.clear_rules()?;

        tracing::info!(?outcome, "focus session ended");
        let event = match outcome {
            SessionOutcome::Completed => Event::FocusExpired { at: now },
            _ => Event::FocusStopped { at: now },
        };
        Ok(vec![event, cleared])
    }

    /// Compile the block-list and swap it in as the full active rule set.
    fn activate_rules(&mut self) -> Result<Event> {
        let list = self.db.load_block_list()?;
        let rules = compile(list.sites(), list.keywords());
        let remove = self.engine.active_rule_ids();
        let (removed, added) = (remove.len(), rules.len());
        self.engine.replace_rules(&remove, rules)?;
        Ok(Event::RulesActivated {
            removed,
            added,
            at: Utc::now(),
        })
    }

    /// Replace the active rule set with the empty set.
    fn clear_rules(&mut self) -> Result<Event> {
        let remove = self.engine.active_rule_ids();
        let removed = remove.len();
        self.engine.replace_rules(&remove, Vec::new())?;
        Ok(Event::RulesCleared {
            removed,
            at: Utc::now(),
        })
    }
}
