//! Deferred one-shot session-expiry trigger.
//!
//! A named wake-up in the spirit of a browser alarm: arming schedules a
//! single fire after a delay, arming again replaces the outstanding one,
//! disarming cancels it. Fires are delivered as [`TriggerFire`] messages on
//! a channel so the owner of the event loop decides when to act on them;
//! the controller ignores fires whose name it does not recognize.
//!
//! Trigger state never survives the process. After a restart,
//! `check_status` reconciliation re-arms for the remaining duration.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Name of the sole session-expiry trigger.
pub const FOCUS_TIMER: &str = "focus-timer";

/// Floor applied to every arm delay, in minutes. Avoids the zero/negative
/// degenerate case when re-arming for a nearly elapsed session.
pub const MIN_ARM_MINUTES: f64 = 0.1;

/// Message sent when an armed trigger fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerFire {
    pub name: String,
}

#[derive(Debug)]
struct Armed {
    minutes: f64,
    task: JoinHandle<()>,
}

/// The single named, one-shot deferred trigger.
#[derive(Debug)]
pub struct FocusTrigger {
    tx: UnboundedSender<TriggerFire>,
    armed: Option<Armed>,
}

impl FocusTrigger {
    /// Create a trigger and the receiving end for its fires.
    pub fn new() -> (Self, UnboundedReceiver<TriggerFire>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, armed: None }, rx)
    }

    /// Schedule a fire after `minutes` (fractional allowed, floor-clamped).
    /// Replaces any outstanding trigger.
    ///
    /// Arming requires a running tokio runtime; in a one-shot process with
    /// no event loop the schedule is skipped -- it could never be observed
    /// anyway -- and reconciliation covers expiry.
    pub fn arm(&mut self, minutes: f64) {
        let minutes = if minutes.is_finite() {
            minutes.max(MIN_ARM_MINUTES)
        } else {
            MIN_ARM_MINUTES
        };
        self.disarm();

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(minutes, "no async runtime; trigger left unarmed");
            return;
        };

        let tx = self.tx.clone();
        let task = handle.spawn(async move {
            tokio::time::sleep(Duration::from_secs_f64(minutes * 60.0)).await;
            let _ = tx.send(TriggerFire {
                name: FOCUS_TIMER.to_string(),
            });
        });
        tracing::debug!(minutes, "trigger armed");
        self.armed = Some(Armed { minutes, task });
    }

    /// Cancel the outstanding trigger, if any.
    pub fn disarm(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.task.abort();
            tracing::debug!("trigger disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Delay the outstanding trigger was armed for, if any.
    pub fn armed_minutes(&self) -> Option<f64> {
        self.armed.as_ref().map(|armed| armed.minutes)
    }
}

impl Drop for FocusTrigger {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_the_armed_delay() {
        let (mut trigger, mut fires) = FocusTrigger::new();
        trigger.arm(0.5);
        tokio::time::sleep(Duration::from_secs(31)).await;
        let fire = fires.recv().await.expect("trigger should have fired");
        assert_eq!(fire.name, FOCUS_TIMER);
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_cancels_the_pending_fire() {
        let (mut trigger, mut fires) = FocusTrigger::new();
        trigger.arm(0.5);
        trigger.disarm();
        assert!(!trigger.is_armed());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(fires.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn arming_replaces_the_outstanding_trigger() {
        let (mut trigger, mut fires) = FocusTrigger::new();
        trigger.arm(0.2);
        trigger.arm(2.0);
        assert_eq!(trigger.armed_minutes(), Some(2.0));

        // Past the first deadline: the replaced trigger must not fire.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(fires.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert!(fires.recv().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_floor_clamped() {
        let (mut trigger, mut fires) = FocusTrigger::new();
        trigger.arm(0.0);
        assert_eq!(trigger.armed_minutes(), Some(MIN_ARM_MINUTES));
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert!(fires.recv().await.is_some());
    }

    #[test]
    fn arming_without_a_runtime_is_a_no_op() {
        let (mut trigger, _fires) = FocusTrigger::new();
        trigger.arm(1.0);
        assert!(!trigger.is_armed());
    }
}
