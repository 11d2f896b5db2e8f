//! Tokio Timers
//!
//! [`Scheduler`] backed by spawned tokio tasks. Firings arrive on a channel
//! and are fed back into the round machine by the service loop.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::game::round::{Scheduler, TimerKind};

/// A timer went off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    /// Which timer.
    pub timer: TimerKind,
    /// Round it was armed for.
    pub round: u64,
}

/// One task per armed timer kind.
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<TimerFired>,
    handles: BTreeMap<TimerKind, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its firings arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, handles: BTreeMap::new() }, rx)
    }

    /// Is `timer` armed and not yet finished?
    pub fn is_armed(&self, timer: TimerKind) -> bool {
        self.handles.get(&timer).is_some_and(|h| !h.is_finished())
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&mut self, timer: TimerKind, round: u64, delay: Duration, repeat: bool) {
        self.disarm(timer);

        let Some(first) = Instant::now().checked_add(delay) else {
            warn!("Not arming {:?} for round {}: delay {:?} is out of range", timer, round, delay);
            return;
        };

        let tx = self.tx.clone();
        let fired = TimerFired { timer, round };
        let handle = tokio::spawn(async move {
            if repeat {
                let mut ticker = interval_at(first, delay);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    if tx.send(fired).is_err() {
                        break;
                    }
                }
            } else {
                sleep_until(first).await;
                let _ = tx.send(fired);
            }
        });

        debug!("Armed {:?} for round {} ({:?}, repeat={})", timer, round, delay, repeat);
        self.handles.insert(timer, handle);
    }

    fn disarm(&mut self, timer: TimerKind) {
        if let Some(handle) = self.handles.remove(&timer) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for handle in self.handles.values() {
            handle.abort();
        }
    }
}
