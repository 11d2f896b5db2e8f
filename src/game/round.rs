//! Round State Machine
//!
//! Drives a round through Idle → Running → Ended (→ Running again on
//! auto-restart). Every handler runs to completion synchronously and returns
//! the effects it produced, in order; state that decides the round outcome is
//! updated before any effect is handed out, so two finds for the same object
//! can never both be credited.
//!
//! Timers are armed through a [`Scheduler`]. Each firing carries the round
//! number it was armed for and is dropped if that round is no longer current.

use std::time::Duration;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::location::ObjectLocation;
use crate::core::rng::DeterministicRng;
use crate::game::config::RoundConfig;
use crate::game::effects::{Appearance, Effect, PlacedObject, PALETTE_SIZE};
use crate::game::leaderboard::rank;
use crate::game::messages::{self, BONUS_FIND_MESSAGE, FIND_MESSAGES};
use crate::game::state::{PlayerId, RoundPhase, RoundState};

/// Timers owned by the round machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// One-shot round deadline.
    Deadline,
    /// Repeating status broadcast.
    Status,
    /// One-shot delayed restart after a round ends.
    Autorestart,
}

impl TimerKind {
    /// All timer kinds.
    pub const ALL: [TimerKind; 3] = [TimerKind::Deadline, TimerKind::Status, TimerKind::Autorestart];
}

/// Arms and disarms timers on behalf of the round machine.
///
/// A firing must be delivered back as [`RoundMachine::on_timer`] with the
/// same kind and round number.
pub trait Scheduler {
    /// Arm `timer` to fire after `delay` (and every `delay` after that when
    /// `repeat` is set). Replaces an armed timer of the same kind.
    fn arm(&mut self, timer: TimerKind, round: u64, delay: Duration, repeat: bool);

    /// Disarm `timer`. Disarming a timer that is not armed is a no-op.
    fn disarm(&mut self, timer: TimerKind);
}

/// Why a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Every active object was found.
    AllFound,
    /// The deadline fired.
    TimeUp,
    /// Stopped by command, auto-restart still allowed.
    Stopped,
    /// Stopped by command; no auto-restart.
    Forced,
}

/// Read-only view of the round for status reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Current phase.
    pub phase: RoundPhase,
    /// Round sequence number.
    pub round: u64,
    /// Active locations.
    pub active: Vec<ObjectLocation>,
    /// Objects found so far.
    pub found: usize,
    /// Time left before the deadline, while running.
    pub remaining_ms: Option<i64>,
    /// Scores in first-find order.
    pub scores: Vec<(PlayerId, u32)>,
    /// Bonus object finder, if found.
    pub bonus_finder: Option<PlayerId>,
    /// An auto-restart is armed.
    pub autorestart_pending: bool,
}

/// The round state machine.
pub struct RoundMachine {
    config: RoundConfig,
    state: RoundState,
    session_seed: u64,
    rng: DeterministicRng,
    autorestart_pending: bool,
}

impl RoundMachine {
    /// Create an idle machine.
    pub fn new(config: RoundConfig, session_seed: u64) -> Self {
        Self {
            config,
            state: RoundState::default(),
            session_seed,
            rng: DeterministicRng::new(session_seed),
            autorestart_pending: false,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Current round state.
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    /// Is an auto-restart armed?
    pub fn autorestart_pending(&self) -> bool {
        self.autorestart_pending
    }

    /// Milliseconds until the deadline, while running.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<i64> {
        if self.state.phase != RoundPhase::Running {
            return None;
        }
        let started = i64::try_from(self.state.started_at_ms).unwrap_or(i64::MAX);
        let duration = i64::try_from(self.config.round_duration.as_millis()).unwrap_or(i64::MAX);
        let now = i64::try_from(now_ms).unwrap_or(i64::MAX);
        Some(started.saturating_add(duration).saturating_sub(now))
    }

    /// Snapshot for status queries.
    pub fn snapshot(&self, now_ms: u64) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.state.phase,
            round: self.state.round,
            active: self.state.active.iter().copied().collect(),
            found: self.state.found.len(),
            remaining_ms: self.remaining_ms(now_ms),
            scores: self.state.scores_in_find_order(),
            bonus_finder: self.state.bonus_finder,
            autorestart_pending: self.autorestart_pending,
        }
    }

    /// Replace the candidate set. A running round keeps the set it started with.
    pub fn reload_candidates(&mut self, candidates: Vec<ObjectLocation>) {
        info!("Candidate set reloaded: {} locations", candidates.len());
        self.config.candidates = candidates;
    }

    /// Start a round. Ignored while a round is already running.
    pub fn start_round(&mut self, now_ms: u64, scheduler: &mut impl Scheduler) -> Vec<Effect> {
        if self.state.phase == RoundPhase::Running {
            debug!("Start ignored: round {} already running", self.state.round);
            return Vec::new();
        }

        for timer in TimerKind::ALL {
            scheduler.disarm(timer);
        }
        self.autorestart_pending = false;

        self.state.round += 1;
        self.rng = DeterministicRng::for_round(self.session_seed, self.state.round);

        let amount = self.config.hunt_amount();
        let chosen = self.rng.sample(&self.config.candidates, amount);
        let bonus = self.rng.choose(&chosen).copied();

        let objects: Vec<PlacedObject> = chosen.iter()
            .map(|&location| {
                let appearance = if Some(location) == bonus {
                    Appearance::Golden
                } else {
                    Appearance::Palette { color_index: self.rng.next_index(PALETTE_SIZE) as u8 }
                };
                PlacedObject { location, appearance }
            })
            .collect();

        self.state.reset_progress();
        self.state.phase = RoundPhase::Running;
        self.state.candidates = self.config.candidates.clone();
        self.state.active = chosen.into_iter().collect();
        self.state.bonus = bonus;
        self.state.started_at_ms = now_ms;

        let round = self.state.round;
        scheduler.arm(TimerKind::Deadline, round, self.config.round_duration, false);
        if !self.config.status_tick.is_zero() {
            scheduler.arm(TimerKind::Status, round, self.config.status_tick, true);
        }

        info!("Round {} started with {} objects", round, objects.len());

        let placed = objects.len();
        let mut effects = Vec::with_capacity(2);
        if !objects.is_empty() {
            effects.push(Effect::PlaceObjects { objects, extent: self.config.object_extent });
        }
        effects.push(Effect::announce(messages::round_started(placed)));
        effects
    }

    /// Credit a find. Anything but the first find of an active object in a
    /// running round is a no-op.
    pub fn register_find(
        &mut self,
        player: PlayerId,
        player_name: &str,
        location: ObjectLocation,
        now_ms: u64,
        scheduler: &mut impl Scheduler,
    ) -> Vec<Effect> {
        if !self.state.is_claimable(&location) {
            return Vec::new();
        }

        self.state.found.insert(location);
        let count = self.state.credit(player, player_name);
        let is_bonus = self.state.bonus == Some(location);

        let message = if is_bonus {
            BONUS_FIND_MESSAGE
        } else {
            self.rng.choose(FIND_MESSAGES).copied().unwrap_or(BONUS_FIND_MESSAGE)
        };

        let mut effects = vec![Effect::notify(player, message.render(count))];

        if is_bonus {
            self.state.bonus_finder = Some(player);
            info!("Player {} found the bonus object at {}", player.short(), location);
            effects.push(Effect::announce(messages::bonus_found(player_name)));
        }

        effects.push(Effect::clear(location, self.config.object_extent));

        if self.state.is_complete() {
            self.end_round(EndReason::AllFound, now_ms, scheduler, &mut effects);
        }

        effects
    }

    /// Stop the current round on request.
    ///
    /// Always cancels a pending auto-restart. A forced stop ends without a
    /// leaderboard (unless the config says otherwise) and never restarts.
    pub fn stop_round(&mut self, forced: bool, now_ms: u64, scheduler: &mut impl Scheduler) -> Vec<Effect> {
        scheduler.disarm(TimerKind::Autorestart);
        self.autorestart_pending = false;

        let mut effects = Vec::new();
        match self.state.phase {
            RoundPhase::Running => {
                let reason = if forced { EndReason::Forced } else { EndReason::Stopped };
                self.end_round(reason, now_ms, scheduler, &mut effects);
            }
            RoundPhase::Ended if forced => {
                self.state.phase = RoundPhase::Idle;
            }
            _ => debug!("Stop with no round running"),
        }
        effects
    }

    /// Deliver a timer firing.
    pub fn on_timer(
        &mut self,
        timer: TimerKind,
        round: u64,
        now_ms: u64,
        scheduler: &mut impl Scheduler,
    ) -> Vec<Effect> {
        if round != self.state.round {
            debug!("Dropping stale {:?} timer for round {} (current {})", timer, round, self.state.round);
            return Vec::new();
        }

        let mut effects = Vec::new();
        match (timer, self.state.phase) {
            (TimerKind::Deadline, RoundPhase::Running) => {
                self.end_round(EndReason::TimeUp, now_ms, scheduler, &mut effects);
            }
            (TimerKind::Status, RoundPhase::Running) => {
                let remaining_ms = self.remaining_ms(now_ms).unwrap_or(0);
                effects.push(Effect::announce(messages::status(self.state.remaining(), remaining_ms)));
            }
            (TimerKind::Autorestart, RoundPhase::Ended) if self.autorestart_pending => {
                self.autorestart_pending = false;
                effects = self.start_round(now_ms, scheduler);
            }
            _ => debug!("Ignoring {:?} timer in phase {:?}", timer, self.state.phase),
        }
        effects
    }

    /// Running → Ended. Does nothing unless a round is running.
    fn end_round(
        &mut self,
        reason: EndReason,
        now_ms: u64,
        scheduler: &mut impl Scheduler,
        effects: &mut Vec<Effect>,
    ) {
        if self.state.phase != RoundPhase::Running {
            return;
        }

        scheduler.disarm(TimerKind::Deadline);
        scheduler.disarm(TimerKind::Status);

        let forced = reason == EndReason::Forced;
        if !forced || self.config.announce_forced_results {
            let header = match reason {
                EndReason::AllFound => {
                    let elapsed = now_ms.saturating_sub(self.state.started_at_ms) as i64;
                    messages::all_found_header(elapsed)
                }
                EndReason::TimeUp => messages::TIME_UP_HEADER.to_string(),
                EndReason::Stopped | EndReason::Forced => messages::STOPPED_HEADER.to_string(),
            };
            effects.push(Effect::announce(header));

            for standing in rank(self.state.scores_in_find_order(), self.state.bonus_finder) {
                let name = self.state.name_of(&standing.player_id).unwrap_or("unknown");
                effects.push(Effect::announce(messages::standing_line(&standing, name)));
            }
        }

        for &center in &self.state.candidates {
            effects.push(Effect::clear(center, self.config.object_extent));
        }

        info!(
            "Round {} ended ({:?}): {}/{} found by {} players",
            self.state.round,
            reason,
            self.state.found.len(),
            self.state.active.len(),
            self.state.tallies.len(),
        );

        self.state.reset_progress();
        self.state.phase = if forced { RoundPhase::Idle } else { RoundPhase::Ended };

        if !forced && self.config.autorestart_enabled() {
            scheduler.arm(TimerKind::Autorestart, self.state.round, self.config.autorestart_delay, false);
            self.autorestart_pending = true;
            debug!("Auto-restart armed for {:?}", self.config.autorestart_delay);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use proptest::prelude::*;
    use crate::core::location::Extent;

    /// Records armed timers instead of running them.
    #[derive(Default)]
    struct ManualScheduler {
        armed: BTreeMap<TimerKind, (u64, Duration, bool)>,
    }

    impl Scheduler for ManualScheduler {
        fn arm(&mut self, timer: TimerKind, round: u64, delay: Duration, repeat: bool) {
            self.armed.insert(timer, (round, delay, repeat));
        }

        fn disarm(&mut self, timer: TimerKind) {
            self.armed.remove(&timer);
        }
    }

    fn candidates(n: i32) -> Vec<ObjectLocation> {
        (0..n).map(|i| ObjectLocation::new(i * 10, 0, 5)).collect()
    }

    fn config(n: i32, fraction: f64) -> RoundConfig {
        RoundConfig {
            candidates: candidates(n),
            object_extent: Extent::new(5, 5, 6),
            hunt_fraction: fraction,
            round_duration: Duration::from_secs(120),
            status_tick: Duration::from_secs(30),
            ..Default::default()
        }
    }

    fn pid(n: u8) -> PlayerId {
        PlayerId::new([n; 16])
    }

    fn active(machine: &RoundMachine) -> Vec<ObjectLocation> {
        machine.state().active.iter().copied().collect()
    }

    fn announcements(effects: &[Effect]) -> Vec<&str> {
        effects.iter()
            .filter_map(|e| match e {
                Effect::Announce { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn count_headers(effects: &[Effect]) -> usize {
        announcements(effects).iter().filter(|t| t.ends_with("Results:")).count()
    }

    #[test]
    fn test_start_places_objects_and_arms_timers() {
        let mut machine = RoundMachine::new(config(10, 0.5), 1);
        let mut sched = ManualScheduler::default();

        let effects = machine.start_round(1_000, &mut sched);

        assert_eq!(machine.phase(), RoundPhase::Running);
        assert_eq!(machine.state().active.len(), 5);
        assert!(machine.state().active.iter().all(|l| machine.config().candidates.contains(l)));
        assert!(machine.state().active.contains(&machine.state().bonus.unwrap()));

        match &effects[0] {
            Effect::PlaceObjects { objects, extent } => {
                assert_eq!(objects.len(), 5);
                assert_eq!(*extent, Extent::new(5, 5, 6));
                let golden: Vec<_> = objects.iter()
                    .filter(|o| o.appearance == Appearance::Golden)
                    .collect();
                assert_eq!(golden.len(), 1);
                assert_eq!(Some(golden[0].location), machine.state().bonus);
            }
            other => panic!("expected placement, got {:?}", other),
        }
        assert_eq!(
            announcements(&effects),
            vec!["Egg hunt! 5 eggs have been placed. Whoever finds the most wins!"]
        );

        assert_eq!(sched.armed[&TimerKind::Deadline], (1, Duration::from_secs(120), false));
        assert_eq!(sched.armed[&TimerKind::Status], (1, Duration::from_secs(30), true));
        assert!(!sched.armed.contains_key(&TimerKind::Autorestart));
    }

    #[test]
    fn test_start_is_deterministic_per_seed() {
        let mut a = RoundMachine::new(config(30, 0.3), 99);
        let mut b = RoundMachine::new(config(30, 0.3), 99);
        let mut sched = ManualScheduler::default();

        a.start_round(0, &mut sched);
        b.start_round(0, &mut sched);

        assert_eq!(active(&a), active(&b));
        assert_eq!(a.state().bonus, b.state().bonus);
    }

    #[test]
    fn test_start_while_running_ignored() {
        let mut machine = RoundMachine::new(config(4, 1.0), 1);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        let before = active(&machine);

        let effects = machine.start_round(10, &mut sched);

        assert!(effects.is_empty());
        assert_eq!(machine.state().round, 1);
        assert_eq!(active(&machine), before);
    }

    #[test]
    fn test_find_outside_round_ignored() {
        let mut machine = RoundMachine::new(config(4, 2.0), 1);
        let mut sched = ManualScheduler::default();

        // Idle
        let loc = candidates(4)[0];
        assert!(machine.register_find(pid(1), "a", loc, 0, &mut sched).is_empty());

        machine.start_round(0, &mut sched);
        let inactive = candidates(4).into_iter()
            .find(|l| !machine.state().active.contains(l))
            .unwrap();
        assert!(machine.register_find(pid(1), "a", inactive, 0, &mut sched).is_empty());
        assert!(machine.register_find(pid(1), "a", ObjectLocation::new(1, 2, 3), 0, &mut sched).is_empty());
        assert!(machine.state().tallies.is_empty());
    }

    #[test]
    fn test_duplicate_find_is_idempotent() {
        let mut machine = RoundMachine::new(config(5, 5.0), 4);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        let loc = active(&machine)[0];

        let first = machine.register_find(pid(1), "a", loc, 10, &mut sched);
        let tallies = machine.state().tallies.clone();
        let found = machine.state().found.clone();

        let second = machine.register_find(pid(2), "b", loc, 20, &mut sched);

        assert!(!first.is_empty());
        assert!(second.is_empty());
        assert_eq!(machine.state().tallies, tallies);
        assert_eq!(machine.state().found, found);
        assert_eq!(machine.state().count_for(&pid(1)), 1);
    }

    #[test]
    fn test_find_effects_order() {
        let mut machine = RoundMachine::new(config(3, 2.0), 8);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        let bonus = machine.state().bonus.unwrap();

        let effects = machine.register_find(pid(1), "Alice", bonus, 500, &mut sched);

        assert_eq!(
            effects[0],
            Effect::notify(pid(1), "The golden egg! You've found 1 egg.")
        );
        assert_eq!(effects[1], Effect::announce("Alice found the golden egg!"));
        assert_eq!(effects[2], Effect::clear(bonus, Extent::new(5, 5, 6)));
        assert_eq!(effects.len(), 3);
        assert_eq!(machine.state().bonus_finder, Some(pid(1)));
    }

    #[test]
    fn test_completion_ends_once() {
        let mut machine = RoundMachine::new(config(3, 3.0), 3);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        let locs = active(&machine);
        assert_eq!(locs.len(), 3);

        let mut all = Vec::new();
        all.extend(machine.register_find(pid(2), "b", locs[2], 1_000, &mut sched));
        all.extend(machine.register_find(pid(1), "a", locs[2], 1_100, &mut sched));
        all.extend(machine.register_find(pid(1), "a", locs[0], 2_000, &mut sched));
        assert_eq!(machine.phase(), RoundPhase::Running);
        all.extend(machine.register_find(pid(1), "a", locs[1], 65_000, &mut sched));
        assert_eq!(machine.phase(), RoundPhase::Ended);
        all.extend(machine.register_find(pid(2), "b", locs[0], 66_000, &mut sched));

        assert_eq!(count_headers(&all), 1);
        assert!(announcements(&all).contains(&"All eggs have been found in 1:05! Results:"));
        assert!(sched.armed.is_empty());
        assert!(machine.state().tallies.is_empty());
        assert!(machine.state().found.is_empty());
    }

    #[test]
    fn test_final_find_precedes_leaderboard_and_clears_all_candidates() {
        let mut machine = RoundMachine::new(config(4, 1.0), 5);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        let loc = active(&machine)[0];

        let effects = machine.register_find(pid(1), "Ann", loc, 3_000, &mut sched);

        let clear_pos = effects.iter().position(|e| *e == Effect::clear(loc, Extent::new(5, 5, 6))).unwrap();
        let header_pos = effects.iter()
            .position(|e| matches!(e, Effect::Announce { text } if text.ends_with("Results:")))
            .unwrap();
        assert!(matches!(effects[0], Effect::Notify { .. }));
        assert!(clear_pos < header_pos);

        let clears = effects[header_pos..].iter()
            .filter(|e| matches!(e, Effect::ClearRegion { .. }))
            .count();
        assert_eq!(clears, 4);
        assert!(announcements(&effects).contains(&"1) Ann (golden egg), 1 egg"));
    }

    #[test]
    fn test_deadline_ends_with_time_up() {
        let mut machine = RoundMachine::new(config(6, 6.0), 2);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        let locs = active(&machine);
        machine.register_find(pid(1), "a", locs[0], 10, &mut sched);
        machine.register_find(pid(2), "b", locs[1], 20, &mut sched);
        machine.register_find(pid(2), "b", locs[2], 30, &mut sched);

        let effects = machine.on_timer(TimerKind::Deadline, 1, 120_000, &mut sched);
        let lines = announcements(&effects);

        assert_eq!(lines[0], "Time's up! Results:");
        assert!(lines[1].starts_with("1) b"));
        assert!(lines[2].starts_with("2) a"));
        assert_eq!(machine.phase(), RoundPhase::Ended);
        assert!(sched.armed.is_empty());
    }

    #[test]
    fn test_deadline_after_completion_is_noop() {
        let mut machine = RoundMachine::new(config(1, 1.0), 2);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        let loc = active(&machine)[0];
        machine.register_find(pid(1), "a", loc, 10, &mut sched);

        let late = machine.on_timer(TimerKind::Deadline, 1, 120_000, &mut sched);
        assert!(late.is_empty());
        assert_eq!(machine.phase(), RoundPhase::Ended);
    }

    #[test]
    fn test_stale_timer_from_previous_round_dropped() {
        let mut machine = RoundMachine::new(config(4, 1.0), 2);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        machine.stop_round(true, 5, &mut sched);
        machine.start_round(10, &mut sched);
        assert_eq!(machine.state().round, 2);

        assert!(machine.on_timer(TimerKind::Deadline, 1, 120_000, &mut sched).is_empty());
        assert!(machine.on_timer(TimerKind::Status, 1, 30_000, &mut sched).is_empty());
        assert_eq!(machine.phase(), RoundPhase::Running);
    }

    #[test]
    fn test_status_tick() {
        let mut machine = RoundMachine::new(config(3, 3.0), 2);
        let mut sched = ManualScheduler::default();
        machine.start_round(1_000, &mut sched);
        let loc = active(&machine)[0];
        machine.register_find(pid(1), "a", loc, 2_000, &mut sched);

        let effects = machine.on_timer(TimerKind::Status, 1, 61_000, &mut sched);
        assert_eq!(effects, vec![Effect::announce("2 eggs remain! 1:00 left.")]);
        assert_eq!(machine.snapshot(61_000).remaining_ms, Some(60_000));
    }

    #[test]
    fn test_remaining_time_saturates_for_huge_durations() {
        let mut cfg = config(3, 3.0);
        cfg.round_duration = Duration::from_secs(u64::MAX / 100);
        let mut machine = RoundMachine::new(cfg, 2);
        let mut sched = ManualScheduler::default();
        machine.start_round(1_000, &mut sched);

        let remaining = machine.remaining_ms(2_000).unwrap();
        assert!(remaining > 0);
        assert_eq!(remaining, i64::MAX - 2_000);
    }

    #[test]
    fn test_autorestart_after_end() {
        let mut cfg = config(4, 2.0);
        cfg.autorestart_delay = Duration::from_secs(1);
        let mut machine = RoundMachine::new(cfg, 6);
        let mut sched = ManualScheduler::default();

        machine.start_round(0, &mut sched);
        let loc = active(&machine)[0];
        machine.register_find(pid(1), "a", loc, 10, &mut sched);
        machine.on_timer(TimerKind::Deadline, 1, 120_000, &mut sched);

        assert_eq!(machine.phase(), RoundPhase::Ended);
        assert!(machine.autorestart_pending());
        assert_eq!(sched.armed[&TimerKind::Autorestart], (1, Duration::from_secs(1), false));

        let effects = machine.on_timer(TimerKind::Autorestart, 1, 121_000, &mut sched);
        assert_eq!(machine.phase(), RoundPhase::Running);
        assert_eq!(machine.state().round, 2);
        assert!(machine.state().tallies.is_empty());
        assert!(!machine.autorestart_pending());
        assert!(matches!(effects[0], Effect::PlaceObjects { .. }));
    }

    #[test]
    fn test_stop_cancels_pending_autorestart() {
        let mut cfg = config(4, 2.0);
        cfg.autorestart_delay = Duration::from_secs(1);
        let mut machine = RoundMachine::new(cfg, 6);
        let mut sched = ManualScheduler::default();

        machine.start_round(0, &mut sched);
        machine.on_timer(TimerKind::Deadline, 1, 120_000, &mut sched);
        assert!(machine.autorestart_pending());

        let effects = machine.stop_round(true, 120_500, &mut sched);
        assert!(effects.is_empty());
        assert!(!sched.armed.contains_key(&TimerKind::Autorestart));
        assert_eq!(machine.phase(), RoundPhase::Idle);

        // A firing that was already in flight does nothing.
        assert!(machine.on_timer(TimerKind::Autorestart, 1, 121_000, &mut sched).is_empty());
        assert_eq!(machine.phase(), RoundPhase::Idle);
    }

    #[test]
    fn test_explicit_start_cancels_pending_autorestart() {
        let mut cfg = config(4, 2.0);
        cfg.autorestart_delay = Duration::from_secs(1);
        let mut machine = RoundMachine::new(cfg, 6);
        let mut sched = ManualScheduler::default();

        machine.start_round(0, &mut sched);
        machine.on_timer(TimerKind::Deadline, 1, 120_000, &mut sched);
        machine.start_round(120_200, &mut sched);

        assert!(!machine.autorestart_pending());
        assert!(!sched.armed.contains_key(&TimerKind::Autorestart));
        assert!(machine.on_timer(TimerKind::Autorestart, 1, 121_000, &mut sched).is_empty());
        assert_eq!(machine.state().round, 2);
    }

    #[test]
    fn test_forced_stop_is_silent_and_clears() {
        let mut cfg = config(4, 2.0);
        cfg.autorestart_delay = Duration::from_secs(1);
        let mut machine = RoundMachine::new(cfg, 6);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);
        let loc = active(&machine)[0];
        machine.register_find(pid(1), "a", loc, 10, &mut sched);

        let effects = machine.stop_round(true, 50, &mut sched);

        assert!(announcements(&effects).is_empty());
        assert_eq!(effects.len(), 4);
        assert!(effects.iter().all(|e| matches!(e, Effect::ClearRegion { .. })));
        assert!(sched.armed.is_empty());
        assert_eq!(machine.phase(), RoundPhase::Idle);
        assert!(!machine.autorestart_pending());
    }

    #[test]
    fn test_forced_stop_with_results_policy() {
        let mut cfg = config(4, 2.0);
        cfg.announce_forced_results = true;
        let mut machine = RoundMachine::new(cfg, 6);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);

        let effects = machine.stop_round(true, 50, &mut sched);
        assert_eq!(announcements(&effects), vec!["The egg hunt was stopped. Results:"]);
    }

    #[test]
    fn test_graceful_stop_allows_autorestart() {
        let mut cfg = config(4, 2.0);
        cfg.autorestart_delay = Duration::from_secs(2);
        let mut machine = RoundMachine::new(cfg, 6);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);

        let effects = machine.stop_round(false, 50, &mut sched);
        assert_eq!(count_headers(&effects), 1);
        assert_eq!(machine.phase(), RoundPhase::Ended);
        assert!(machine.autorestart_pending());
    }

    #[test]
    fn test_reload_does_not_touch_running_round() {
        let mut machine = RoundMachine::new(config(3, 1.0), 1);
        let mut sched = ManualScheduler::default();
        machine.start_round(0, &mut sched);

        machine.reload_candidates(vec![ObjectLocation::new(99, 99, 99)]);

        let effects = machine.stop_round(true, 10, &mut sched);
        let cleared: Vec<_> = effects.iter()
            .filter_map(|e| match e {
                Effect::ClearRegion { center, .. } => Some(*center),
                _ => None,
            })
            .collect();
        assert_eq!(cleared, candidates(3));

        machine.start_round(20, &mut sched);
        assert_eq!(active(&machine), vec![ObjectLocation::new(99, 99, 99)]);
    }

    #[test]
    fn test_empty_candidate_set() {
        let mut machine = RoundMachine::new(config(0, 1.0), 1);
        let mut sched = ManualScheduler::default();

        let effects = machine.start_round(0, &mut sched);
        assert_eq!(effects, vec![Effect::announce(messages::round_started(0))]);
        assert_eq!(machine.state().bonus, None);

        let end = machine.on_timer(TimerKind::Deadline, 1, 120_000, &mut sched);
        assert_eq!(announcements(&end), vec!["Time's up! Results:"]);
    }

    proptest! {
        #[test]
        fn prop_found_subset_of_active(
            seed in any::<u64>(),
            finds in proptest::collection::vec((0u8..4, 0i32..12), 0..60),
        ) {
            let mut machine = RoundMachine::new(config(12, 0.5), seed);
            let mut sched = ManualScheduler::default();
            machine.start_round(0, &mut sched);

            let mut ends = 0;
            for (i, (player, idx)) in finds.into_iter().enumerate() {
                let loc = ObjectLocation::new(idx * 10, 0, 5);
                let effects = machine.register_find(pid(player), "p", loc, i as u64, &mut sched);
                ends += count_headers(&effects);

                let state = machine.state();
                prop_assert!(state.found.is_subset(&state.active));
                let total: u32 = state.tallies.values().map(|t| t.count).sum();
                prop_assert_eq!(total as usize, state.found.len());
            }
            prop_assert!(ends <= 1);
        }
    }
}
