//! Hunt Service
//!
//! Owns the round machine and drives it from one loop: host stimuli and timer
//! firings are handled one at a time, to completion, and the resulting
//! requests are forwarded to the host in the order they were produced.

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::core::location::ObjectLocation;
use crate::core::time::{now_ms, time_format};
use crate::game::effects::Effect;
use crate::game::messages::eggs;
use crate::game::round::{RoundMachine, RoundSnapshot};
use crate::game::state::RoundPhase;
use crate::service::command::HuntCommand;
use crate::service::protocol::{Outbound, PlayerRef, Stimulus};
use crate::service::scheduler::{TimerFired, TokioScheduler};
use crate::service::settings::{HuntSettings, SettingsError};
use crate::service::store::{CandidateStore, StoreError};
use crate::world::save::{scan_candidates, SaveData};

/// Service errors. Only failures that make the loop unable to continue.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Candidate store failure at startup.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid settings.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The host side of the outbox is gone.
    #[error("outbox closed")]
    OutboxClosed,
}

/// The running hunt.
pub struct HuntService {
    settings: HuntSettings,
    machine: RoundMachine,
    store: CandidateStore,
    scheduler: TokioScheduler,
    timers: mpsc::UnboundedReceiver<TimerFired>,
    outbox: mpsc::Sender<Outbound>,
}

impl HuntService {
    /// Create a service, loading the candidate set from the settings' store.
    pub async fn new(settings: HuntSettings, outbox: mpsc::Sender<Outbound>) -> Result<Self, ServiceError> {
        let store = CandidateStore::new(settings.storage_path.clone());
        let candidates = store.load().await?;
        Self::with_candidates(settings, candidates, outbox)
    }

    /// Create a service with a known candidate set.
    pub fn with_candidates(
        settings: HuntSettings,
        candidates: Vec<ObjectLocation>,
        outbox: mpsc::Sender<Outbound>,
    ) -> Result<Self, ServiceError> {
        let config = settings.round_config(candidates)?;
        let seed = settings.rng_seed.unwrap_or_else(now_ms);
        let (scheduler, timers) = TokioScheduler::new();
        info!("Hunt service ready: {} candidates, seed {}", config.candidates.len(), seed);

        Ok(Self {
            store: CandidateStore::new(settings.storage_path.clone()),
            machine: RoundMachine::new(config, seed),
            settings,
            scheduler,
            timers,
            outbox,
        })
    }

    /// The round machine (read-only).
    pub fn machine(&self) -> &RoundMachine {
        &self.machine
    }

    /// Current round snapshot.
    pub fn snapshot(&self) -> RoundSnapshot {
        self.machine.snapshot(now_ms())
    }

    /// Run until the host shuts the hunt down or the inbox closes.
    ///
    /// A round still running at shutdown is force-stopped so its objects are
    /// cleared.
    #[instrument(skip_all)]
    pub async fn run(mut self, mut inbox: mpsc::Receiver<Stimulus>) -> Result<(), ServiceError> {
        loop {
            tokio::select! {
                msg = inbox.recv() => match msg {
                    Some(Stimulus::Shutdown) | None => {
                        info!("Shutting down");
                        break;
                    }
                    Some(stimulus) => self.handle_stimulus(stimulus).await?,
                },
                Some(fired) = self.timers.recv() => self.handle_timer(fired).await?,
            }
        }

        let effects = self.machine.stop_round(true, now_ms(), &mut self.scheduler);
        self.dispatch(effects).await
    }

    /// Handle one host message.
    pub async fn handle_stimulus(&mut self, stimulus: Stimulus) -> Result<(), ServiceError> {
        match stimulus {
            Stimulus::Interact { player, position } => {
                let effects = self.machine.register_find(
                    player.id,
                    &player.name,
                    position,
                    now_ms(),
                    &mut self.scheduler,
                );
                self.dispatch(effects).await
            }
            Stimulus::Command { speaker, is_host, subcommand, save } => {
                self.handle_command(speaker, is_host, &subcommand, save).await
            }
            Stimulus::Shutdown => Ok(()),
        }
    }

    /// Handle one timer firing.
    pub async fn handle_timer(&mut self, fired: TimerFired) -> Result<(), ServiceError> {
        let effects = self.machine.on_timer(fired.timer, fired.round, now_ms(), &mut self.scheduler);
        self.dispatch(effects).await
    }

    async fn handle_command(
        &mut self,
        speaker: PlayerRef,
        is_host: bool,
        subcommand: &str,
        save: Option<SaveData>,
    ) -> Result<(), ServiceError> {
        let command: HuntCommand = match subcommand.parse() {
            Ok(command) => command,
            Err(e) => {
                return self.dispatch(vec![Effect::notify(speaker.id, e.to_string())]).await;
            }
        };

        if !self.settings.is_authorized(&speaker.id, is_host) {
            debug!("Unauthorized {:?} from {}", command, speaker.id.short());
            return Ok(());
        }

        info!("{} ran {:?}", speaker.name, command);
        let now = now_ms();
        let effects = match command {
            HuntCommand::Start => self.machine.start_round(now, &mut self.scheduler),
            HuntCommand::Stop => self.machine.stop_round(true, now, &mut self.scheduler),
            HuntCommand::Load => self.load_candidates(&speaker, save).await,
            HuntCommand::Insert => {
                let config = self.machine.config();
                let count = config.candidates.len();
                vec![
                    Effect::PlaceTemplates {
                        locations: config.candidates.clone(),
                        extent: config.object_extent,
                        owner: speaker.id,
                        owner_name: speaker.name.clone(),
                    },
                    Effect::notify(speaker.id, format!("Reinserted {} template {}.", count, noun(count))),
                ]
            }
            HuntCommand::Delete => {
                // Stopping a running round already clears the candidates it
                // started with.
                let config = self.machine.config();
                let state = self.machine.state();
                let running = state.phase == RoundPhase::Running;
                let mut effects: Vec<Effect> = config.candidates.iter()
                    .filter(|center| !running || !state.candidates.contains(*center))
                    .map(|&center| Effect::clear(center, config.object_extent))
                    .collect();
                effects.push(Effect::notify(speaker.id, "Deleted all eggs."));
                effects.extend(self.machine.stop_round(true, now, &mut self.scheduler));
                effects
            }
            HuntCommand::Status => {
                let text = status_summary(&self.machine.snapshot(now), &speaker);
                vec![Effect::notify(speaker.id, text)]
            }
        };

        self.dispatch(effects).await
    }

    /// Rescan the attached save. Any failure leaves the current candidate set
    /// untouched.
    async fn load_candidates(&mut self, speaker: &PlayerRef, save: Option<SaveData>) -> Vec<Effect> {
        let Some(save) = save else {
            return vec![Effect::notify(speaker.id, "No world save was attached to the load request.")];
        };

        let scanned = self.settings.template_signature()
            .map_err(|e| e.to_string())
            .and_then(|signature| scan_candidates(&save, &signature).map_err(|e| e.to_string()));

        let candidates = match scanned {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Candidate scan failed: {}", e);
                return vec![Effect::notify(speaker.id, format!("Could not load eggs: {}.", e))];
            }
        };

        if let Err(e) = self.store.save(&candidates).await {
            error!("Failed to persist candidates: {}", e);
            return vec![Effect::notify(speaker.id, "Could not store eggs; keeping the previous set.")];
        }

        let count = candidates.len();
        self.machine.reload_candidates(candidates);
        vec![Effect::notify(speaker.id, format!("Stored {}.", eggs(count)))]
    }

    async fn dispatch(&self, effects: Vec<Effect>) -> Result<(), ServiceError> {
        for effect in effects {
            let outbound = Outbound::from_effect(effect, &self.settings.egg_asset);
            self.outbox.send(outbound).await.map_err(|_| ServiceError::OutboxClosed)?;
        }
        Ok(())
    }
}

fn noun(count: usize) -> &'static str {
    if count == 1 { "egg" } else { "eggs" }
}

/// Whispered reply to `status`.
fn status_summary(snapshot: &RoundSnapshot, speaker: &PlayerRef) -> String {
    match snapshot.phase {
        RoundPhase::Running => {
            let remaining = snapshot.active.len() - snapshot.found;
            let mine = snapshot.scores.iter()
                .find(|(id, _)| *id == speaker.id)
                .map(|(_, count)| *count)
                .unwrap_or(0);
            format!(
                "Round {}: {} of {} left, {} remaining. You've found {}.",
                snapshot.round,
                remaining,
                eggs(snapshot.active.len()),
                time_format(snapshot.remaining_ms.unwrap_or(0)),
                eggs(mine as usize),
            )
        }
        RoundPhase::Ended if snapshot.autorestart_pending => {
            "The next egg hunt starts soon.".to_string()
        }
        _ => "No egg hunt is running.".to_string(),
    }
}
