//! Learner-facing facade.
//!
//! Ties the orchestrator to speech capture and the snapshot store. Callers
//! drive it from UI events; every learner-visible change is persisted.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::{Database, ExportBundle, Snapshot};
use crate::error::{Error, Result};
use crate::models::{Accent, NextStep, Session, SessionKind, Settings, UserResponse};
use crate::session::SessionOrchestrator;
use crate::speech::{Capture, Listener, Playback, Speaker, SpeechRecognizer, SpeechSynthesizer};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{info, warn};

/// What happened to one spoken attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PracticeOutcome {
    /// The transcript was scored.
    Scored(UserResponse),
    /// Nothing was heard in time; the item was skipped.
    Skipped,
    /// The learner stopped listening.
    Cancelled,
}

pub struct Tutor {
    orchestrator: SessionOrchestrator,
    settings: Settings,
    db: Option<Database>,
}

impl Tutor {
    /// Resume from the stored snapshot, or start a fresh learner.
    pub fn open(db: Database, catalog: Catalog, config: Config) -> Result<Self> {
        let now = Utc::now();
        let (orchestrator, settings) = match db.load_snapshot()? {
            Some(snapshot) => {
                info!(
                    sessions = snapshot.sessions.len(),
                    saved_at = %snapshot.saved_at,
                    "restoring learner"
                );
                let settings = snapshot.settings.clone();
                (SessionOrchestrator::from_snapshot(catalog, config, snapshot, now), settings)
            }
            None => {
                info!("starting new learner");
                let settings = initial_settings(&config);
                (SessionOrchestrator::from_config(catalog, config, now), settings)
            }
        };

        Ok(Self {
            orchestrator,
            settings,
            db: Some(db),
        })
    }

    /// Open the store in the user data directory with the user config file.
    pub fn open_default(catalog: Catalog) -> Result<Self> {
        let path = Config::db_path()
            .ok_or_else(|| Error::InvalidState("no user data directory".to_string()))?;
        Self::open(Database::open(&path)?, catalog, Config::load())
    }

    /// Tutor without persistence.
    pub fn ephemeral(catalog: Catalog, config: Config, now: DateTime<Utc>) -> Self {
        Self {
            settings: initial_settings(&config),
            orchestrator: SessionOrchestrator::from_config(catalog, config, now),
            db: None,
        }
    }

    pub fn orchestrator(&self) -> &SessionOrchestrator {
        &self.orchestrator
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current learner state.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        self.orchestrator.snapshot(&self.settings, now)
    }

    /// Save the learner state, if a store is attached.
    pub fn persist(&self, now: DateTime<Utc>) -> Result<()> {
        if let Some(db) = &self.db {
            db.save_snapshot(&self.snapshot(now))?;
        }
        Ok(())
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.persist(Utc::now())
    }

    pub fn start_session(&mut self, kind: SessionKind, now: DateTime<Utc>) -> Result<&Session> {
        self.orchestrator.start_session(kind, now)
    }

    /// Start rehearsing one conversation's learner turns.
    pub fn start_conversation(&mut self, conversation: &str, now: DateTime<Utc>) -> Result<&Session> {
        self.orchestrator.start_conversation(conversation, now)
    }

    /// Finish the active session and save.
    pub fn complete_session(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.orchestrator.complete_session(now)?;
        self.persist(now)
    }

    /// Score a typed or externally transcribed answer and save.
    ///
    /// The response is applied before saving. If the save fails the error is
    /// returned but the in-memory state keeps the response; call
    /// [`Tutor::persist`] to retry rather than answering again.
    pub fn respond(
        &mut self,
        item_id: &str,
        spoken_text: &str,
        elapsed_ms: u64,
        now: DateTime<Utc>,
    ) -> Result<UserResponse> {
        let is_current = self
            .orchestrator
            .current_item()
            .is_some_and(|item| item.id == item_id);
        let response = self
            .orchestrator
            .process_response(item_id, spoken_text, elapsed_ms, now)?;
        if is_current && response.next_step == NextStep::Continue {
            self.orchestrator.advance()?;
        }
        self.persist(now)?;
        Ok(response)
    }

    /// Listen for one attempt at `item_id` and score it.
    ///
    /// Memory is only touched when a transcript arrives. Recognizer errors
    /// are returned without side effects.
    pub async fn practice<R: SpeechRecognizer>(
        &mut self,
        item_id: &str,
        listener: &Listener<R>,
    ) -> Result<PracticeOutcome> {
        self.orchestrator.ensure_answerable(item_id)?;

        match listener.listen(self.settings.accent.locale()).await? {
            Capture::Heard { text, elapsed_ms } => {
                let response = self.respond(item_id, &text, elapsed_ms, Utc::now())?;
                Ok(PracticeOutcome::Scored(response))
            }
            Capture::TimedOut => {
                warn!(item_id, "no speech before timeout, skipping");
                self.orchestrator.skip(item_id)?;
                Ok(PracticeOutcome::Skipped)
            }
            Capture::Cancelled => Ok(PracticeOutcome::Cancelled),
        }
    }

    /// Speak an item's French text with the learner's accent and rate.
    pub async fn announce<S: SpeechSynthesizer>(&self, item_id: &str, speaker: &Speaker<S>) -> Result<Playback> {
        let item = self
            .orchestrator
            .catalog()
            .get_by_id(item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))?;

        Ok(speaker
            .speak(&item.french, self.settings.accent.locale(), self.settings.speech_rate)
            .await?)
    }

    /// Write settings and session history as JSON.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let bundle = ExportBundle::new(
            self.settings.clone(),
            self.orchestrator.history().to_vec(),
            Utc::now(),
        );
        bundle.write_to(path)?;
        info!(path = %path.display(), sessions = bundle.sessions.len(), "history exported");
        Ok(())
    }

    /// Merge an exported bundle; returns the number of sessions added.
    ///
    /// Nothing changes unless the whole bundle validates against this
    /// tutor's catalog. A failed save after the merge is reported like in
    /// [`Tutor::respond`]: the merge stands and [`Tutor::persist`] can retry.
    pub fn import_from(&mut self, path: &Path) -> Result<usize> {
        let bundle = ExportBundle::read_from(path)
            .and_then(|bundle| {
                bundle.validate_against(self.orchestrator.catalog())?;
                Ok(bundle)
            })
            .inspect_err(|e| {
                warn!(path = %path.display(), error = %e, "import rejected");
            })?;
        self.settings = bundle.settings;
        let added = self.orchestrator.merge_history(bundle.sessions);
        info!(path = %path.display(), added, "history imported");
        self.persist(Utc::now())?;
        Ok(added)
    }
}

/// Settings for a new learner, seeded from the speech config.
fn initial_settings(config: &Config) -> Settings {
    Settings {
        speech_rate: config.speech.rate,
        accent: Accent::from_locale(&config.speech.locale),
        ..Settings::default()
    }
}
