//! Session orchestration.
//!
//! Picks items for a session, feeds responses through the scorer and the
//! memory model, and folds finished sessions into the learner assessment.

use crate::algorithm::{due_items, get_policy, IntervalPolicy};
use crate::assessment::UserAssessment;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::{Snapshot, SCHEMA_VERSION};
use crate::error::{Error, Result};
use crate::memory::MemoryModel;
use crate::models::{
    CefrLevel, ItemId, LearningItem, Phase, Session, SessionKind, SessionStatus, Settings, UserResponse,
};
use crate::progress::LearnerProgress;
use crate::scorer::{LevenshteinScorer, ResponseScorer, ScoreRequest};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

pub struct SessionOrchestrator {
    catalog: Catalog,
    config: Config,
    policy: Box<dyn IntervalPolicy>,
    scorer: Box<dyn ResponseScorer>,
    memory: MemoryModel,
    assessment: UserAssessment,
    progress: LearnerProgress,
    active: Option<Session>,
    history: Vec<Session>,
}

impl SessionOrchestrator {
    /// Create an orchestrator whose items are introduced at `epoch`.
    pub fn new(
        catalog: Catalog,
        policy: Box<dyn IntervalPolicy>,
        scorer: Box<dyn ResponseScorer>,
        config: Config,
        epoch: DateTime<Utc>,
    ) -> Self {
        let memory = MemoryModel::for_catalog(&catalog, policy.as_ref(), epoch);
        Self {
            catalog,
            config,
            policy,
            scorer,
            memory,
            assessment: UserAssessment::default(),
            progress: LearnerProgress::default(),
            active: None,
            history: Vec::new(),
        }
    }

    /// Orchestrator with the graduated policy and edit-distance scorer.
    pub fn from_config(catalog: Catalog, config: Config, epoch: DateTime<Utc>) -> Self {
        let policy = get_policy("graduated", &config.scheduler);
        let scorer = Box::new(LevenshteinScorer::from_config(&config.scoring));
        Self::new(catalog, policy, scorer, config, epoch)
    }

    /// Resume a learner from a stored snapshot.
    pub fn from_snapshot(catalog: Catalog, config: Config, snapshot: Snapshot, epoch: DateTime<Utc>) -> Self {
        let mut orch = Self::from_config(catalog, config, epoch);
        orch.assessment = snapshot.assessment;
        orch.progress = snapshot.progress;
        orch.history = snapshot.sessions;
        orch.memory.restore(snapshot.memory);
        orch
    }

    /// Learner state for persistence. The active session is not included.
    pub fn snapshot(&self, settings: &Settings, now: DateTime<Utc>) -> Snapshot {
        Snapshot {
            schema_version: SCHEMA_VERSION,
            saved_at: now,
            settings: settings.clone(),
            assessment: self.assessment.clone(),
            progress: self.progress.clone(),
            sessions: self.history.clone(),
            memory: self.memory.to_map(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policy(&self) -> &dyn IntervalPolicy {
        self.policy.as_ref()
    }

    pub fn memory(&self) -> &MemoryModel {
        &self.memory
    }

    pub fn assessment(&self) -> &UserAssessment {
        &self.assessment
    }

    pub fn progress(&self) -> &LearnerProgress {
        &self.progress
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    /// Completed sessions, oldest first.
    pub fn history(&self) -> &[Session] {
        &self.history
    }

    /// Level new sessions draw from.
    pub fn current_level(&self) -> CefrLevel {
        CefrLevel::for_progress(self.assessment.overall_progress)
    }

    /// Due items at `now`, most urgent first.
    pub fn due_items(&self, now: DateTime<Utc>) -> Vec<&LearningItem> {
        due_items(self.policy.as_ref(), &self.catalog, &self.memory, now)
    }

    /// Start a session of the given kind.
    ///
    /// Conversation sessions need a conversation id; see
    /// [`SessionOrchestrator::start_conversation`].
    pub fn start_session(&mut self, kind: SessionKind, now: DateTime<Utc>) -> Result<&Session> {
        self.ensure_idle()?;
        if kind == SessionKind::Conversation {
            return Err(Error::InvalidState(
                "conversation sessions are started with a conversation id".to_string(),
            ));
        }

        let level = self.current_level();
        let items = self.select_items(kind, level, now);
        Ok(self.open(Session::new(kind, level, items, now)))
    }

    /// Start a session over one conversation's learner turns, in order.
    pub fn start_conversation(&mut self, conversation: &str, now: DateTime<Utc>) -> Result<&Session> {
        self.ensure_idle()?;
        let mut items: Vec<ItemId> = self
            .catalog
            .conversation(conversation)
            .into_iter()
            .map(|item| item.id.clone())
            .collect();
        if items.is_empty() {
            return Err(Error::ConversationNotFound(conversation.to_string()));
        }
        items.truncate(self.config.session.max_items);

        let mut session = Session::new(SessionKind::Conversation, self.current_level(), items, now);
        session.conversation = Some(conversation.to_string());
        Ok(self.open(session))
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.active {
            Some(active) => Err(Error::SessionAlreadyActive(active.id.to_string())),
            None => Ok(()),
        }
    }

    fn open(&mut self, session: Session) -> &Session {
        info!(
            session_id = %session.id,
            kind = ?session.kind,
            conversation = session.conversation.as_deref(),
            level = session.level.name(),
            items = session.total_items(),
            "session started"
        );
        self.active.insert(session)
    }

    fn select_items(&self, kind: SessionKind, level: CefrLevel, now: DateTime<Utc>) -> Vec<ItemId> {
        let cfg = &self.config.session;

        let due = || -> Vec<ItemId> {
            self.due_items(now)
                .into_iter()
                .filter(|item| item.level <= level)
                .map(|item| item.id.clone())
                .collect()
        };
        let fresh = |limit: usize| -> Vec<ItemId> {
            self.catalog
                .up_to_level(level)
                .filter(|item| {
                    self.memory
                        .peek(&item.id)
                        .map_or(true, |s| s.phase == Phase::Introduction)
                })
                .take(limit)
                .map(|item| item.id.clone())
                .collect()
        };

        let mut items = match kind {
            SessionKind::Warmup => due(),
            SessionKind::NewContent => fresh(cfg.new_items),
            SessionKind::Integration => {
                let mut items = fresh(cfg.integration_new);
                let seen: HashSet<ItemId> = items.iter().cloned().collect();
                items.extend(
                    due()
                        .into_iter()
                        .filter(|id| !seen.contains(id))
                        .take(cfg.integration_review),
                );
                items
            }
            // Already presented once, so the level filter does not apply.
            SessionKind::Consolidation => self
                .history
                .last()
                .map(|s| {
                    s.items
                        .iter()
                        .filter(|id| self.catalog.get_by_id(id).is_some())
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
            SessionKind::Conversation => Vec::new(),
        };

        items.truncate(cfg.max_items);
        items
    }

    /// Current item of the active session.
    pub fn current_item(&self) -> Option<&LearningItem> {
        let id = self.active.as_ref()?.current_item()?;
        self.catalog.get_by_id(id)
    }

    /// Move the active session to its next item.
    pub fn advance(&mut self) -> Result<Option<&LearningItem>> {
        let session = self.active.as_mut().ok_or(Error::NoActiveSession)?;
        session.advance();
        Ok(self.current_item())
    }

    /// Check that `item_id` can be answered in the active session.
    pub fn ensure_answerable(&self, item_id: &str) -> Result<&LearningItem> {
        let session = self.active.as_ref().ok_or(Error::NoActiveSession)?;
        let item = self
            .catalog
            .get_by_id(item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))?;
        if !session.contains(item_id) {
            return Err(Error::ItemNotInSession(item_id.to_string()));
        }
        Ok(item)
    }

    /// Score a transcribed response and update the item's memory state.
    pub fn process_response(
        &mut self,
        item_id: &str,
        spoken_text: &str,
        elapsed_ms: u64,
        now: DateTime<Utc>,
    ) -> Result<UserResponse> {
        self.ensure_answerable(item_id)?;
        let (Some(session), Some(item)) = (self.active.as_mut(), self.catalog.get_by_id(item_id)) else {
            return Err(Error::InvalidState(format!("session or item vanished: {item_id}")));
        };

        let mut request = ScoreRequest::new(spoken_text, &item.french)
            .with_alternatives(&item.alternatives)
            .with_response_ms(elapsed_ms);
        if self.config.scoring.use_phonetic_guide && !item.pronunciation.is_empty() {
            request = request.with_pronunciation(&item.pronunciation);
        }
        let score = self.scorer.score(&request);

        let response = UserResponse {
            item_id: item_id.to_string(),
            spoken_text: spoken_text.to_string(),
            response_ms: elapsed_ms,
            accuracy: score.accuracy,
            pronunciation: score.pronunciation,
            confidence: score.confidence,
            hesitation: score.hesitation,
            is_correct: score.is_correct,
            next_step: score.next_step(&self.config.scoring),
            timestamp: now,
        };

        self.memory
            .update(self.policy.as_ref(), item_id, response.performance(), now);
        session.record(response.clone());

        debug!(
            item_id,
            accuracy = response.accuracy,
            next_step = ?response.next_step,
            progress = session.progress,
            "response processed"
        );
        Ok(response)
    }

    /// Pass over an item without scoring it.
    pub fn skip(&mut self, item_id: &str) -> Result<()> {
        self.ensure_answerable(item_id)?;
        if let Some(session) = self.active.as_mut() {
            if session.current_item().is_some_and(|id| id == item_id) {
                session.advance();
            }
        }
        debug!(item_id, "item skipped");
        Ok(())
    }

    /// Finish the active session and fold it into the assessment.
    pub fn complete_session(&mut self, now: DateTime<Utc>) -> Result<&UserAssessment> {
        let mut session = self.active.take().ok_or(Error::NoActiveSession)?;

        self.assessment.absorb(
            &session,
            &self.catalog,
            &self.memory,
            &self.config.session,
            &self.config.assessment,
        );
        session.status = SessionStatus::Completed;
        session.ended_at = Some(now);
        self.progress.record_session(&session, now);

        info!(
            session_id = %session.id,
            responses = session.responses.len(),
            overall_progress = self.assessment.overall_progress,
            streak = self.progress.streak,
            "session completed"
        );
        self.history.push(session);
        Ok(&self.assessment)
    }

    /// Merge archived sessions by id; returns how many were added.
    ///
    /// Ids already in history, or repeated within `sessions`, are skipped.
    /// Practice counters are not touched.
    pub fn merge_history(&mut self, sessions: Vec<Session>) -> usize {
        let mut known: HashSet<_> = self.history.iter().map(|s| s.id).collect();
        let mut added: Vec<Session> = sessions.into_iter().filter(|s| known.insert(s.id)).collect();
        let count = added.len();

        self.history.append(&mut added);
        self.history.sort_by_key(|s| s.started_at);
        count
    }
}
