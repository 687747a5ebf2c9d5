//! Graduated-interval scheduling.

use crate::catalog::Catalog;
use crate::config::{SchedulerConfig, MAX_TIER_SECS};
use crate::memory::MemoryModel;
use crate::models::{Difficulty, LearningItem, MemoryState, Phase};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

/// Phase and interval chosen by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// New phase.
    pub phase: Phase,
    /// Time until the next review.
    pub interval: Duration,
}

impl Transition {
    /// Next review time when applied at `now`, saturating at the latest
    /// representable instant.
    pub fn due_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Trait for interval policies.
pub trait IntervalPolicy: Send + Sync {
    /// Policy name.
    fn name(&self) -> &str;

    /// Transition after a response scored `score` (0-100).
    fn next_state(&self, phase: Phase, score: f64) -> Transition;

    /// Transition for an item that has never been reviewed.
    fn initial_transition(&self) -> Transition;

    /// Review priority weight for an item's difficulty.
    fn difficulty_multiplier(&self, difficulty: Difficulty) -> f64;
}

/// Pimsleur-style graduated interval recall.
///
/// Three bands:
/// - at or above `advance_threshold`: move one phase forward and wait the
///   tier of the new phase;
/// - at or above `hold_threshold`: keep the phase and wait its tier;
/// - below: keep the phase and retest after the immediate tier.
///
/// Phases never move backward.
#[derive(Debug, Clone, Default)]
pub struct GraduatedInterval {
    pub config: SchedulerConfig,
}

impl GraduatedInterval {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Recall tier for a phase, clamped to `1..=MAX_TIER_SECS` seconds.
    pub fn tier_for(&self, phase: Phase) -> Duration {
        let c = &self.config;
        let secs = match phase {
            Phase::Introduction => c.immediate,
            Phase::ImmediateRecall => c.short_term,
            Phase::ShortTerm => c.medium_term,
            Phase::MediumTerm => c.long_term,
            Phase::LongTerm => c.extended,
            Phase::Extended | Phase::Mastered => c.deep_memory,
        };
        Duration::seconds(secs.clamp(1, MAX_TIER_SECS))
    }
}

impl IntervalPolicy for GraduatedInterval {
    fn name(&self) -> &str {
        "Graduated"
    }

    fn next_state(&self, phase: Phase, score: f64) -> Transition {
        let (phase, interval) = if score >= self.config.advance_threshold {
            let next = phase.next();
            (next, self.tier_for(next))
        } else if score >= self.config.hold_threshold {
            (phase, self.tier_for(phase))
        } else {
            (phase, self.tier_for(Phase::Introduction))
        };

        Transition { phase, interval }
    }

    fn initial_transition(&self) -> Transition {
        Transition {
            phase: Phase::Introduction,
            interval: self.tier_for(Phase::Introduction),
        }
    }

    fn difficulty_multiplier(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Hard => self.config.hard_multiplier,
            Difficulty::Easy | Difficulty::Medium => 1.0,
        }
    }
}

/// Get policy by name.
pub fn get_policy(name: &str, config: &SchedulerConfig) -> Box<dyn IntervalPolicy> {
    match name.to_lowercase().as_str() {
        "graduated" | "pimsleur" => Box::new(GraduatedInterval::new(config.clone())),
        other => {
            tracing::warn!(policy = other, "unknown interval policy, using graduated");
            Box::new(GraduatedInterval::new(config.clone()))
        }
    }
}

/// How urgently an item needs review: time since last seen, weighted by
/// forgetting and difficulty.
pub fn review_priority(
    policy: &dyn IntervalPolicy,
    item: &LearningItem,
    state: &MemoryState,
    now: DateTime<Utc>,
) -> f64 {
    let seen = state.last_review_time.unwrap_or(state.introduced_at);
    let elapsed = (now - seen).num_milliseconds().max(0) as f64 / 1000.0;
    let retention_decay = 1.0 - state.retention_score / 100.0;
    elapsed * retention_decay * policy.difficulty_multiplier(item.difficulty)
}

/// Due, non-mastered items ordered by descending priority (catalog order on ties).
pub fn due_items<'c>(
    policy: &dyn IntervalPolicy,
    catalog: &'c Catalog,
    memory: &MemoryModel,
    now: DateTime<Utc>,
) -> Vec<&'c LearningItem> {
    let mut due: Vec<(&LearningItem, f64)> = catalog
        .get_all()
        .iter()
        .filter_map(|item| {
            let state = memory.peek(&item.id)?;
            state
                .is_due(now)
                .then(|| (item, review_priority(policy, item, state, now)))
        })
        .collect();

    // Stable sort keeps catalog order for equal priorities.
    due.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    due.into_iter().map(|(item, _)| item).collect()
}
