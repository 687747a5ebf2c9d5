//! Per-item memory states.

use crate::algorithm::IntervalPolicy;
use crate::catalog::Catalog;
use crate::models::{ItemId, MemoryState, Performance, Phase};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Memory state for every item the learner has met.
#[derive(Debug, Clone)]
pub struct MemoryModel {
    states: HashMap<ItemId, MemoryState>,
    /// State handed out for items never seen before.
    default: MemoryState,
}

impl MemoryModel {
    /// Empty model whose default states are introduced at `epoch`.
    pub fn new(policy: &dyn IntervalPolicy, epoch: DateTime<Utc>) -> Self {
        let initial = policy.initial_transition();
        Self {
            states: HashMap::new(),
            default: MemoryState {
                phase: initial.phase,
                interval_secs: initial.interval.num_seconds(),
                next_review_time: initial.due_from(epoch),
                introduced_at: epoch,
                last_review_time: None,
                repetition_count: 0,
                success_count: 0,
                confidence_score: 0.0,
                retention_score: 0.0,
                average_response_ms: 0.0,
            },
        }
    }

    /// Model with a default state for every catalog item.
    pub fn for_catalog(catalog: &Catalog, policy: &dyn IntervalPolicy, epoch: DateTime<Utc>) -> Self {
        let mut model = Self::new(policy, epoch);
        for item in catalog.get_all() {
            model.get(&item.id);
        }
        model
    }

    /// State for an item, created with defaults on first access.
    pub fn get(&mut self, item_id: &str) -> &MemoryState {
        self.entry(item_id)
    }

    /// State for an item without creating one.
    pub fn peek(&self, item_id: &str) -> Option<&MemoryState> {
        self.states.get(item_id)
    }

    fn entry(&mut self, item_id: &str) -> &mut MemoryState {
        self.states
            .entry(item_id.to_string())
            .or_insert_with(|| self.default.clone())
    }

    /// Fold one attempt into the item's state and reschedule it.
    pub fn update(
        &mut self,
        policy: &dyn IntervalPolicy,
        item_id: &str,
        performance: Performance,
        now: DateTime<Utc>,
    ) -> &MemoryState {
        let state = self.entry(item_id);
        let previous = state.phase;

        state.confidence_score = (state.confidence_score + performance.confidence) / 2.0;
        state.retention_score = (state.retention_score + performance.score) / 2.0;
        state.average_response_ms = (state.average_response_ms + performance.response_ms as f64) / 2.0;
        state.repetition_count += 1;
        state.last_review_time = Some(now);

        let transition = policy.next_state(previous, performance.score);
        if transition.phase > previous {
            state.success_count += 1;
        }
        state.phase = transition.phase;
        state.interval_secs = transition.interval.num_seconds();
        state.next_review_time = transition.due_from(now);

        if state.phase != previous {
            tracing::info!(item_id, from = ?previous, to = ?state.phase, "phase advanced");
        }
        tracing::debug!(
            item_id,
            score = performance.score,
            interval_secs = state.interval_secs,
            "memory state updated"
        );

        state
    }

    /// Number of items in the `Mastered` phase.
    pub fn mastered_count(&self) -> usize {
        self.states.values().filter(|s| s.phase == Phase::Mastered).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &MemoryState)> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sorted copy of all states, for persistence.
    pub fn to_map(&self) -> BTreeMap<ItemId, MemoryState> {
        self.states
            .iter()
            .map(|(id, state)| (id.clone(), state.clone()))
            .collect()
    }

    /// Replace states with previously persisted ones.
    pub fn restore(&mut self, states: BTreeMap<ItemId, MemoryState>) {
        self.states.extend(states);
    }
}
