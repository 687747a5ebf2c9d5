//! Session aggregates and the long-lived learner assessment.

use crate::catalog::Catalog;
use crate::config::{AssessmentConfig, SessionConfig};
use crate::memory::MemoryModel;
use crate::models::{Phase, Session, UserResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running aggregates over a session's response log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPerformance {
    pub total: usize,
    pub correct: usize,
    pub hesitations: usize,
    pub average_accuracy: f64,
    pub average_pronunciation: f64,
    pub average_confidence: f64,
    pub average_response_ms: f64,
}

impl SessionPerformance {
    /// Recompute from a response log.
    pub fn from_responses(responses: &[UserResponse]) -> Self {
        let mut perf = Self::default();
        for response in responses {
            perf.record(response);
        }
        perf
    }

    /// Fold one response into the running means.
    pub fn record(&mut self, response: &UserResponse) {
        self.total += 1;
        if response.is_correct {
            self.correct += 1;
        }
        if response.hesitation {
            self.hesitations += 1;
        }

        let n = self.total as f64;
        let fold = |avg: f64, x: f64| avg + (x - avg) / n;
        self.average_accuracy = fold(self.average_accuracy, response.accuracy);
        self.average_pronunciation = fold(self.average_pronunciation, response.pronunciation);
        self.average_confidence = fold(self.average_confidence, response.confidence);
        self.average_response_ms = fold(self.average_response_ms, response.response_ms as f64);
    }
}

/// Learner-wide scores, each in 0-100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAssessment {
    pub overall_progress: f64,
    pub retention: f64,
    pub pronunciation_accuracy: f64,
    pub response_speed: f64,
    pub fluency: f64,
    pub memory_consolidation: f64,
    pub weak_areas: Vec<String>,
    pub strong_areas: Vec<String>,
    pub recommended_focus: Vec<String>,
}

impl UserAssessment {
    /// Blend a finished session into the assessment.
    ///
    /// A session without responses leaves the assessment untouched.
    pub fn absorb(
        &mut self,
        session: &Session,
        catalog: &Catalog,
        memory: &MemoryModel,
        session_config: &SessionConfig,
        thresholds: &AssessmentConfig,
    ) {
        let perf = &session.performance;
        if perf.total == 0 {
            return;
        }

        let blend = |old: f64, new: f64| (old + new) / 2.0;
        let speed = (100.0 - perf.average_response_ms / 1000.0).max(0.0);

        self.retention = blend(self.retention, perf.average_accuracy);
        self.pronunciation_accuracy = blend(self.pronunciation_accuracy, perf.average_pronunciation);
        self.fluency = blend(self.fluency, perf.average_confidence);
        self.response_speed = blend(self.response_speed, speed);
        self.overall_progress = (self.overall_progress + session_config.progress_step).min(100.0);
        self.memory_consolidation = memory_consolidation(catalog, memory);
        self.classify_areas(catalog, memory, thresholds);
    }

    fn classify_areas(&mut self, catalog: &Catalog, memory: &MemoryModel, thresholds: &AssessmentConfig) {
        let mut by_category: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for item in catalog.get_all() {
            let retention = memory.peek(&item.id).map_or(0.0, |s| s.retention_score);
            let entry = by_category.entry(item.category.as_str()).or_insert((0.0, 0));
            entry.0 += retention;
            entry.1 += 1;
        }

        let mut weak: Vec<(&str, f64)> = Vec::new();
        self.strong_areas.clear();
        for (category, (sum, count)) in by_category {
            let avg = sum / count as f64;
            if avg < thresholds.weak_below {
                weak.push((category, avg));
            } else if avg > thresholds.strong_above {
                self.strong_areas.push(category.to_string());
            }
        }

        self.weak_areas = weak.iter().map(|(c, _)| c.to_string()).collect();
        weak.sort_by(|a, b| a.1.total_cmp(&b.1));
        self.recommended_focus = weak.into_iter().take(3).map(|(c, _)| c.to_string()).collect();
    }
}

/// Share of catalog items in the `Mastered` phase (0-100).
pub fn memory_consolidation(catalog: &Catalog, memory: &MemoryModel) -> f64 {
    if catalog.is_empty() {
        return 0.0;
    }
    let mastered = catalog
        .get_all()
        .iter()
        .filter(|item| memory.peek(&item.id).is_some_and(|s| s.phase == Phase::Mastered))
        .count();
    mastered as f64 / catalog.len() as f64 * 100.0
}
