//! Practice streaks and totals.

use crate::models::Session;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Learner-wide practice counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerProgress {
    /// Consecutive practice days ending at `last_session_date`.
    pub streak: u32,
    /// Longest streak ever reached.
    pub best_streak: u32,
    /// Completed sessions.
    pub total_sessions: u32,
    /// Wall-clock minutes spent in completed sessions.
    pub practice_minutes: f64,
    /// Minutes spent in conversation sessions.
    pub conversation_minutes: f64,
    /// UTC day of the last session with at least one response.
    pub last_session_date: Option<NaiveDate>,
}

impl LearnerProgress {
    /// Fold a finished session into the counters.
    ///
    /// Every completed session counts toward the totals. Only sessions with
    /// at least one response count as a practice day.
    pub fn record_session(&mut self, session: &Session, ended_at: DateTime<Utc>) {
        let minutes = (ended_at - session.started_at).num_seconds().max(0) as f64 / 60.0;
        self.total_sessions += 1;
        self.practice_minutes += minutes;
        if session.conversation.is_some() {
            self.conversation_minutes += minutes;
        }

        if !session.responses.is_empty() {
            self.mark_practiced(ended_at.date_naive());
        }
    }

    /// Extend, keep or restart the streak for a practice day.
    pub fn mark_practiced(&mut self, day: NaiveDate) {
        match self.last_session_date {
            Some(last) if day <= last => return,
            Some(last) if last.succ_opt() == Some(day) => self.streak += 1,
            _ => self.streak = 1,
        }
        self.last_session_date = Some(day);
        self.best_streak = self.best_streak.max(self.streak);
    }

    /// Streak as seen on `today`: zero once a whole day has been missed.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        match self.last_session_date {
            Some(last) if last == today || last.succ_opt() == Some(today) => self.streak,
            _ => 0,
        }
    }
}
