//! Data models for the recall engine.

use crate::assessment::SessionPerformance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifiers.
pub type ItemId = String;
pub type SessionId = Uuid;

/// Whether an item is a standalone phrase or a turn in a scripted conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Phrase,
    Turn,
}

/// Difficulty tier of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

/// CEFR proficiency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum CefrLevel {
    #[default]
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    /// Level a learner should practice at for a given overall progress (0-100).
    pub fn for_progress(progress: f64) -> Self {
        if progress < 20.0 {
            Self::A1
        } else if progress < 40.0 {
            Self::A2
        } else if progress < 60.0 {
            Self::B1
        } else if progress < 80.0 {
            Self::B2
        } else if progress < 95.0 {
            Self::C1
        } else {
            Self::C2
        }
    }

    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }
}

/// A phrase or conversational turn the learner practices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningItem {
    /// Stable identifier.
    pub id: ItemId,
    /// Target-language text.
    pub french: String,
    /// Source-language text.
    pub english: String,
    /// Phonetic guide.
    #[serde(default)]
    pub pronunciation: String,
    /// Situational note.
    #[serde(default)]
    pub context: String,
    /// Cultural note.
    #[serde(default)]
    pub cultural_note: Option<String>,
    /// Other accepted answers.
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub level: CefrLevel,
    /// Free-form category label.
    pub category: String,
    #[serde(default)]
    pub kind: ItemKind,
    /// Conversation this turn belongs to.
    #[serde(default)]
    pub conversation: Option<String>,
}

impl LearningItem {
    /// Create a new phrase.
    pub fn new(
        id: impl Into<ItemId>,
        french: impl Into<String>,
        english: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            french: french.into(),
            english: english.into(),
            pronunciation: String::new(),
            context: String::new(),
            cultural_note: None,
            alternatives: Vec::new(),
            difficulty: Difficulty::Easy,
            level: CefrLevel::A1,
            category: category.into(),
            kind: ItemKind::Phrase,
            conversation: None,
        }
    }

    /// Set phonetic guide.
    pub fn with_pronunciation(mut self, guide: impl Into<String>) -> Self {
        self.pronunciation = guide.into();
        self
    }

    /// Set context note.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Set cultural note.
    pub fn with_cultural_note(mut self, note: impl Into<String>) -> Self {
        self.cultural_note = Some(note.into());
        self
    }

    /// Add an accepted alternative answer.
    pub fn with_alternative(mut self, alt: impl Into<String>) -> Self {
        self.alternatives.push(alt.into());
        self
    }

    /// Set difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set level.
    pub fn with_level(mut self, level: CefrLevel) -> Self {
        self.level = level;
        self
    }

    /// Mark as a learner turn in a conversation.
    pub fn in_conversation(mut self, conversation: impl Into<String>) -> Self {
        self.kind = ItemKind::Turn;
        self.conversation = Some(conversation.into());
        self
    }
}

/// Stage in the graduated-interval recall sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Introduction,
    ImmediateRecall,
    ShortTerm,
    MediumTerm,
    LongTerm,
    Extended,
    Mastered,
}

impl Phase {
    /// All phases in order.
    pub const ALL: [Phase; 7] = [
        Self::Introduction,
        Self::ImmediateRecall,
        Self::ShortTerm,
        Self::MediumTerm,
        Self::LongTerm,
        Self::Extended,
        Self::Mastered,
    ];

    /// The following phase, clamped at `Mastered`.
    pub fn next(self) -> Self {
        match self {
            Self::Introduction => Self::ImmediateRecall,
            Self::ImmediateRecall => Self::ShortTerm,
            Self::ShortTerm => Self::MediumTerm,
            Self::MediumTerm => Self::LongTerm,
            Self::LongTerm => Self::Extended,
            Self::Extended | Self::Mastered => Self::Mastered,
        }
    }

    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Introduction => "Introduction",
            Self::ImmediateRecall => "Immediate recall",
            Self::ShortTerm => "Short term",
            Self::MediumTerm => "Medium term",
            Self::LongTerm => "Long term",
            Self::Extended => "Extended",
            Self::Mastered => "Mastered",
        }
    }
}

/// Per-item memory state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    /// Current phase.
    pub phase: Phase,
    /// Last scheduled interval in seconds.
    pub interval_secs: i64,
    /// When the item becomes due.
    pub next_review_time: DateTime<Utc>,
    /// When the item was introduced.
    pub introduced_at: DateTime<Utc>,
    /// Last review, if any.
    pub last_review_time: Option<DateTime<Utc>>,
    /// Number of processed responses.
    pub repetition_count: u32,
    /// Responses at or above the advance threshold.
    pub success_count: u32,
    /// Smoothed confidence (0-100).
    pub confidence_score: f64,
    /// Smoothed retention (0-100).
    pub retention_score: f64,
    /// Smoothed response latency.
    pub average_response_ms: f64,
}

impl MemoryState {
    /// Check if due for review.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.phase != Phase::Mastered && self.next_review_time <= now
    }
}

/// Quality of a single attempt, fed to the memory model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Performance {
    /// Combined score (0-100).
    pub score: f64,
    /// Confidence (0-100).
    pub confidence: f64,
    /// Response latency.
    pub response_ms: u64,
}

impl Performance {
    /// Performance with confidence equal to the score and no latency.
    pub fn from_score(score: f64) -> Self {
        Self {
            score,
            confidence: score,
            response_ms: 0,
        }
    }
}

/// What the learner should do after a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    /// Move on to the next item.
    Continue,
    /// Try the same item again.
    Repeat,
    /// Show the explanation before retrying.
    Explain,
}

/// A scored attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub item_id: ItemId,
    /// Transcribed utterance.
    pub spoken_text: String,
    /// Time from prompt to transcript.
    pub response_ms: u64,
    pub accuracy: f64,
    pub pronunciation: f64,
    pub confidence: f64,
    pub hesitation: bool,
    /// Exact match against the target or an alternative.
    pub is_correct: bool,
    pub next_step: NextStep,
    pub timestamp: DateTime<Utc>,
}

impl UserResponse {
    /// Score passed to the scheduler.
    pub fn performance(&self) -> Performance {
        Performance {
            score: (self.accuracy + self.pronunciation) / 2.0,
            confidence: self.confidence,
            response_ms: self.response_ms,
        }
    }
}

/// Session type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Review items that are due.
    Warmup,
    /// Introduce new items.
    NewContent,
    /// Mix new and due items.
    Integration,
    /// Rapid recall of the last session's items.
    Consolidation,
    /// The learner turns of one conversation, in order.
    Conversation,
}

impl SessionKind {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Warmup => "Warm-up",
            Self::NewContent => "New content",
            Self::Integration => "Integration",
            Self::Consolidation => "Consolidation",
            Self::Conversation => "Conversation",
        }
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

/// Practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub kind: SessionKind,
    /// Conversation being rehearsed, for conversation sessions.
    #[serde(default)]
    pub conversation: Option<String>,
    /// Level the items were drawn from.
    pub level: CefrLevel,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Items selected for this session.
    pub items: Vec<ItemId>,
    /// Response log.
    pub responses: Vec<UserResponse>,
    /// Cursor into `items`.
    pub current_index: usize,
    /// Completion percentage (0-100).
    pub progress: f64,
    /// Aggregates over `responses`.
    pub performance: SessionPerformance,
    pub status: SessionStatus,
}

impl Session {
    /// Create a new session.
    pub fn new(kind: SessionKind, level: CefrLevel, items: Vec<ItemId>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            conversation: None,
            level,
            started_at: now,
            ended_at: None,
            items,
            responses: Vec::new(),
            current_index: 0,
            progress: 0.0,
            performance: SessionPerformance::default(),
            status: SessionStatus::Active,
        }
    }

    /// Get current item ID.
    pub fn current_item(&self) -> Option<&ItemId> {
        self.items.get(self.current_index)
    }

    /// Check if every item has been presented.
    pub fn is_complete(&self) -> bool {
        self.current_index >= self.items.len()
    }

    /// Get total items in session.
    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    /// Whether the item was selected for this session.
    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|id| id == item_id)
    }

    /// Move to next item.
    pub fn advance(&mut self) {
        if self.current_index < self.items.len() {
            self.current_index += 1;
        }
    }

    /// Append a response and refresh aggregates.
    pub fn record(&mut self, response: UserResponse) {
        self.performance.record(&response);
        self.responses.push(response);
        self.progress = if self.items.is_empty() {
            0.0
        } else {
            (self.responses.len() as f64 / self.items.len() as f64 * 100.0).min(100.0)
        };
    }
}

/// Regional voice for synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    #[default]
    France,
    Quebec,
}

impl Accent {
    /// BCP 47 locale for the accent.
    pub fn locale(&self) -> &'static str {
        match self {
            Self::France => "fr-FR",
            Self::Quebec => "fr-CA",
        }
    }

    /// Accent for a locale tag; anything but `fr-CA` is France.
    pub fn from_locale(locale: &str) -> Self {
        if locale.eq_ignore_ascii_case("fr-CA") {
            Self::Quebec
        } else {
            Self::France
        }
    }
}

/// Learner preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Synthesis rate multiplier.
    pub speech_rate: f64,
    pub accent: Accent,
    /// Speak each item when presented.
    pub auto_speak: bool,
    /// Start listening after the item is spoken.
    pub auto_listen: bool,
    pub focus_areas: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speech_rate: 1.0,
            accent: Accent::France,
            auto_speak: true,
            auto_listen: false,
            focus_areas: vec![
                "vocabulary".to_string(),
                "grammar".to_string(),
                "pronunciation".to_string(),
            ],
        }
    }
}
