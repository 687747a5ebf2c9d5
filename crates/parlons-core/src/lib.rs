//! Graduated-interval recall engine for spoken French practice.
//!
//! This crate schedules phrases and conversation turns for spoken recall and
//! tracks how well the learner remembers them.
//!
//! # Features
//!
//! - **Scheduling**: Pimsleur-style phases with fixed recall tiers
//! - **Scoring**: Edit-distance grading of transcripts behind a pluggable trait
//! - **Sessions**: Warm-up, new-content, integration, consolidation and
//!   conversation sessions
//! - **Progress**: Daily practice streaks and time spent
//! - **Speech**: Single-flight, cancellable capture and playback guards
//! - **Persistence**: SQLite snapshots and JSON history export

pub mod algorithm;
pub mod assessment;
pub mod catalog;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod memory;
pub mod models;
pub mod progress;
pub mod scorer;
pub mod session;
pub mod speech;
pub mod tutor;

// Re-exports
pub use algorithm::{due_items, get_policy, review_priority, GraduatedInterval, IntervalPolicy, Transition};
pub use assessment::{SessionPerformance, UserAssessment};
pub use catalog::Catalog;
pub use config::{Config, MAX_TIER_SECS};
pub use content::{bundled_topics, topics_for, Topic, TopicCategory};
pub use db::{Database, ExportBundle, Snapshot, SCHEMA_VERSION};
pub use error::{Error, Result, SpeechError};
pub use memory::MemoryModel;
pub use models::{
    Accent, CefrLevel, Difficulty, ItemId, ItemKind, LearningItem, MemoryState, NextStep, Performance, Phase,
    Session, SessionId, SessionKind, SessionStatus, Settings, UserResponse,
};
pub use progress::LearnerProgress;
pub use scorer::{normalize, similarity, LevenshteinScorer, ResponseScore, ResponseScorer, ScoreRequest};
pub use session::SessionOrchestrator;
pub use speech::{Capture, Listener, Playback, Speaker, SpeechRecognizer, SpeechSynthesizer};
pub use tutor::{PracticeOutcome, Tutor};
