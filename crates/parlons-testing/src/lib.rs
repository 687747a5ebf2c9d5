//! Testing utilities for the parlons recall engine.
//!
//! This crate provides:
//! - Deterministic fixtures (fixed clock, small catalogs, preloaded orchestrators)
//! - Scripted speech engines for driving capture and playback in tests
//! - Property-based testing generators

pub mod fixtures;
pub mod speech;

#[cfg(feature = "proptest-support")]
pub mod generators;

// Re-exports
pub use fixtures::Fixtures;
pub use speech::{RecordingSynthesizer, ScriptedRecognizer};
