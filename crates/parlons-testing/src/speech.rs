//! Scripted speech engines.

use parlons_core::{SpeechError, SpeechRecognizer, SpeechSynthesizer};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Recognizer that replays queued replies after a delay each.
///
/// An exhausted script reports [`SpeechError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    replies: Mutex<VecDeque<(Duration, Result<String, SpeechError>)>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a transcript delivered after `delay_ms`.
    pub fn say(self, delay_ms: u64, text: &str) -> Self {
        self.push(delay_ms, Ok(text.to_string()))
    }

    /// Queue a failure reported after `delay_ms`.
    pub fn fail(self, delay_ms: u64, error: SpeechError) -> Self {
        self.push(delay_ms, Err(error))
    }

    fn push(self, delay_ms: u64, reply: Result<String, SpeechError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back((Duration::from_millis(delay_ms), reply));
        }
        self
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn next_reply(&self) -> (Duration, Result<String, SpeechError>) {
        self.replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or((Duration::ZERO, Err(SpeechError::Unavailable)))
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    async fn recognize(&self, _locale: &str) -> Result<String, SpeechError> {
        let (delay, reply) = self.next_reply();
        tokio::time::sleep(delay).await;
        reply
    }
}

/// One utterance handed to [`RecordingSynthesizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    pub rate: f64,
}

/// Synthesizer that records what it was asked to say.
#[derive(Debug, Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<Utterance>>,
    duration: Duration,
}

impl RecordingSynthesizer {
    /// Each utterance takes `duration_ms` to play.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            duration: Duration::from_millis(duration_ms),
        }
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    async fn speak(&self, text: &str, locale: &str, rate: f64) -> Result<(), SpeechError> {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(Utterance {
                text: text.to_string(),
                locale: locale.to_string(),
                rate,
            });
        }
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
