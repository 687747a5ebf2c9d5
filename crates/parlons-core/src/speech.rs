//! Speech recognition and synthesis seams.
//!
//! Platform engines implement [`SpeechRecognizer`] and [`SpeechSynthesizer`].
//! [`Listener`] and [`Speaker`] wrap them so each modality runs at most one
//! operation at a time and can be cancelled or timed out.

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

/// Turns audio into a transcript.
pub trait SpeechRecognizer: Send + Sync {
    /// Capture one utterance in `locale`.
    fn recognize(&self, locale: &str) -> impl Future<Output = Result<String, SpeechError>> + Send;
}

/// Speaks text aloud.
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in `locale` at `rate` (1.0 is normal speed).
    fn speak(&self, text: &str, locale: &str, rate: f64) -> impl Future<Output = Result<(), SpeechError>> + Send;
}

/// Result of a listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// A transcript and the time it took to arrive.
    Heard { text: String, elapsed_ms: u64 },
    /// Nothing was recognized before the capture timeout.
    TimedOut,
    Cancelled,
}

/// Result of a playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Finished,
    Cancelled,
}

/// Single-flight guard around a recognizer.
pub struct Listener<R> {
    recognizer: R,
    in_flight: Mutex<()>,
    cancel: Notify,
    timeout: Duration,
}

impl<R: SpeechRecognizer> Listener<R> {
    pub fn new(recognizer: R, timeout: Duration) -> Self {
        Self {
            recognizer,
            in_flight: Mutex::new(()),
            cancel: Notify::new(),
            timeout,
        }
    }

    pub fn from_config(recognizer: R, config: &SpeechConfig) -> Self {
        Self::new(recognizer, Duration::from_millis(config.capture_timeout_ms))
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Whether a capture is in flight.
    pub fn is_listening(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Capture one utterance.
    ///
    /// Fails with [`SpeechError::Busy`] while another capture is running.
    pub async fn listen(&self, locale: &str) -> Result<Capture, SpeechError> {
        let _guard = self.in_flight.try_lock().map_err(|_| SpeechError::Busy)?;
        let started = Instant::now();

        tokio::select! {
            result = self.recognizer.recognize(locale) => {
                let text = result?;
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::debug!(locale, elapsed_ms, "utterance captured");
                Ok(Capture::Heard { text, elapsed_ms })
            }
            _ = tokio::time::sleep(self.timeout) => {
                tracing::debug!(locale, timeout_ms = self.timeout.as_millis() as u64, "capture timed out");
                Ok(Capture::TimedOut)
            }
            _ = self.cancel.notified() => {
                tracing::debug!(locale, "capture cancelled");
                Ok(Capture::Cancelled)
            }
        }
    }

    /// Stop the capture in flight, if any.
    pub fn cancel(&self) {
        self.cancel.notify_waiters();
    }
}

/// Single-flight guard around a synthesizer.
pub struct Speaker<S> {
    synthesizer: S,
    in_flight: Mutex<()>,
    cancel: Notify,
}

impl<S: SpeechSynthesizer> Speaker<S> {
    pub fn new(synthesizer: S) -> Self {
        Self {
            synthesizer,
            in_flight: Mutex::new(()),
            cancel: Notify::new(),
        }
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    pub fn is_speaking(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Speak `text`, failing with [`SpeechError::Busy`] during another playback.
    pub async fn speak(&self, text: &str, locale: &str, rate: f64) -> Result<Playback, SpeechError> {
        let _guard = self.in_flight.try_lock().map_err(|_| SpeechError::Busy)?;

        tokio::select! {
            result = self.synthesizer.speak(text, locale, rate) => {
                result?;
                Ok(Playback::Finished)
            }
            _ = self.cancel.notified() => Ok(Playback::Cancelled),
        }
    }

    /// Stop the playback in flight, if any.
    pub fn cancel(&self) {
        self.cancel.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        delay: Duration,
        reply: Result<String, SpeechError>,
    }

    impl SpeechRecognizer for Echo {
        async fn recognize(&self, _locale: &str) -> Result<String, SpeechError> {
            tokio::time::sleep(self.delay).await;
            self.reply.clone()
        }
    }

    struct Silent;

    impl SpeechSynthesizer for Silent {
        async fn speak(&self, _text: &str, _locale: &str, _rate: f64) -> Result<(), SpeechError> {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(())
        }
    }

    fn echo(delay_ms: u64, reply: Result<&str, SpeechError>) -> Echo {
        Echo {
            delay: Duration::from_millis(delay_ms),
            reply: reply.map(str::to_string),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_listen_measures_latency() {
        let listener = Listener::new(echo(1200, Ok("bonjour")), Duration::from_secs(10));
        let capture = listener.listen("fr-FR").await.unwrap();
        assert_eq!(
            capture,
            Capture::Heard {
                text: "bonjour".to_string(),
                elapsed_ms: 1200
            }
        );
        assert!(!listener.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn test_listen_times_out() {
        let listener = Listener::new(echo(30_000, Ok("trop tard")), Duration::from_secs(10));
        assert_eq!(listener.listen("fr-FR").await.unwrap(), Capture::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_listen_is_busy() {
        let listener = Listener::new(echo(500, Ok("oui")), Duration::from_secs(10));
        let (first, second) = tokio::join!(listener.listen("fr-FR"), listener.listen("fr-FR"));
        assert!(matches!(first, Ok(Capture::Heard { .. })));
        assert_eq!(second, Err(SpeechError::Busy));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_listen() {
        let listener = Listener::new(echo(5000, Ok("oui")), Duration::from_secs(10));
        let (capture, _) = tokio::join!(listener.listen("fr-FR"), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            listener.cancel();
        });
        assert_eq!(capture.unwrap(), Capture::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_failure_propagates() {
        let listener = Listener::new(echo(10, Err(SpeechError::Unavailable)), Duration::from_secs(10));
        assert_eq!(listener.listen("fr-FR").await, Err(SpeechError::Unavailable));
    }

    #[tokio::test(start_paused = true)]
    async fn test_speaker_single_flight() {
        let speaker = Speaker::new(Silent);
        let (first, second) = tokio::join!(
            speaker.speak("Bonjour", "fr-FR", 1.0),
            speaker.speak("Merci", "fr-FR", 1.0)
        );
        assert_eq!(first, Ok(Playback::Finished));
        assert_eq!(second, Err(SpeechError::Busy));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_speak() {
        let speaker = Speaker::new(Silent);
        let started = Instant::now();
        let (playback, _) = tokio::join!(speaker.speak("Bonjour", "fr-FR", 1.0), async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            assert!(speaker.is_speaking());
            speaker.cancel();
        });

        assert_eq!(playback, Ok(Playback::Cancelled));
        assert_eq!(started.elapsed(), Duration::from_millis(300));
        assert!(!speaker.is_speaking());

        // The guard is released, so the next playback runs to the end.
        assert_eq!(speaker.speak("Merci", "fr-FR", 1.0).await, Ok(Playback::Finished));
    }
}
