//! Response scoring.
//!
//! Compares a transcribed utterance with the expected phrase. Scoring sits
//! behind [`ResponseScorer`] so an acoustic model can replace the string
//! heuristic without touching the scheduler.

use crate::config::ScoringConfig;
use crate::models::NextStep;

/// Input to a scorer.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRequest<'a> {
    /// Transcribed utterance.
    pub spoken: &'a str,
    /// Expected phrase.
    pub target: &'a str,
    /// Other accepted phrases.
    pub alternatives: &'a [String],
    /// Phonetic guide to score pronunciation against.
    pub expected_pronunciation: Option<&'a str>,
    /// Time from prompt to transcript.
    pub response_ms: u64,
}

impl<'a> ScoreRequest<'a> {
    pub fn new(spoken: &'a str, target: &'a str) -> Self {
        Self {
            spoken,
            target,
            alternatives: &[],
            expected_pronunciation: None,
            response_ms: 0,
        }
    }

    pub fn with_alternatives(mut self, alternatives: &'a [String]) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_pronunciation(mut self, guide: &'a str) -> Self {
        self.expected_pronunciation = Some(guide);
        self
    }

    pub fn with_response_ms(mut self, ms: u64) -> Self {
        self.response_ms = ms;
        self
    }
}

/// Scores for one response, each in 0-100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseScore {
    pub accuracy: f64,
    pub pronunciation: f64,
    pub confidence: f64,
    pub hesitation: bool,
    /// Normalized exact match with the target or an alternative.
    pub is_correct: bool,
}

impl ResponseScore {
    /// Score handed to the scheduler.
    pub fn performance(&self) -> f64 {
        (self.accuracy + self.pronunciation) / 2.0
    }

    /// Recommended follow-up.
    pub fn next_step(&self, config: &ScoringConfig) -> NextStep {
        if self.is_correct && self.pronunciation >= config.continue_threshold {
            NextStep::Continue
        } else if self.pronunciation < config.explain_threshold {
            NextStep::Explain
        } else {
            NextStep::Repeat
        }
    }
}

/// Trait for response scorers.
pub trait ResponseScorer: Send + Sync {
    /// Scorer name.
    fn name(&self) -> &str;

    /// Grade a response.
    fn score(&self, request: &ScoreRequest<'_>) -> ResponseScore;
}

/// Edit-distance scorer over normalized text.
#[derive(Debug, Clone)]
pub struct LevenshteinScorer {
    /// Responses slower than this are hesitant.
    pub hesitation_threshold_ms: u64,
}

impl Default for LevenshteinScorer {
    fn default() -> Self {
        Self {
            hesitation_threshold_ms: 3000,
        }
    }
}

impl LevenshteinScorer {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            hesitation_threshold_ms: config.hesitation_threshold_ms,
        }
    }
}

impl ResponseScorer for LevenshteinScorer {
    fn name(&self) -> &str {
        "Levenshtein"
    }

    fn score(&self, request: &ScoreRequest<'_>) -> ResponseScore {
        let spoken = normalize(request.spoken);
        let hesitation = request.response_ms > self.hesitation_threshold_ms;
        if spoken.is_empty() {
            return ResponseScore {
                accuracy: 0.0,
                pronunciation: 0.0,
                confidence: 0.0,
                hesitation,
                is_correct: false,
            };
        }

        let mut is_correct = false;
        let mut best = 0.0_f64;
        for candidate in std::iter::once(request.target).chain(request.alternatives.iter().map(String::as_str)) {
            let candidate = normalize(candidate);
            if candidate == spoken {
                is_correct = true;
                best = 1.0;
                break;
            }
            best = best.max(similarity(&spoken, &candidate));
        }

        let accuracy = best * 100.0;
        let pronunciation = match request.expected_pronunciation {
            Some(guide) => similarity(&spoken, &normalize(guide)) * 100.0,
            None => accuracy,
        };

        ResponseScore {
            accuracy,
            pronunciation,
            confidence: (accuracy + pronunciation) / 2.0,
            hesitation,
            is_correct,
        }
    }
}

/// Lowercase, fold French diacritics, keep only `[a-z ]`, trim.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'à' | 'â' | 'ä' => 'a',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'û' | 'ü' | 'ù' => 'u',
            'ç' => 'c',
            c => c,
        };
        if folded.is_ascii_lowercase() || folded == ' ' {
            out.push(folded);
        }
    }
    out.trim().to_string()
}

/// Edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `(maxLen - distance) / maxLen` in 0-1. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (max_len - levenshtein(a, b)) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_diacritics() {
        assert_eq!(normalize("Pouvez-vous répéter ?"), "pouvezvous repeter");
        assert_eq!(normalize("S'il vous plaît"), "sil vous plait");
        assert_eq!(normalize("  Ça VA, Noël !"), "ca va noel");
        assert_eq!(normalize("Où ?"), "ou");
    }

    #[test]
    fn test_normalize_strips_everything_else() {
        assert_eq!(normalize("123 !?"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
    }

    #[test]
    fn test_similarity_empty() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "merci"), 0.0);
    }

    #[test]
    fn test_exact_match() {
        let scorer = LevenshteinScorer::default();
        let score = scorer.score(&ScoreRequest::new("bonjour", "Bonjour"));
        assert_eq!(score.accuracy, 100.0);
        assert_eq!(score.pronunciation, 100.0);
        assert_eq!(score.confidence, 100.0);
        assert!(score.is_correct);
    }

    #[test]
    fn test_empty_spoken() {
        let scorer = LevenshteinScorer::default();
        let score = scorer.score(&ScoreRequest::new("", "Bonjour"));
        assert_eq!(score.accuracy, 0.0);
        assert!(!score.is_correct);
    }

    #[test]
    fn test_silence_never_matches_punctuation_target() {
        let scorer = LevenshteinScorer::default();
        let score = scorer.score(&ScoreRequest::new("", "?!"));
        assert_eq!(score.accuracy, 0.0);
        assert_eq!(score.pronunciation, 0.0);
        assert!(!score.is_correct);

        let score = scorer.score(&ScoreRequest::new("...", "Bonjour").with_pronunciation("bohn-ZHOOR"));
        assert_eq!(score.pronunciation, 0.0);
    }

    #[test]
    fn test_alternative_accepted() {
        let scorer = LevenshteinScorer::default();
        let alts = vec!["Je voudrais un livre".to_string()];
        let score = scorer.score(
            &ScoreRequest::new("je voudrais un livre", "Je cherche un livre").with_alternatives(&alts),
        );
        assert!(score.is_correct);
        assert_eq!(score.accuracy, 100.0);
    }

    #[test]
    fn test_partial_match() {
        let scorer = LevenshteinScorer::default();
        let score = scorer.score(&ScoreRequest::new("merci beaucou", "Merci beaucoup"));
        assert!(score.accuracy > 90.0 && score.accuracy < 100.0);
        assert!(!score.is_correct);
    }

    #[test]
    fn test_phonetic_guide() {
        let scorer = LevenshteinScorer::default();
        let score = scorer.score(&ScoreRequest::new("mehr see", "Merci").with_pronunciation("mehr-SEE"));
        assert!(score.pronunciation > score.accuracy);
    }

    #[test]
    fn test_hesitation() {
        let scorer = LevenshteinScorer {
            hesitation_threshold_ms: 2000,
        };
        assert!(!scorer.score(&ScoreRequest::new("oui", "Oui").with_response_ms(2000)).hesitation);
        assert!(scorer.score(&ScoreRequest::new("oui", "Oui").with_response_ms(2001)).hesitation);
    }

    #[test]
    fn test_next_step() {
        let config = ScoringConfig::default();
        let scorer = LevenshteinScorer::default();

        let exact = scorer.score(&ScoreRequest::new("merci", "Merci"));
        assert_eq!(exact.next_step(&config), NextStep::Continue);

        let silent = scorer.score(&ScoreRequest::new("", "Merci"));
        assert_eq!(silent.next_step(&config), NextStep::Explain);

        let close = scorer.score(&ScoreRequest::new("je vais bie", "Je vais bien"));
        assert_eq!(close.next_step(&config), NextStep::Repeat);
    }
}
