//! Core types for CineReview

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest star score
pub const SCORE_MIN: f64 = 0.0;

/// Highest star score
pub const SCORE_MAX: f64 = 5.0;

/// Middle of the star scale, used for every neutral outcome
pub const SCORE_MIDPOINT: f64 = (SCORE_MIN + SCORE_MAX) / 2.0;

/// Confidence reported when the sentiment model is unavailable
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Three-class probability output of a sentiment model.
///
/// Values are softmax outputs, each in `[0, 1]` and summing to roughly one.
/// Triples are produced per inference call and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTriple {
    /// P(negative)
    pub negative: f64,

    /// P(neutral)
    pub neutral: f64,

    /// P(positive)
    pub positive: f64,
}

impl ProbabilityTriple {
    /// Create a triple from the three class probabilities
    pub fn new(negative: f64, neutral: f64, positive: f64) -> Self {
        Self {
            negative,
            neutral,
            positive,
        }
    }

    /// Build a triple from model output ordered `[negative, neutral, positive]`.
    ///
    /// Returns `None` unless exactly three probabilities are given.
    pub fn from_ordered(probs: &[f32]) -> Option<Self> {
        match probs {
            [neg, neu, pos] => Some(Self::new(*neg as f64, *neu as f64, *pos as f64)),
            _ => None,
        }
    }

    /// Apply softmax to raw logits ordered `[negative, neutral, positive]`
    pub fn from_logits(negative: f64, neutral: f64, positive: f64) -> Self {
        let max = negative.max(neutral).max(positive);
        let (en, eu, ep) = (
            (negative - max).exp(),
            (neutral - max).exp(),
            (positive - max).exp(),
        );
        let sum = en + eu + ep;
        Self::new(en / sum, eu / sum, ep / sum)
    }

    /// Largest of the three probabilities
    pub fn max(&self) -> f64 {
        self.positive.max(self.negative).max(self.neutral)
    }

    /// Probabilities sorted from largest to smallest
    pub fn ranked(&self) -> [f64; 3] {
        let mut values = [self.positive, self.negative, self.neutral];
        values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        values
    }

    /// Difference between the largest and second-largest probability
    pub fn confidence_gap(&self) -> f64 {
        let ranked = self.ranked();
        ranked[0] - ranked[1]
    }
}

/// Sentiment label attached to a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Stable lowercase name, as stored and serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            other => Err(crate::Error::validation(format!(
                "unknown sentiment label '{other}'"
            ))),
        }
    }
}

/// Human-facing sentiment of a review.
///
/// Computed once when the review is created and stored verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Winning label
    pub label: SentimentLabel,

    /// Probability mass behind the label (0.0-1.0)
    pub confidence: f64,

    /// Star score on the `[0, 5]` scale
    pub score: f64,
}

impl SentimentResult {
    /// Create a new sentiment result
    pub fn new(label: SentimentLabel, confidence: f64, score: f64) -> Self {
        Self {
            label,
            confidence,
            score,
        }
    }

    /// Result substituted when the model cannot produce probabilities
    pub fn fallback() -> Self {
        Self::new(SentimentLabel::Neutral, FALLBACK_CONFIDENCE, SCORE_MIDPOINT)
    }

    /// Whole stars (1-5) shown for this result
    pub fn stars(&self) -> u8 {
        star_count(self.score)
    }
}

/// Number of filled stars (1-5) for a star score
pub fn star_count(score: f64) -> u8 {
    if score < 2.0 {
        1
    } else if score < 3.0 {
        2
    } else if score < 4.0 {
        3
    } else if score < 4.8 {
        4
    } else {
        5
    }
}

/// Render a star score as five filled/empty star glyphs
pub fn render_stars(score: f64) -> String {
    let filled = star_count(score) as usize;
    let mut stars = "★".repeat(filled);
    stars.push_str(&"☆".repeat(5 - filled));
    stars
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_gap() {
        let triple = ProbabilityTriple::new(0.05, 0.10, 0.85);
        assert!((triple.confidence_gap() - 0.75).abs() < 1e-9);
        assert_eq!(triple.max(), 0.85);
    }

    #[test]
    fn test_from_ordered_requires_three_values() {
        assert!(ProbabilityTriple::from_ordered(&[0.2, 0.8]).is_none());
        let triple = ProbabilityTriple::from_ordered(&[0.1, 0.2, 0.7]).unwrap();
        assert!((triple.positive - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_from_logits_sums_to_one() {
        let triple = ProbabilityTriple::from_logits(-1.0, 0.5, 3.0);
        let sum = triple.negative + triple.neutral + triple.positive;
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(triple.positive > triple.neutral);
        assert!(triple.neutral > triple.negative);
    }

    #[test]
    fn test_label_round_trip_through_str() {
        for label in [
            SentimentLabel::Positive,
            SentimentLabel::Neutral,
            SentimentLabel::Negative,
        ] {
            assert_eq!(label.as_str().parse::<SentimentLabel>().unwrap(), label);
        }
        assert!("weak_positive".parse::<SentimentLabel>().is_err());
    }

    #[test]
    fn test_label_serializes_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn test_fallback_is_neutral_midpoint() {
        let fallback = SentimentResult::fallback();
        assert_eq!(fallback.label, SentimentLabel::Neutral);
        assert_eq!(fallback.confidence, 0.5);
        assert_eq!(fallback.score, 2.5);
    }

    #[test]
    fn test_star_rendering() {
        assert_eq!(render_stars(1.2), "★☆☆☆☆");
        assert_eq!(render_stars(2.5), "★★☆☆☆");
        assert_eq!(render_stars(4.2), "★★★★☆");
        assert_eq!(render_stars(4.9), "★★★★★");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(4.4567, 2), 4.46);
        assert_eq!(round_to(0.85049, 3), 0.85);
    }
}
