//! Mixed-sentiment correction
//!
//! Sentiment models tend to be overconfident on reviews that praise one
//! aspect and criticise another ("great visuals, but the story drags").
//! When keyword evidence says the text is mixed and the model is confident
//! either way, the triple is replaced by a fixed soft-neutral one. The
//! rewrite discards the model's confidence; it is a correction heuristic,
//! not a recalibration.

use crate::keywords::KeywordCounts;
use cinereview_core::ProbabilityTriple;

/// Strong-negative keyword count at which the correction is skipped
pub const STRONG_NEGATIVE_OVERRIDE: usize = 2;

/// Winning probability above which a mixed text gets rewritten
pub const CONFIDENT_PROBABILITY: f64 = 0.6;

/// Triple substituted for confident scores on mixed text
pub const SOFT_NEUTRAL: ProbabilityTriple = ProbabilityTriple {
    negative: 0.2,
    neutral: 0.5,
    positive: 0.3,
};

/// Outcome of keyword analysis for one text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedSignal {
    /// Two or more strong-negative keywords; the raw triple is trusted
    StrongNegative,
    /// Keywords indicate mixed sentiment
    Mixed,
    /// No mixed-sentiment evidence
    Clear,
}

/// What the correction did to a triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Strong-negative override, triple untouched
    Skipped,
    /// Not mixed, or mixed but the model was not confident
    Unchanged,
    /// Triple replaced by [`SOFT_NEUTRAL`]
    Rewritten,
}

/// Keyword-driven softening of confident scores on mixed-sentiment text
#[derive(Debug, Clone, Copy, Default)]
pub struct MixedSentimentCorrection;

impl MixedSentimentCorrection {
    /// Classify keyword counts into a mixed-sentiment signal.
    ///
    /// The checks run in order and later checks override earlier ones:
    /// a contrastive connective marks the text mixed, co-occurring positive
    /// and negative words then set or clear the flag depending on negative
    /// dominance, and a hedge next to any sentiment word marks it mixed again.
    pub fn detect(&self, counts: &KeywordCounts) -> MixedSignal {
        if counts.strong_negative >= STRONG_NEGATIVE_OVERRIDE {
            return MixedSignal::StrongNegative;
        }

        let mut mixed = counts.has_contrast();

        if counts.positive >= 1 && counts.negative >= 1 {
            let negative_dominates =
                counts.negative + counts.strong_negative > counts.positive * 2;
            mixed = !negative_dominates;
        }

        if counts.has_hedge() && (counts.positive >= 1 || counts.negative >= 1) {
            mixed = true;
        }

        if mixed {
            MixedSignal::Mixed
        } else {
            MixedSignal::Clear
        }
    }

    /// Apply the correction to a raw triple
    pub fn apply(
        &self,
        triple: ProbabilityTriple,
        counts: &KeywordCounts,
    ) -> (ProbabilityTriple, Correction) {
        match self.detect(counts) {
            MixedSignal::StrongNegative => (triple, Correction::Skipped),
            MixedSignal::Mixed
                if triple.positive > CONFIDENT_PROBABILITY
                    || triple.negative > CONFIDENT_PROBABILITY =>
            {
                (SOFT_NEUTRAL, Correction::Rewritten)
            }
            _ => (triple, Correction::Unchanged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(
        contrast: usize,
        positive: usize,
        strong_negative: usize,
        negative: usize,
        hedge: usize,
    ) -> KeywordCounts {
        KeywordCounts {
            contrast,
            positive,
            strong_negative,
            negative,
            hedge,
        }
    }

    #[test]
    fn test_strong_negative_wins() {
        let c = counts(3, 3, 2, 1, 1);
        assert_eq!(MixedSentimentCorrection.detect(&c), MixedSignal::StrongNegative);
    }

    #[test]
    fn test_contrast_alone_is_mixed() {
        assert_eq!(
            MixedSentimentCorrection.detect(&counts(1, 0, 0, 0, 0)),
            MixedSignal::Mixed
        );
    }

    #[test]
    fn test_positive_and_negative_is_mixed() {
        assert_eq!(
            MixedSentimentCorrection.detect(&counts(0, 1, 0, 1, 0)),
            MixedSignal::Mixed
        );
    }

    #[test]
    fn test_negative_dominance_cancels_contrast() {
        // 3 negative + 1 strong > 2 * 1 positive
        assert_eq!(
            MixedSentimentCorrection.detect(&counts(1, 1, 1, 3, 0)),
            MixedSignal::Clear
        );
    }

    #[test]
    fn test_dominance_boundary_is_strict() {
        // 2 negative == 2 * 1 positive, not dominant
        assert_eq!(
            MixedSentimentCorrection.detect(&counts(0, 1, 0, 2, 0)),
            MixedSignal::Mixed
        );
    }

    #[test]
    fn test_hedge_restores_mixed_after_dominance() {
        assert_eq!(
            MixedSentimentCorrection.detect(&counts(1, 1, 1, 3, 1)),
            MixedSignal::Mixed
        );
    }

    #[test]
    fn test_hedge_needs_sentiment_word() {
        assert_eq!(
            MixedSentimentCorrection.detect(&counts(0, 0, 0, 0, 1)),
            MixedSignal::Clear
        );
        assert_eq!(
            MixedSentimentCorrection.detect(&counts(0, 0, 0, 1, 1)),
            MixedSignal::Mixed
        );
    }

    #[test]
    fn test_rewrite_only_when_confident() {
        let mixed = counts(1, 1, 0, 1, 0);
        let confident = ProbabilityTriple::new(0.05, 0.10, 0.85);
        let (adjusted, correction) = MixedSentimentCorrection.apply(confident, &mixed);
        assert_eq!(correction, Correction::Rewritten);
        assert_eq!(adjusted, SOFT_NEUTRAL);

        let unsure = ProbabilityTriple::new(0.30, 0.20, 0.50);
        let (adjusted, correction) = MixedSentimentCorrection.apply(unsure, &mixed);
        assert_eq!(correction, Correction::Unchanged);
        assert_eq!(adjusted, unsure);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mixed = counts(1, 0, 0, 0, 0);
        let at_threshold = ProbabilityTriple::new(0.6, 0.3, 0.1);
        let (_, correction) = MixedSentimentCorrection.apply(at_threshold, &mixed);
        assert_eq!(correction, Correction::Unchanged);
    }

    #[test]
    fn test_skipped_keeps_confident_negative() {
        let c = counts(1, 1, 2, 0, 0);
        let raw = ProbabilityTriple::new(0.9, 0.05, 0.05);
        assert_eq!(
            MixedSentimentCorrection.apply(raw, &c),
            (raw, Correction::Skipped)
        );
    }
}
