//! Sentiment policy evaluation

use cinereview_core::{
    round_to, ProbabilityTriple, Result, SentimentLabel, SentimentResult, SCORE_MAX,
    SCORE_MIDPOINT, SCORE_MIN,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::correction::{Correction, MixedSentimentCorrection};
use crate::keywords::{KeywordCounts, KeywordMatcher, KeywordSets};

/// Both positive and negative above this means mixed feelings
pub const SUBSTANTIAL_PROBABILITY: f64 = 0.25;

/// Confidence gap at or below which no class is considered the winner
pub const CONFIDENCE_GAP_THRESHOLD: f64 = 0.1;

/// Gaps within this distance of the threshold count as equal to it
const GAP_EPSILON: f64 = 1e-9;

/// Decimal places kept for confidence
const CONFIDENCE_DECIMALS: u32 = 3;

/// Decimal places kept for the star score
const SCORE_DECIMALS: u32 = 2;

/// Identifies the scoring rules a result was produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyVersion {
    /// Six ordered decision rules, `[0, 5]` star scale, keyword correction
    #[serde(rename = "six-branch-5star-v1")]
    SixBranchFiveStar,
}

impl PolicyVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SixBranchFiveStar => "six-branch-5star-v1",
        }
    }
}

impl fmt::Display for PolicyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision rule that produced a label, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionRule {
    /// Positive and negative are both substantial
    BothSubstantial,
    /// Top two probabilities are too close to call
    NarrowGap,
    /// Neutral is the largest (ties included)
    NeutralLeads,
    /// Positive is strictly the largest
    PositiveLeads,
    /// Negative is strictly the largest
    NegativeLeads,
    /// No rule matched; only reachable with malformed probabilities
    Exhausted,
}

impl DecisionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BothSubstantial => "both_substantial",
            Self::NarrowGap => "narrow_gap",
            Self::NeutralLeads => "neutral_leads",
            Self::PositiveLeads => "positive_leads",
            Self::NegativeLeads => "negative_leads",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Unrounded label, confidence and score with the rule that produced them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivation {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub score: f64,
    pub rule: DecisionRule,
}

impl Derivation {
    fn neutral(confidence: f64, rule: DecisionRule) -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence,
            score: SCORE_MIDPOINT,
            rule,
        }
    }

    /// Round confidence and score for presentation
    pub fn rounded(&self) -> SentimentResult {
        SentimentResult::new(
            self.label,
            round_to(self.confidence, CONFIDENCE_DECIMALS),
            round_to(self.score, SCORE_DECIMALS),
        )
    }
}

/// Map a triple to label, confidence and star score.
///
/// Rules are checked in order and the first match wins. Positive scores
/// rise linearly from the midpoint to the top of the scale, negative scores
/// fall linearly from the midpoint to the bottom, so every bucket meets the
/// neutral midpoint without a jump.
pub fn derive_sentiment(triple: &ProbabilityTriple) -> Derivation {
    let ProbabilityTriple {
        negative: neg,
        neutral: neu,
        positive: pos,
    } = *triple;

    if pos > SUBSTANTIAL_PROBABILITY && neg > SUBSTANTIAL_PROBABILITY {
        return Derivation::neutral(neu, DecisionRule::BothSubstantial);
    }

    if triple.confidence_gap() < CONFIDENCE_GAP_THRESHOLD + GAP_EPSILON {
        return Derivation::neutral(neu, DecisionRule::NarrowGap);
    }

    if neu >= pos && neu >= neg {
        return Derivation::neutral(neu, DecisionRule::NeutralLeads);
    }

    if pos > neu && pos > neg {
        return Derivation {
            label: SentimentLabel::Positive,
            confidence: pos,
            score: SCORE_MIDPOINT + pos * (SCORE_MAX - SCORE_MIDPOINT),
            rule: DecisionRule::PositiveLeads,
        };
    }

    if neg > neu && neg > pos {
        return Derivation {
            label: SentimentLabel::Negative,
            confidence: neg,
            score: SCORE_MIDPOINT - neg * (SCORE_MIDPOINT - SCORE_MIN),
            rule: DecisionRule::NegativeLeads,
        };
    }

    warn!(neg, neu, pos, "Sentiment policy exhausted its rules, applying neutral default");
    metrics::counter!("cinereview_policy_exhausted_total").increment(1);
    Derivation::neutral(triple.max(), DecisionRule::Exhausted)
}

/// Full trace of one policy evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Rounded result to store with the review
    pub result: SentimentResult,

    /// Rule that produced the label
    pub rule: DecisionRule,

    /// Keyword counts found in the text
    pub counts: KeywordCounts,

    /// What the mixed-sentiment correction did
    pub correction: Correction,

    /// Triple as produced by the model
    pub raw: ProbabilityTriple,

    /// Triple the rules were applied to
    pub adjusted: ProbabilityTriple,
}

/// Versioned sentiment policy.
///
/// Cheap to clone; the compiled keyword matcher is shared.
#[derive(Debug, Clone)]
pub struct SentimentPolicy {
    version: PolicyVersion,
    matcher: Arc<KeywordMatcher>,
    correction: MixedSentimentCorrection,
}

impl SentimentPolicy {
    /// Create the policy with the built-in keyword tables
    pub fn new() -> Result<Self> {
        Self::with_keywords(&KeywordSets::default())
    }

    /// Create the policy with custom keyword tables
    pub fn with_keywords(sets: &KeywordSets) -> Result<Self> {
        Ok(Self {
            version: PolicyVersion::SixBranchFiveStar,
            matcher: Arc::new(KeywordMatcher::new(sets)?),
            correction: MixedSentimentCorrection,
        })
    }

    /// Version of the rules this policy applies
    pub fn version(&self) -> PolicyVersion {
        self.version
    }

    /// Evaluate a model triple against the review text
    pub fn evaluate(&self, raw: ProbabilityTriple, text: &str) -> Evaluation {
        let counts = self.matcher.count(text);
        let (adjusted, correction) = self.correction.apply(raw, &counts);

        if correction == Correction::Rewritten {
            debug!(
                pos = raw.positive,
                neg = raw.negative,
                "Mixed sentiment detected, softening confident triple"
            );
        }

        let derivation = derive_sentiment(&adjusted);

        Evaluation {
            result: derivation.rounded(),
            rule: derivation.rule,
            counts,
            correction,
            raw,
            adjusted,
        }
    }

    /// Evaluate and return only the rounded result
    pub fn score(&self, raw: ProbabilityTriple, text: &str) -> SentimentResult {
        self.evaluate(raw, text).result
    }
}
