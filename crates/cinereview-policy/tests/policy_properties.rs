//! Property tests for the sentiment policy

use cinereview_core::{ProbabilityTriple, SentimentLabel};
use cinereview_policy::{derive_sentiment, Correction, KeywordSets, SentimentPolicy};
use proptest::prelude::*;

fn probability() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

fn normalized_triple() -> impl Strategy<Value = ProbabilityTriple> {
    (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0).prop_filter_map("non-zero mass", |(a, b, c)| {
        let sum = a + b + c;
        (sum > 1e-6).then(|| ProbabilityTriple::new(a / sum, b / sum, c / sum))
    })
}

fn keyword_text() -> impl Strategy<Value = String> {
    let sets = KeywordSets::default();
    let vocabulary: Vec<String> = sets
        .contrast
        .iter()
        .chain(&sets.positive)
        .chain(&sets.negative)
        .chain(&sets.hedge)
        .cloned()
        .chain(["영화".to_string(), "배우".to_string(), " ".to_string()])
        .collect();
    prop::collection::vec(prop::sample::select(vocabulary), 0..12).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(triple in normalized_triple(), text in keyword_text()) {
        let policy = SentimentPolicy::new().unwrap();
        let first = policy.evaluate(triple, &text);
        let second = policy.evaluate(triple, &text);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn positive_score_never_decreases(
        neg in probability(),
        neu in probability(),
        p1 in probability(),
        p2 in probability(),
    ) {
        let (low, high) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
        let a = derive_sentiment(&ProbabilityTriple::new(neg, neu, low));
        let b = derive_sentiment(&ProbabilityTriple::new(neg, neu, high));

        if a.label == SentimentLabel::Positive {
            prop_assert_eq!(b.label, SentimentLabel::Positive);
            prop_assert!(b.score >= a.score);
            prop_assert!(b.rounded().score >= a.rounded().score);
        }
    }

    #[test]
    fn negative_score_never_increases(
        pos in probability(),
        neu in probability(),
        n1 in probability(),
        n2 in probability(),
    ) {
        let (low, high) = if n1 <= n2 { (n1, n2) } else { (n2, n1) };
        let a = derive_sentiment(&ProbabilityTriple::new(low, neu, pos));
        let b = derive_sentiment(&ProbabilityTriple::new(high, neu, pos));

        if a.label == SentimentLabel::Negative {
            prop_assert_eq!(b.label, SentimentLabel::Negative);
            prop_assert!(b.score <= a.score);
        }
    }

    #[test]
    fn scores_stay_on_scale(triple in normalized_triple()) {
        let result = derive_sentiment(&triple).rounded();
        prop_assert!((0.0..=5.0).contains(&result.score));
        prop_assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn strong_negative_text_is_never_rewritten(
        triple in normalized_triple(),
        text in keyword_text(),
    ) {
        let policy = SentimentPolicy::new().unwrap();
        let text = format!("최악 {text} 지루");
        let eval = policy.evaluate(triple, &text);
        prop_assert_eq!(eval.correction, Correction::Skipped);
        prop_assert_eq!(eval.adjusted, triple);
    }
}
