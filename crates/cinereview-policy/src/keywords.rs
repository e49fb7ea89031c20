//! Keyword tables for mixed-sentiment detection
//!
//! Matching is substring-based and case-sensitive: a keyword counts when it
//! appears anywhere in the text, including inside a longer word. Each table
//! entry counts at most once per text, so the count of a category is the
//! number of its entries present in the text.

use aho_corasick::AhoCorasick;
use cinereview_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The five keyword categories used by the mixed-sentiment correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSets {
    /// Contrastive connectives ("but", "however")
    pub contrast: Vec<String>,

    /// Positive-sentiment words
    pub positive: Vec<String>,

    /// Strong-negative words; two or more disable the correction
    pub strong_negative: Vec<String>,

    /// General-negative words
    pub negative: Vec<String>,

    /// Hedging and conditional qualifiers ("a bit", "somewhat")
    pub hedge: Vec<String>,
}

const CONTRAST: &[&str] = &[
    "하지만", "그러나", "다만", "그런데", "근데", "BUT", "but", "오히려", "반면", "대신", "비록",
    "반대로", "아니라",
];

// "훌륭" is listed twice on purpose; both entries count.
const POSITIVE: &[&str] = &[
    "좋", "최고", "훌륭", "멋지", "완벽", "감동", "재밌", "재미", "화려", "압도", "대단", "멋",
    "환상", "끝내주", "굿", "좋아", "즐", "만족", "추천", "볼만", "괜찮", "훌륭", "대박",
    "재미있", "감명", "인상", "몰입", "수작", "명작", "일품", "예술", "탄탄", "짱",
];

const STRONG_NEGATIVE: &[&str] = &[
    "조잡", "졸작", "최악", "형편없", "쓰레기", "망작", "실패", "지루", "하품", "산만", "거슬리",
];

const NEGATIVE: &[&str] = &[
    "아쉽", "아쉬움", "단점", "별로", "실망", "비슷", "뻔", "안", "못", "없", "나쁘", "평범",
    "무난", "그저", "그냥", "그럭저럭",
];

const HEDGE: &[&str] = &["~만", "조금", "약간", "다소", "어느정도", "나름"];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            contrast: owned(CONTRAST),
            positive: owned(POSITIVE),
            strong_negative: owned(STRONG_NEGATIVE),
            negative: owned(NEGATIVE),
            hedge: owned(HEDGE),
        }
    }
}

impl KeywordSets {
    /// Load keyword sets from a YAML string.
    ///
    /// Categories missing from the document keep their built-in tables.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load keyword sets from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            cinereview_core::Error::config(format!(
                "Failed to parse keyword file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Per-category keyword counts for one text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordCounts {
    pub contrast: usize,
    pub positive: usize,
    pub strong_negative: usize,
    pub negative: usize,
    pub hedge: usize,
}

impl KeywordCounts {
    /// At least one contrastive connective is present
    pub fn has_contrast(&self) -> bool {
        self.contrast > 0
    }

    /// At least one hedging qualifier is present
    pub fn has_hedge(&self) -> bool {
        self.hedge > 0
    }
}

/// Compiled matchers for the five keyword categories
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    contrast: CategoryMatcher,
    positive: CategoryMatcher,
    strong_negative: CategoryMatcher,
    negative: CategoryMatcher,
    hedge: CategoryMatcher,
}

impl KeywordMatcher {
    /// Build matchers from keyword sets
    pub fn new(sets: &KeywordSets) -> Result<Self> {
        Ok(Self {
            contrast: CategoryMatcher::new("contrast", &sets.contrast)?,
            positive: CategoryMatcher::new("positive", &sets.positive)?,
            strong_negative: CategoryMatcher::new("strong_negative", &sets.strong_negative)?,
            negative: CategoryMatcher::new("negative", &sets.negative)?,
            hedge: CategoryMatcher::new("hedge", &sets.hedge)?,
        })
    }

    /// Count the keywords of every category present in `text`
    pub fn count(&self, text: &str) -> KeywordCounts {
        KeywordCounts {
            contrast: self.contrast.count(text),
            positive: self.positive.count(text),
            strong_negative: self.strong_negative.count(text),
            negative: self.negative.count(text),
            hedge: self.hedge.count(text),
        }
    }
}

#[derive(Debug, Clone)]
struct CategoryMatcher {
    automaton: AhoCorasick,
    patterns: usize,
}

impl CategoryMatcher {
    fn new(category: &str, keywords: &[String]) -> Result<Self> {
        let automaton = AhoCorasick::new(keywords).map_err(|e| {
            cinereview_core::Error::config(format!(
                "Failed to build {category} keyword matcher: {e}"
            ))
        })?;

        Ok(Self {
            automaton,
            patterns: keywords.len(),
        })
    }

    /// Number of distinct table entries found in `text`
    fn count(&self, text: &str) -> usize {
        if self.patterns == 0 {
            return 0;
        }

        let mut seen = vec![false; self.patterns];
        for mat in self.automaton.find_overlapping_iter(text) {
            seen[mat.pattern().as_usize()] = true;
        }
        seen.into_iter().filter(|hit| *hit).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::new(&KeywordSets::default()).unwrap()
    }

    #[test]
    fn test_substring_matching() {
        // "좋" matches inside "좋았다", "좋아" matches as well
        let counts = matcher().count("정말 좋아했다");
        assert_eq!(counts.positive, 2);
    }

    #[test]
    fn test_each_keyword_counted_once() {
        let counts = matcher().count("최악 최악 최악");
        assert_eq!(counts.strong_negative, 1);
    }

    #[test]
    fn test_overlapping_keywords_all_count() {
        // "재미있" contains "재미"; both entries are present
        let counts = matcher().count("재미있는 영화");
        assert_eq!(counts.positive, 2);
    }

    #[test]
    fn test_duplicate_table_entries_both_count() {
        let counts = matcher().count("훌륭한 연기");
        assert_eq!(counts.positive, 2);
    }

    #[test]
    fn test_case_sensitive_contrast() {
        let m = matcher();
        assert_eq!(m.count("good but slow").contrast, 1);
        assert_eq!(m.count("good BUT slow").contrast, 1);
        assert_eq!(m.count("good But slow").contrast, 0);
    }

    #[test]
    fn test_no_keywords() {
        let counts = matcher().count("plain text");
        assert_eq!(counts, KeywordCounts::default());
        assert!(!counts.has_contrast());
        assert!(!counts.has_hedge());
    }

    #[test]
    fn test_yaml_override_keeps_missing_categories() {
        let yaml = r#"
contrast:
  - "however"
positive:
  - "great"
"#;
        let sets = KeywordSets::from_yaml(yaml).unwrap();
        assert_eq!(sets.contrast, vec!["however".to_string()]);
        assert_eq!(sets.positive, vec!["great".to_string()]);
        assert_eq!(sets.hedge, KeywordSets::default().hedge);

        let counts = KeywordMatcher::new(&sets).unwrap().count("great, however long");
        assert_eq!(counts.contrast, 1);
        assert_eq!(counts.positive, 1);
    }

    #[test]
    fn test_empty_category() {
        let sets = KeywordSets {
            hedge: Vec::new(),
            ..Default::default()
        };
        let counts = KeywordMatcher::new(&sets).unwrap().count("조금 약간");
        assert_eq!(counts.hedge, 0);
    }
}
