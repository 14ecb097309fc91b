//! Deterministic extraction of structured fields from document text.
//!
//! The patterns are built from the [`layout`](crate::layout) labels. Every
//! field is optional: a pattern that does not match yields `None`, never an
//! error.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::layout::{
    self, ADDRESS_LABEL, KEYWORDS_LABEL, NAME_LABEL, PRICE_LABEL, SCORE_LINE_LABEL, SERVICE_LABEL,
    TASTE_LABEL, TOTAL_LABEL,
};

fn labelled(label: &str, value: &str) -> Regex {
    let pattern = format!(r"{}[ \t]*({value})", regex::escape(label));
    Regex::new(&pattern).expect("layout label pattern is valid")
}

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?m)^{}[ \t]*([^\r\n]+)", regex::escape(NAME_LABEL));
    Regex::new(&pattern).expect("name line pattern is valid")
});
static SCORE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?m)^{}[ \t]*{}[^\r\n]*",
        regex::escape(SCORE_LINE_LABEL),
        regex::escape(TOTAL_LABEL)
    );
    Regex::new(&pattern).expect("score line pattern is valid")
});
static TOTAL: LazyLock<Regex> = LazyLock::new(|| labelled(TOTAL_LABEL, r"[\d.]+"));
static TASTE: LazyLock<Regex> = LazyLock::new(|| labelled(TASTE_LABEL, r"[\d.]+"));
static PRICE: LazyLock<Regex> = LazyLock::new(|| labelled(PRICE_LABEL, r"[\d.]+"));
static SERVICE: LazyLock<Regex> = LazyLock::new(|| labelled(SERVICE_LABEL, r"[\d.]+"));
static ADDRESS: LazyLock<Regex> = LazyLock::new(|| labelled(ADDRESS_LABEL, r"[^\r\n]+"));
// Only the trailing group of a review line, so label text inside review
// content is not mistaken for keywords.
static KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?m){}[ \t]*([^()\r\n]*)\)[ \t\r]*$", regex::escape(KEYWORDS_LABEL));
    Regex::new(&pattern).expect("keyword group pattern is valid")
});

/// How the taste, price and customer-service scores take their values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCapture {
    /// Each score takes the value captured by its own pattern.
    #[default]
    Independent,
    /// Compatibility with explanations produced by the single-result
    /// service: each score is present only if its own pattern matches, but
    /// its value is copied from the total-score capture.
    LegacyAliased,
}

/// Structured fields recovered from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBakeryFields {
    /// Bakery name.
    pub name: Option<String>,
    /// Overall score.
    #[serde(rename = "score")]
    pub total_score: Option<String>,
    /// Taste score.
    pub taste_score: Option<String>,
    /// Price score.
    pub price_score: Option<String>,
    /// Customer service score.
    pub cs_score: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Review keywords, deduplicated across the document and sorted.
    pub keywords: Vec<String>,
}

/// Parses document text produced by the [`DocumentBuilder`](crate::DocumentBuilder).
///
/// # Example
///
/// ```rust,ignore
/// use bakery_rag::FieldExtractor;
///
/// let fields = FieldExtractor::new().extract(&document.text);
/// println!("{:?} scored {:?}", fields.name, fields.total_score);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor {
    score_capture: ScoreCapture,
}

impl FieldExtractor {
    /// Create an extractor with independent score captures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select how the secondary scores are captured.
    pub fn with_score_capture(mut self, score_capture: ScoreCapture) -> Self {
        self.score_capture = score_capture;
        self
    }

    /// The configured score capture mode.
    pub fn score_capture(&self) -> ScoreCapture {
        self.score_capture
    }

    /// Extract every field from `text`.
    pub fn extract(&self, text: &str) -> ExtractedBakeryFields {
        // Score labels also occur in review text; prefer the score line.
        let score_line = SCORE_LINE.find(text).map_or(text, |m| m.as_str());
        // The address is free text and comes last.
        let scores = score_line.split(ADDRESS_LABEL).next().unwrap_or(score_line);

        let total_score = capture(&TOTAL, scores);
        let (taste_score, price_score, cs_score) = match self.score_capture {
            ScoreCapture::Independent => {
                (capture(&TASTE, scores), capture(&PRICE, scores), capture(&SERVICE, scores))
            }
            ScoreCapture::LegacyAliased => {
                let aliased = |pattern: &Regex| {
                    capture(pattern, scores).and_then(|_| total_score.clone())
                };
                (aliased(&TASTE), aliased(&PRICE), aliased(&SERVICE))
            }
        };

        ExtractedBakeryFields {
            name: extract_name(text),
            total_score,
            taste_score,
            price_score,
            cs_score,
            address: capture(&ADDRESS, score_line),
            keywords: extract_keywords(text),
        }
    }
}

/// First capture of `pattern` in `text`, trimmed; placeholders and empty
/// captures count as absent.
fn capture(pattern: &Regex, text: &str) -> Option<String> {
    let value = pattern.captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() || layout::is_placeholder(value) {
        return None;
    }
    Some(value.to_string())
}

/// The bakery name from the name line, if present.
pub fn extract_name(text: &str) -> Option<String> {
    capture(&NAME, text)
}

/// Collect every keyword group in the document into one sorted, deduplicated list.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let unique: BTreeSet<&str> = KEYWORDS
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|group| group.as_str().split(','))
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .collect();
    unique.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "빵집 이름: Bread A\n\
        평점: 총점 9.0, 맛 9.5, 가격 7.0, 고객서비스 8.0, 주소: 경기 성남시 분당구 판교역로 1\n\
        리뷰: 맛 10점 만점 (평점: 5, 키워드: 유럽풍, 신선함)\n\
        리뷰: again (평점: 4, 키워드: 신선함, 친절)";

    #[test]
    fn extracts_all_fields() {
        let fields = FieldExtractor::new().extract(TEXT);
        assert_eq!(fields.name.as_deref(), Some("Bread A"));
        assert_eq!(fields.total_score.as_deref(), Some("9.0"));
        assert_eq!(fields.taste_score.as_deref(), Some("9.5"));
        assert_eq!(fields.price_score.as_deref(), Some("7.0"));
        assert_eq!(fields.cs_score.as_deref(), Some("8.0"));
        assert_eq!(fields.address.as_deref(), Some("경기 성남시 분당구 판교역로 1"));
        assert_eq!(fields.keywords, vec!["신선함", "유럽풍", "친절"]);
    }

    #[test]
    fn legacy_mode_copies_the_total_capture() {
        let fields =
            FieldExtractor::new().with_score_capture(ScoreCapture::LegacyAliased).extract(TEXT);
        assert_eq!(fields.total_score.as_deref(), Some("9.0"));
        assert_eq!(fields.taste_score.as_deref(), Some("9.0"));
        assert_eq!(fields.price_score.as_deref(), Some("9.0"));
        assert_eq!(fields.cs_score.as_deref(), Some("9.0"));
    }

    #[test]
    fn legacy_mode_keeps_absence_of_the_own_pattern() {
        let text = "빵집 이름: B\n평점: 총점 8.0, 맛 N/A, 가격 6.0, 고객서비스 N/A, 주소: N/A";
        let fields =
            FieldExtractor::new().with_score_capture(ScoreCapture::LegacyAliased).extract(text);
        assert_eq!(fields.taste_score, None);
        assert_eq!(fields.price_score.as_deref(), Some("8.0"));
        assert_eq!(fields.cs_score, None);
    }

    #[test]
    fn unmatched_fields_are_absent() {
        let fields = FieldExtractor::new().extract("no layout here");
        assert_eq!(fields, ExtractedBakeryFields::default());
    }

    #[test]
    fn placeholders_are_absent() {
        let text = "빵집 이름: N/A\n평점: 총점 N/A, 맛 N/A, 가격 N/A, 고객서비스 N/A, 주소: N/A";
        let fields = FieldExtractor::new().extract(text);
        assert_eq!(fields, ExtractedBakeryFields::default());
    }

    #[test]
    fn empty_keyword_groups_are_ignored() {
        assert!(extract_keywords("리뷰: x (평점: 3, 키워드: )").is_empty());
    }
}
