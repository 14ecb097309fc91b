//! Structured bakery records as stored by the upstream record store.
//!
//! Field names follow the upstream JSON shape (`_id`, `scores.total_score`,
//! `reviews[].keywords`, ...). Every field is optional: the document builder
//! substitutes a placeholder for anything missing.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One bakery as stored upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BakeryRecord {
    /// Upstream identifier.
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Display name of the bakery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Score breakdown.
    #[serde(default)]
    pub scores: Scores,
    /// Reviews in upstream order, including any malformed entries.
    #[serde(default)]
    pub reviews: Vec<ReviewEntry>,
}

impl BakeryRecord {
    /// Create a record with the given title and nothing else.
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Self::default() }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(RecordId::Text(id.into()));
        self
    }

    /// Set the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the score breakdown.
    pub fn with_scores(mut self, scores: Scores) -> Self {
        self.scores = scores;
        self
    }

    /// Append a well-formed review.
    pub fn with_review(mut self, review: Review) -> Self {
        self.reviews.push(ReviewEntry::Review(review));
        self
    }
}

/// Upstream identifiers are plain strings, numbers, or extended-JSON
/// object ids (`{"$oid": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecordId {
    /// `{"$oid": "..."}`
    ObjectId {
        /// Hex object id.
        #[serde(rename = "$oid")]
        oid: String,
    },
    /// Numeric id.
    Number(i64),
    /// Any string id.
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectId { oid } => f.write_str(oid),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The four scores of a bakery.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scores {
    /// Overall score.
    #[serde(rename = "total_score", alias = "total", default, skip_serializing_if = "Option::is_none")]
    pub total: Option<ScoreValue>,
    /// Taste score.
    #[serde(rename = "taste_score", alias = "taste", default, skip_serializing_if = "Option::is_none")]
    pub taste: Option<ScoreValue>,
    /// Price score.
    #[serde(rename = "price_score", alias = "price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<ScoreValue>,
    /// Customer service score.
    #[serde(
        rename = "cs_score",
        alias = "customer_service",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_service: Option<ScoreValue>,
}

impl Scores {
    /// Build a breakdown from four decimal scores.
    pub fn new(total: f64, taste: f64, price: f64, customer_service: f64) -> Self {
        Self {
            total: Some(ScoreValue::Decimal(total)),
            taste: Some(ScoreValue::Decimal(taste)),
            price: Some(ScoreValue::Decimal(price)),
            customer_service: Some(ScoreValue::Decimal(customer_service)),
        }
    }
}

/// A score as it appears upstream.
///
/// Integers render without a fractional part, decimals always carry at
/// least one fractional digit (`9.0`, `4.25`), text renders verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScoreValue {
    /// Whole number score.
    Integer(i64),
    /// Decimal score.
    Decimal(f64),
    /// Score stored as text.
    Text(String),
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Decimal(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ScoreValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<i64> for ScoreValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A single customer review.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Review body.
    #[serde(default)]
    pub content: String,
    /// Score given by the reviewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreValue>,
    /// Keywords attached to the review.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Review {
    /// Create a review.
    pub fn new(
        content: impl Into<String>,
        score: impl Into<ScoreValue>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            content: content.into(),
            score: Some(score.into()),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// A review slot in a record: either a well-formed review or whatever
/// value the upstream store held in its place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "Value", into = "Value")]
pub enum ReviewEntry {
    /// A review object.
    Review(Review),
    /// A value that is not a review object.
    Malformed(Value),
}

impl From<Value> for ReviewEntry {
    fn from(value: Value) -> Self {
        if !value.is_object() {
            return Self::Malformed(value);
        }
        match serde_json::from_value::<Review>(value.clone()) {
            Ok(review) => Self::Review(review),
            Err(_) => Self::Malformed(value),
        }
    }
}

impl From<ReviewEntry> for Value {
    fn from(entry: ReviewEntry) -> Self {
        match entry {
            ReviewEntry::Review(review) => serde_json::to_value(review).unwrap_or(Value::Null),
            ReviewEntry::Malformed(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_scores_keep_a_fractional_digit() {
        assert_eq!(ScoreValue::Decimal(9.0).to_string(), "9.0");
        assert_eq!(ScoreValue::Decimal(4.25).to_string(), "4.25");
        assert_eq!(ScoreValue::Integer(5).to_string(), "5");
        assert_eq!(ScoreValue::Text("4.5".into()).to_string(), "4.5");
    }

    #[test]
    fn parses_upstream_shape() {
        let record: BakeryRecord = serde_json::from_value(json!({
            "_id": {"$oid": "65f0c0ffee"},
            "title": "Bread A",
            "scores": {"total_score": 9.0, "taste_score": 9.5, "price_score": 7, "cs_score": "8.0"},
            "reviews": [
                {"content": "great croissants", "score": 5, "keywords": ["유럽풍"]},
                "not a review",
                {"content": 42}
            ]
        }))
        .unwrap();

        assert_eq!(record.id.as_ref().map(ToString::to_string).as_deref(), Some("65f0c0ffee"));
        assert_eq!(record.scores.total, Some(ScoreValue::Decimal(9.0)));
        assert_eq!(record.scores.price, Some(ScoreValue::Integer(7)));
        assert_eq!(record.scores.customer_service, Some(ScoreValue::Text("8.0".into())));
        assert!(matches!(record.reviews[0], ReviewEntry::Review(_)));
        assert!(matches!(record.reviews[1], ReviewEntry::Malformed(_)));
        assert!(matches!(record.reviews[2], ReviewEntry::Malformed(_)));
    }
}
