//! Converts structured bakery records into retrievable documents.

use tracing::{debug, warn};

use crate::document::{BakeryDocument, DocumentMetadata};
use crate::layout::{self, PLACEHOLDER};
use crate::record::{BakeryRecord, ReviewEntry, ScoreValue};

/// Renders [`BakeryRecord`]s into [`BakeryDocument`]s.
///
/// Missing fields render as the layout placeholder so the text is always
/// parseable. Malformed review entries are skipped with a warning.
///
/// # Example
///
/// ```rust,ignore
/// use bakery_rag::{BakeryRecord, DocumentBuilder, Scores};
///
/// let record = BakeryRecord::new("Bread A").with_scores(Scores::new(9.0, 9.5, 7.0, 8.0));
/// let document = DocumentBuilder::new().build(&record);
/// assert!(document.text.starts_with("빵집 이름: Bread A"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentBuilder;

impl DocumentBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self
    }

    /// Build the document for one record.
    ///
    /// A record without an id gets a UUID v5 derived from its title (or,
    /// lacking one, from its rendered text), so rebuilding the same record
    /// always yields the same id.
    pub fn build(&self, record: &BakeryRecord) -> BakeryDocument {
        let title = layout::single_line(record.title.as_deref().unwrap_or(PLACEHOLDER));
        let scores = &record.scores;
        let mut lines = vec![
            layout::name_line(&title),
            layout::score_line(
                &render_score(scores.total.as_ref()),
                &render_score(scores.taste.as_ref()),
                &render_score(scores.price.as_ref()),
                &render_score(scores.customer_service.as_ref()),
                record.address.as_deref().unwrap_or(PLACEHOLDER),
            ),
        ];

        for (index, entry) in record.reviews.iter().enumerate() {
            match entry {
                ReviewEntry::Review(review) => {
                    let score = review.score.as_ref().map(ToString::to_string).unwrap_or_default();
                    lines.push(layout::review_line(&review.content, &score, &review.keywords));
                }
                ReviewEntry::Malformed(value) => {
                    warn!(title = %title, review_index = index, review = %value, "skipping malformed review");
                }
            }
        }

        let text = lines.join("\n");
        let record_id = match &record.id {
            Some(id) => id.to_string(),
            None => {
                let seed = if record.title.is_some() { title.as_str() } else { text.as_str() };
                let derived = stable_id(seed);
                debug!(title = %title, record_id = %derived, "record has no id, derived one");
                derived
            }
        };

        BakeryDocument { text, metadata: DocumentMetadata { record_id, title } }
    }

    /// Build documents for a batch of records, preserving order.
    pub fn build_all(&self, records: &[BakeryRecord]) -> Vec<BakeryDocument> {
        records.iter().map(|record| self.build(record)).collect()
    }
}

fn stable_id(seed: &str) -> String {
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, seed.as_bytes()).to_string()
}

fn render_score(score: Option<&ScoreValue>) -> String {
    score.map_or_else(|| PLACEHOLDER.to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ids_are_derived_stably_from_the_title() {
        let builder = DocumentBuilder::new();
        let a = BakeryRecord::new("Bread A");
        let first = builder.build(&a);
        let again = builder.build(&a.clone().with_address("서울시 종로구 1"));
        let other = builder.build(&BakeryRecord::new("Bread B"));

        assert_eq!(first.metadata.record_id, again.metadata.record_id);
        assert_ne!(first.metadata.record_id, other.metadata.record_id);
        assert!(uuid::Uuid::parse_str(&first.metadata.record_id).is_ok());
    }

    #[test]
    fn explicit_ids_are_kept() {
        let document = DocumentBuilder::new().build(&BakeryRecord::new("Bread A").with_id("b1"));
        assert_eq!(document.metadata.record_id, "b1");
    }
}
