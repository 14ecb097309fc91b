//! Upstream record sources feeding the offline indexer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{RagError, Result};
use crate::record::BakeryRecord;

/// A store of structured bakery records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short source name used in logs and errors.
    fn name(&self) -> &str;

    /// Load every record.
    async fn fetch_all(&self) -> Result<Vec<BakeryRecord>>;
}

/// Records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSource {
    records: Vec<BakeryRecord>,
}

impl InMemoryRecordSource {
    /// Wrap a list of records.
    pub fn new(records: Vec<BakeryRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn fetch_all(&self) -> Result<Vec<BakeryRecord>> {
        Ok(self.records.clone())
    }
}

/// Records loaded from a JSON array on disk, such as a crawler export.
///
/// Records are upserted by title: a later record with the same title
/// replaces the earlier one but keeps its position. Untitled records are
/// always kept. Array elements that are not valid records are skipped with a
/// warning; only an unreadable file or a non-array document fails the load.
#[derive(Debug, Clone)]
pub struct JsonFileRecordSource {
    path: PathBuf,
}

impl JsonFileRecordSource {
    /// Read records from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn source_error(&self, message: String) -> RagError {
        RagError::SourceError { source_name: self.path.display().to_string(), message }
    }

    fn parse_records(&self, bytes: &[u8]) -> Result<Vec<BakeryRecord>> {
        let values: Vec<Value> = serde_json::from_slice(bytes)
            .map_err(|e| self.source_error(format!("invalid record JSON: {e}")))?;

        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<BakeryRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = %self.path.display(), index, error = %e, "skipping malformed record");
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for JsonFileRecordSource {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn fetch_all(&self) -> Result<Vec<BakeryRecord>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.source_error(format!("failed to read file: {e}")))?;
        let records = self.parse_records(&bytes)?;

        let total = records.len();
        let records = upsert_by_title(records);
        debug!(path = %self.path.display(), total, unique = records.len(), "parsed record file");
        info!(source = self.name(), count = records.len(), "loaded bakery records");
        Ok(records)
    }
}

/// Collapse records sharing a title, last write wins, first position kept.
pub fn upsert_by_title(records: Vec<BakeryRecord>) -> Vec<BakeryRecord> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<BakeryRecord> = Vec::with_capacity(records.len());
    for record in records {
        match record.title.clone() {
            Some(title) => match positions.get(&title) {
                Some(&index) => unique[index] = record,
                None => {
                    positions.insert(title, unique.len());
                    unique.push(record);
                }
            },
            None => unique.push(record),
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Scores;

    #[test]
    fn later_records_replace_earlier_ones_with_the_same_title() {
        let records = vec![
            BakeryRecord::new("A").with_scores(Scores::new(1.0, 1.0, 1.0, 1.0)),
            BakeryRecord::new("B"),
            BakeryRecord::new("A").with_scores(Scores::new(2.0, 2.0, 2.0, 2.0)),
            BakeryRecord::default(),
        ];
        let unique = upsert_by_title(records);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0].title.as_deref(), Some("A"));
        assert_eq!(unique[0].scores, Scores::new(2.0, 2.0, 2.0, 2.0));
        assert_eq!(unique[1].title.as_deref(), Some("B"));
        assert_eq!(unique[2].title, None);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let source = JsonFileRecordSource::new("bakeries.json");
        let json = r#"[
            {"title": 123},
            {"title": "Bread A", "address": "서울시 종로구 1"},
            "not a record"
        ]"#
        .as_bytes();
        let records = source.parse_records(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Bread A"));
    }

    #[test]
    fn a_non_array_document_still_fails() {
        let source = JsonFileRecordSource::new("bakeries.json");
        let err = source.parse_records(br#"{"title": "Bread A"}"#).unwrap_err();
        assert!(matches!(err, RagError::SourceError { .. }));
    }

    #[tokio::test]
    async fn file_with_one_bad_record_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bakeries.json");
        tokio::fs::write(&path, r#"[{"title": ["x"]}, {"title": "Bread B"}]"#).await.unwrap();

        let records = JsonFileRecordSource::new(&path).fetch_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Bread B"));
    }
}
