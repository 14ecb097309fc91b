//! Recommendation assembly: retrieve, extract, explain, merge.

use std::sync::Arc;

use bakery_rag::{BakeryDocument, ExtractedBakeryFields, FieldExtractor, SimilarityRetriever};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{GenerationFailurePolicy, RecommenderConfig};
use crate::error::{RecommendError, Result};
use crate::explain::{BatchSlot, ExplanationConstraints, ExplanationRequester};
use crate::generation::TextGenerator;

/// How many bakeries a request asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendMode {
    /// The single best match.
    #[default]
    Single,
    /// The three best matches.
    Multi,
}

impl RecommendMode {
    /// Number of candidates retrieved in this mode.
    pub fn top_k(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Multi => 3,
        }
    }
}

/// One recommended bakery: its extracted fields plus the explanation.
///
/// Serializes flat, e.g.
/// `{"name": .., "score": .., "taste_score": .., "price_score": ..,
/// "cs_score": .., "address": .., "keywords": [..], "explanation": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    #[serde(flatten)]
    pub fields: ExtractedBakeryFields,
    pub explanation: String,
}

/// Matches a personality description to bakeries and explains each match.
///
/// # Example
///
/// ```rust,ignore
/// use bakery_recommend::{RecommendMode, Recommender, RecommenderConfig};
///
/// let recommender = Recommender::new(retriever, generator, RecommenderConfig::default())?;
/// let entries = recommender
///     .recommend_mode("조용하고 클래식한 걸 좋아해요", RecommendMode::Multi)
///     .await?;
/// ```
pub struct Recommender {
    retriever: Arc<SimilarityRetriever>,
    explainer: ExplanationRequester,
    extractor: FieldExtractor,
    config: RecommenderConfig,
}

impl Recommender {
    /// Create a recommender over `retriever`, explaining with `generator`.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::ConfigError`] if `config` does not validate.
    pub fn new(
        retriever: Arc<SimilarityRetriever>,
        generator: Arc<dyn TextGenerator>,
        config: RecommenderConfig,
    ) -> Result<Self> {
        config.validate()?;
        let explainer = ExplanationRequester::new(generator)
            .with_constraints(ExplanationConstraints {
                min_lines: config.min_explanation_lines,
                max_lines: config.max_explanation_lines,
            })
            .with_temperature(config.temperature);
        let extractor = FieldExtractor::new().with_score_capture(config.score_capture);
        Ok(Self { retriever, explainer, extractor, config })
    }

    /// Returns the recommender configuration.
    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Recommend with the candidate count implied by `mode`.
    pub async fn recommend_mode(
        &self,
        personality: &str,
        mode: RecommendMode,
    ) -> Result<Vec<RecommendationEntry>> {
        self.recommend(personality, mode.top_k()).await
    }

    /// Recommend up to `k` bakeries for `personality`, best match first.
    ///
    /// Fewer than `k` indexed bakeries yield fewer entries.
    ///
    /// # Errors
    ///
    /// - [`RecommendError::InvalidInput`] for a blank personality or `k == 0`
    /// - [`RecommendError::Retrieval`] if the similarity search fails
    /// - [`RecommendError::GenerationError`] for the first failed explanation
    ///   under [`GenerationFailurePolicy::Abort`]
    /// - any other explanation error, whatever the policy
    pub async fn recommend(&self, personality: &str, k: usize) -> Result<Vec<RecommendationEntry>> {
        let personality = personality.trim();
        if personality.is_empty() {
            return Err(RecommendError::InvalidInput("personality must not be empty".to_string()));
        }
        if k == 0 {
            return Err(RecommendError::InvalidInput("k must be at least 1".to_string()));
        }

        info!(k, "recommending bakeries");
        let documents = self.retriever.search(personality, k).await?;
        debug!(k, candidates = documents.len(), "retrieved candidates");

        let names: Vec<Option<String>> =
            documents.iter().map(|doc| bakery_rag::extract_name(&doc.text)).collect();
        let slot = |position: usize| BatchSlot {
            position,
            size: documents.len(),
            earlier_names: names[..position].iter().flatten().cloned().collect(),
        };

        let explanations = if self.config.parallel_explanations {
            join_all(
                documents
                    .iter()
                    .enumerate()
                    .map(|(i, doc)| self.explainer.explain(personality, &doc.text, slot(i))),
            )
            .await
        } else {
            let mut explanations = Vec::with_capacity(documents.len());
            for (i, doc) in documents.iter().enumerate() {
                let result = self.explainer.explain(personality, &doc.text, slot(i)).await;
                let failed = result.is_err();
                explanations.push(result);
                if failed && self.config.failure_policy == GenerationFailurePolicy::Abort {
                    break;
                }
            }
            explanations
        };

        let mut entries = Vec::with_capacity(explanations.len());
        for (doc, explanation) in documents.iter().zip(explanations) {
            match explanation {
                Ok(explanation) => entries.push(self.entry(doc, explanation)),
                Err(e @ RecommendError::GenerationError { .. })
                    if self.config.failure_policy == GenerationFailurePolicy::Skip =>
                {
                    warn!(record_id = doc.id(), error = %e, "skipping candidate without explanation");
                }
                Err(e) => return Err(e),
            }
        }

        info!(requested = k, returned = entries.len(), "recommendation completed");
        Ok(entries)
    }

    fn entry(&self, document: &BakeryDocument, explanation: String) -> RecommendationEntry {
        RecommendationEntry { fields: self.extractor.extract(&document.text), explanation }
    }
}
