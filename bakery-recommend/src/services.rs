//! Process-wide service handles.
//!
//! [`BakeryServices`] owns the embedding provider, vector store and text
//! generator for the lifetime of the process. Components receive them from
//! here instead of constructing clients themselves, so tests can inject
//! fakes through [`BakeryServices::builder`].

use std::sync::Arc;

use bakery_rag::{EmbeddingProvider, Indexer, RetrievalConfig, SimilarityRetriever, VectorStore};
use tracing::info;

use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::generation::TextGenerator;
use crate::recommend::Recommender;

/// Shared handles to the external collaborators.
pub struct BakeryServices {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn TextGenerator>,
    retriever: Arc<SimilarityRetriever>,
    retrieval_config: RetrievalConfig,
    recommender_config: RecommenderConfig,
}

impl BakeryServices {
    /// Create a new builder for injecting service handles.
    pub fn builder() -> BakeryServicesBuilder {
        BakeryServicesBuilder::default()
    }

    /// Wire OpenAI embeddings and chat with the store selected by `config`.
    ///
    /// `QDRANT_URL` selects Qdrant (requires the `qdrant` feature); otherwise
    /// the index lives in memory.
    #[cfg(feature = "openai")]
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        use bakery_rag::openai::OpenAIEmbeddingProvider;

        use crate::openai::OpenAIChatGenerator;

        let mut embedder = OpenAIEmbeddingProvider::new(&config.openai_api_key)?
            .with_model(&config.embedding_model);
        let mut generator =
            OpenAIChatGenerator::new(&config.openai_api_key)?.with_model(&config.chat_model);
        if let Some(base_url) = &config.openai_base_url {
            embedder = embedder.with_base_url(base_url);
            generator = generator.with_base_url(base_url);
        }

        let retrieval_config = RetrievalConfig::builder().collection(&config.collection).build()?;

        Self::builder()
            .embedder(Arc::new(embedder))
            .vector_store(vector_store_for(config.qdrant_url.as_deref())?)
            .generator(Arc::new(generator))
            .retrieval_config(retrieval_config)
            .build()
    }

    /// The shared similarity retriever.
    pub fn retriever(&self) -> Arc<SimilarityRetriever> {
        Arc::clone(&self.retriever)
    }

    /// An indexer writing to the same collection the retriever reads.
    pub fn indexer(&self) -> Indexer {
        Indexer::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
            self.retrieval_config.clone(),
        )
    }

    /// A recommender using the configured generator.
    pub fn recommender(&self) -> Result<Recommender> {
        Recommender::new(self.retriever(), Arc::clone(&self.generator), self.recommender_config.clone())
    }

    /// Log readiness and the current collection size.
    pub async fn start(&self) -> Result<usize> {
        let count = self.retriever.document_count().await?;
        info!(
            collection = %self.retrieval_config.collection,
            embedder = self.embedder.name(),
            store = self.store.name(),
            generator = self.generator.name(),
            document_count = count,
            "bakery services started"
        );
        Ok(count)
    }

    /// Release every handle held by the container.
    pub fn shutdown(self) {
        info!(collection = %self.retrieval_config.collection, "bakery services shut down");
    }
}

#[cfg(feature = "openai")]
fn vector_store_for(qdrant_url: Option<&str>) -> Result<Arc<dyn VectorStore>> {
    match qdrant_url {
        #[cfg(feature = "qdrant")]
        Some(url) => Ok(Arc::new(bakery_rag::qdrant::QdrantVectorStore::new(url)?)),
        #[cfg(not(feature = "qdrant"))]
        Some(_) => Err(RecommendError::ConfigError(
            "QDRANT_URL is set but the `qdrant` feature is not enabled".to_string(),
        )),
        None => Ok(Arc::new(bakery_rag::InMemoryVectorStore::new())),
    }
}

/// Builder for [`BakeryServices`].
#[derive(Default)]
pub struct BakeryServicesBuilder {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    generator: Option<Arc<dyn TextGenerator>>,
    retrieval_config: Option<RetrievalConfig>,
    recommender_config: Option<RecommenderConfig>,
}

impl BakeryServicesBuilder {
    /// Set the embedding provider (required).
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store (required).
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the text generator (required).
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the retrieval configuration.
    pub fn retrieval_config(mut self, config: RetrievalConfig) -> Self {
        self.retrieval_config = Some(config);
        self
    }

    /// Set the recommender configuration.
    pub fn recommender_config(mut self, config: RecommenderConfig) -> Self {
        self.recommender_config = Some(config);
        self
    }

    /// Build the [`BakeryServices`].
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::ConfigError`] if the embedder, vector store
    /// or generator is missing, or the recommender configuration is invalid.
    pub fn build(self) -> Result<BakeryServices> {
        let missing = |what: &str| RecommendError::ConfigError(format!("{what} is required"));

        let embedder = self.embedder.ok_or_else(|| missing("embedder"))?;
        let store = self.store.ok_or_else(|| missing("vector_store"))?;
        let generator = self.generator.ok_or_else(|| missing("generator"))?;
        let retrieval_config = self.retrieval_config.unwrap_or_default();
        let recommender_config = self.recommender_config.unwrap_or_default();
        recommender_config.validate()?;

        let retriever = Arc::new(SimilarityRetriever::new(
            Arc::clone(&embedder),
            Arc::clone(&store),
            retrieval_config.clone(),
        ));

        Ok(BakeryServices {
            embedder,
            store,
            generator,
            retriever,
            retrieval_config,
            recommender_config,
        })
    }
}
