//! Embedding provider trait for turning document and query text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text.
///
/// The same provider must embed both the indexed bakery documents and the
/// personality queries, otherwise similarity scores are meaningless. The
/// default [`embed_batch`](EmbeddingProvider::embed_batch) calls
/// [`embed`](EmbeddingProvider::embed) sequentially; backends with a native
/// batch endpoint should override it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of inputs, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;
}
