//! Deterministic embedding providers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bakery_rag::{EmbeddingProvider, RagError};

pub const DIM: usize = 64;

/// Bag-of-characters embedding: texts sharing characters point the same way.
pub struct CharBagEmbedder;

#[async_trait]
impl EmbeddingProvider for CharBagEmbedder {
    fn name(&self) -> &str {
        "char_bag"
    }

    async fn embed(&self, text: &str) -> bakery_rag::Result<Vec<f32>> {
        let mut embedding = vec![0.0f32; DIM];
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            embedding[c as usize % DIM] += 1.0;
        }
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// An embedder whose upstream is always unavailable.
pub struct UnavailableEmbedder;

#[async_trait]
impl EmbeddingProvider for UnavailableEmbedder {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn embed(&self, _text: &str) -> bakery_rag::Result<Vec<f32>> {
        Err(RagError::EmbeddingError {
            provider: "unavailable".into(),
            message: "upstream unavailable".into(),
        })
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}
