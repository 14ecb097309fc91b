//! Shared fixtures for recommendation tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bakery_rag::{BakeryRecord, EmbeddingProvider, InMemoryVectorStore, Review, Scores};
use bakery_recommend::{BakeryServices, MockGenerator, RecommenderConfig};

const DIM: usize = 64;

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

pub fn bread_a() -> BakeryRecord {
    BakeryRecord::new("Bread A")
        .with_id("b1")
        .with_address("서울시 종로구 1")
        .with_scores(Scores::new(9.0, 9.5, 7.0, 8.0))
        .with_review(Review::new("유럽에 온 것 같아요", 5i64, ["유럽풍", "신선함"]))
}

pub fn records() -> Vec<BakeryRecord> {
    vec![
        bread_a(),
        BakeryRecord::new("SNS 핫플 빵집")
            .with_id("b2")
            .with_address("서울시 성수동 2")
            .with_scores(Scores::new(8.0, 8.0, 6.5, 7.0))
            .with_review(Review::new("사진 찍기 좋아요", 4i64, ["인스타", "핫플"])),
        BakeryRecord::new("동네 식빵집")
            .with_id("b3")
            .with_scores(Scores::new(7.5, 8.5, 9.5, 9.0))
            .with_review(Review::new("매일 가는 곳", 5i64, ["가성비", "단골"])),
    ]
}

/// Services over an in-memory index holding `records`.
pub async fn services(
    records: &[BakeryRecord],
    generator: Arc<MockGenerator>,
    config: RecommenderConfig,
) -> BakeryServices {
    let services = BakeryServices::builder()
        .embedder(Arc::new(CharBagEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .generator(generator)
        .recommender_config(config)
        .build()
        .unwrap();
    if !records.is_empty() {
        services.indexer().index_records(records).await.unwrap();
    }
    services
}
