//! Similarity retriever and offline indexer behaviour.

mod common;

use std::sync::Arc;

use bakery_rag::{
    BakeryRecord, InMemoryRecordSource, InMemoryVectorStore, Indexer, JsonFileRecordSource,
    RagError, RecordSource, RetrievalConfig, Review, Scores, SimilarityRetriever, VectorStore,
};
use common::{CharBagEmbedder, UnavailableEmbedder};
use proptest::prelude::*;

fn records() -> Vec<BakeryRecord> {
    vec![
        BakeryRecord::new("유럽풍 베이커리")
            .with_id("b1")
            .with_scores(Scores::new(9.0, 9.5, 7.0, 8.0))
            .with_review(Review::new("분위기가 유럽 같아요", 5i64, ["유럽풍", "분위기"])),
        BakeryRecord::new("SNS 핫플 빵집")
            .with_id("b2")
            .with_scores(Scores::new(8.0, 8.0, 6.5, 7.0))
            .with_review(Review::new("사진 찍기 좋아요", 4i64, ["인스타", "핫플"])),
        BakeryRecord::new("동네 식빵집")
            .with_id("b3")
            .with_scores(Scores::new(7.5, 8.5, 9.5, 9.0))
            .with_review(Review::new("매일 가는 곳", 5i64, ["가성비", "단골"])),
    ]
}

async fn indexed(records: &[BakeryRecord]) -> (Arc<InMemoryVectorStore>, SimilarityRetriever) {
    let store = Arc::new(InMemoryVectorStore::new());
    let config = RetrievalConfig::default();
    let indexer = Indexer::new(Arc::new(CharBagEmbedder), store.clone(), config.clone());
    indexer.index_records(records).await.unwrap();
    let retriever = SimilarityRetriever::new(Arc::new(CharBagEmbedder), store.clone(), config);
    (store, retriever)
}

#[tokio::test]
async fn indexer_stores_one_document_per_record() {
    let (store, retriever) = indexed(&records()).await;
    assert_eq!(store.count("bakery_vector_store").await.unwrap(), 3);
    assert_eq!(retriever.document_count().await.unwrap(), 3);
}

#[tokio::test]
async fn search_returns_at_most_k_in_rank_order() {
    let (_, retriever) = indexed(&records()).await;

    let ranked = retriever.search_ranked("유럽풍 분위기를 좋아해", 2).await.unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);
    assert!(ranked[0].score >= ranked[1].score);

    let documents = retriever.search("유럽풍 분위기를 좋아해", 10).await.unwrap();
    assert_eq!(documents.len(), 3);
}

#[tokio::test]
async fn search_matches_the_closest_bakery() {
    let (_, retriever) = indexed(&records()).await;
    let top = retriever.search("동네 식빵집 가성비 단골", 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].metadata.record_id, "b3");
}

#[tokio::test]
async fn empty_index_returns_no_documents() {
    let (_, retriever) = indexed(&[]).await;
    assert!(retriever.search("아무거나", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_collection_returns_no_documents() {
    let store = Arc::new(InMemoryVectorStore::new());
    let retriever =
        SimilarityRetriever::new(Arc::new(CharBagEmbedder), store, RetrievalConfig::default());
    assert!(retriever.search("아무거나", 3).await.unwrap().is_empty());
    assert_eq!(retriever.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn zero_k_is_rejected() {
    let (_, retriever) = indexed(&records()).await;
    let err = retriever.search("빵", 0).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidArgument(_)));
}

#[tokio::test]
async fn search_in_targets_the_named_collection() {
    let (_, retriever) = indexed(&records()).await;
    assert_eq!(retriever.search_in("bakery_vector_store", "빵", 2).await.unwrap().len(), 2);
    assert!(retriever.search_in("other_collection", "빵", 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn embedding_failure_is_a_retrieval_error() {
    let (store, _) = indexed(&records()).await;
    let retriever =
        SimilarityRetriever::new(Arc::new(UnavailableEmbedder), store, RetrievalConfig::default());
    let err = retriever.search("빵", 1).await.unwrap_err();
    assert!(matches!(err, RagError::RetrievalError(_)));
}

#[tokio::test]
async fn indexing_from_a_json_file_upserts_by_title() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dining_details.json");
    std::fs::write(
        &path,
        serde_json::json!([
            {"_id": "a", "title": "Bread A", "scores": {"total_score": 7.0}, "reviews": []},
            {"_id": "b", "title": "Bread B", "scores": {"total_score": 8.0}, "reviews": []},
            {"_id": "a", "title": "Bread A", "scores": {"total_score": 9.0}, "reviews": []}
        ])
        .to_string(),
    )
    .unwrap();

    let source = JsonFileRecordSource::new(&path);
    let store = Arc::new(InMemoryVectorStore::new());
    let indexer = Indexer::new(Arc::new(CharBagEmbedder), store.clone(), RetrievalConfig::default());
    let documents = indexer.index_all(&source).await.unwrap();

    assert_eq!(documents.len(), 2);
    assert!(documents[0].text.contains("총점 9.0"));
    assert_eq!(store.count("bakery_vector_store").await.unwrap(), 2);
}

#[tokio::test]
async fn reindexing_records_without_ids_does_not_duplicate_them() {
    let source = InMemoryRecordSource::new(vec![
        BakeryRecord::new("Bread A").with_scores(Scores::new(9.0, 9.5, 7.0, 8.0)),
        BakeryRecord::new("Bread B").with_scores(Scores::new(8.0, 8.0, 8.0, 8.0)),
    ]);
    let store = Arc::new(InMemoryVectorStore::new());
    let config = RetrievalConfig::default();
    let indexer = Indexer::new(Arc::new(CharBagEmbedder), store.clone(), config.clone());

    let first = indexer.index_all(&source).await.unwrap();
    let second = indexer.index_all(&source).await.unwrap();

    assert_eq!(first[0].metadata.record_id, second[0].metadata.record_id);
    assert_ne!(first[0].metadata.record_id, first[1].metadata.record_id);
    assert_eq!(store.count("bakery_vector_store").await.unwrap(), 2);

    let retriever = SimilarityRetriever::new(Arc::new(CharBagEmbedder), store, config);
    let titles: Vec<String> =
        retriever.search("Bread", 3).await.unwrap().into_iter().map(|d| d.metadata.title).collect();
    assert_eq!(titles.len(), 2);
    assert_ne!(titles[0], titles[1]);
}

#[tokio::test]
async fn unreadable_source_is_a_source_error() {
    let source = JsonFileRecordSource::new("/definitely/not/here.json");
    assert!(matches!(source.fetch_all().await, Err(RagError::SourceError { .. })));
}

#[tokio::test]
async fn indexing_fails_when_embedding_is_unavailable() {
    let store = Arc::new(InMemoryVectorStore::new());
    let indexer = Indexer::new(Arc::new(UnavailableEmbedder), store, RetrievalConfig::default());
    let source = InMemoryRecordSource::new(records());
    let err = indexer.index_all(&source).await.unwrap_err();
    assert!(matches!(err, RagError::IndexingError(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// For any index size and k, search returns min(k, size) documents.
    #[test]
    fn search_is_bounded_by_k_and_index_size(size in 0usize..8, k in 1usize..10) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let ranked = rt.block_on(async {
            let records: Vec<BakeryRecord> = (0..size)
                .map(|i| BakeryRecord::new(format!("빵집 {i}")).with_id(format!("id-{i}")))
                .collect();
            let (_, retriever) = indexed(&records).await;
            retriever.search_ranked("빵집", k).await.unwrap()
        });
        prop_assert_eq!(ranked.len(), k.min(size));
        for window in ranked.windows(2) {
            prop_assert!(window[0].score >= window[1].score);
        }
    }
}
