//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`], a persistent [`VectorStore`] over gRPC
//! using [qdrant-client](https://docs.rs/qdrant-client). Only available with
//! the `qdrant` feature.
//!
//! Qdrant point ids must be UUIDs or integers, so each document is stored
//! under a UUID v5 derived from its record id; the record id itself lives in
//! the payload.

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tracing::debug;

use crate::document::{BakeryDocument, DocumentMetadata, EmbeddedDocument, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "qdrant";

/// Default gRPC endpoint of a local Qdrant.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/) with cosine distance.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Connect to the Qdrant instance at `url`.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Connect to [`DEFAULT_QDRANT_URL`].
    pub fn default_url() -> Result<Self> {
        Self::new(DEFAULT_QDRANT_URL)
    }

    /// Wrap an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStoreError { backend: BACKEND.to_string(), message: e.to_string() }
    }

    async fn ensure_exists(&self, collection: &str) -> Result<()> {
        if self.client.collection_exists(collection).await.map_err(Self::map_err)? {
            Ok(())
        } else {
            Err(RagError::CollectionNotFound {
                backend: BACKEND.to_string(),
                collection: collection.to_string(),
            })
        }
    }

    fn point_id(record_id: &str) -> String {
        uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, record_id.as_bytes()).to_string()
    }

    fn payload_string(payload: &std::collections::HashMap<String, QdrantValue>, key: &str) -> String {
        match payload.get(key).and_then(|v| v.kind.as_ref()) {
            Some(Kind::StringValue(s)) => s.clone(),
            _ => String::new(),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        if self.client.collection_exists(name).await.map_err(Self::map_err)? {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, documents: &[EmbeddedDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        self.ensure_exists(collection).await?;

        let points = documents
            .iter()
            .map(|embedded| {
                let document = &embedded.document;
                let payload = Payload::try_from(json!({
                    "text": document.text,
                    "record_id": document.metadata.record_id,
                    "title": document.metadata.title,
                }))
                .map_err(Self::map_err)?;
                Ok(PointStruct::new(
                    Self::point_id(document.id()),
                    embedded.embedding.clone(),
                    payload,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = documents.len(), "upserted documents to qdrant");
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.ensure_exists(collection).await?;
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(Self::map_err)?;
        Ok(response.result.map_or(0, |r| r.count as usize))
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        self.ensure_exists(collection).await?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| SearchResult {
                document: BakeryDocument {
                    text: Self::payload_string(&scored.payload, "text"),
                    metadata: DocumentMetadata {
                        record_id: Self::payload_string(&scored.payload, "record_id"),
                        title: Self::payload_string(&scored.payload, "title"),
                    },
                },
                score: scored.score,
            })
            .collect();

        Ok(results)
    }
}
