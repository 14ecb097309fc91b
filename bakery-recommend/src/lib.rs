//! # bakery-recommend
//!
//! Recommends bakeries for a free-text personality description and explains
//! each match in a few grounded lines.
//!
//! ## Overview
//!
//! - [`Recommender`] retrieves candidates through a
//!   [`SimilarityRetriever`](bakery_rag::SimilarityRetriever), extracts their
//!   fields and merges each with an explanation.
//! - [`ExplanationRequester`] builds a validated [`ExplanationRequest`] and
//!   normalizes what the [`TextGenerator`] returns.
//! - [`BakeryServices`] holds the process-wide embedder, vector store and
//!   generator.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bakery_recommend::{AppConfig, BakeryServices, RecommendMode};
//!
//! bakery_recommend::telemetry::init_tracing();
//! let services = BakeryServices::from_app_config(&AppConfig::from_env()?)?;
//! services.start().await?;
//!
//! let entries = services
//!     .recommender()?
//!     .recommend_mode("빵 냄새만 맡아도 행복해지는 사람", RecommendMode::Multi)
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&entries)?);
//! ```
//!
//! ## Features
//!
//! - `openai`: [`openai::OpenAIChatGenerator`] and OpenAI embeddings
//! - `qdrant`: Qdrant-backed index selected by `QDRANT_URL`

pub mod config;
pub mod error;
pub mod explain;
pub mod generation;
pub mod mock;
pub mod recommend;
pub mod services;
pub mod telemetry;

#[cfg(feature = "openai")]
pub mod openai;

pub use config::{
    AppConfig, DEFAULT_TEMPERATURE, GenerationFailurePolicy, RecommenderConfig,
    RecommenderConfigBuilder,
};
pub use error::{RecommendError, Result};
pub use explain::{
    BatchSlot, ExplanationConstraints, ExplanationRequest, ExplanationRequestBuilder, ExplanationRequester,
    normalize_explanation,
};
pub use generation::{GenerationRequest, TextGenerator};
pub use mock::MockGenerator;
pub use recommend::{RecommendMode, RecommendationEntry, Recommender};
pub use services::{BakeryServices, BakeryServicesBuilder};
