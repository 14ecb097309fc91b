//! Text-generation trait: the seam to the language model writing explanations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One single-turn request to a text generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// Framing instructions sent as the system message.
    pub system: String,
    /// User-turn content: persona and grounding text.
    pub prompt: String,
    /// Sampling temperature, if the backend supports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A backend that turns one [`GenerationRequest`] into one text response.
///
/// No streaming and no conversation state: every call is independent.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Generate the response text for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
