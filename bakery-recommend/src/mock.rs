//! A scripted [`TextGenerator`] for tests and offline runs.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{RecommendError, Result};
use crate::generation::{GenerationRequest, TextGenerator};

const PROVIDER: &str = "mock";

/// A deterministic generator.
///
/// By default it answers with a short sentence that opens with the bakery
/// name found in the prompt. Every request is recorded so tests can inspect
/// what was sent.
///
/// # Example
///
/// ```rust,ignore
/// use bakery_recommend::MockGenerator;
///
/// let generator = MockGenerator::new().with_response("고정된 답변이에요.");
/// ```
#[derive(Debug, Default)]
pub struct MockGenerator {
    response: Option<String>,
    fail_marker: Option<String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    /// Create a generator with the default name-first reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `response`.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Fail every request whose prompt contains `marker`.
    pub fn failing_when_prompt_contains(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    /// Requests received so far, in call order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().await.push(request.clone());

        if let Some(marker) = &self.fail_marker {
            if request.prompt.contains(marker.as_str()) {
                return Err(RecommendError::GenerationError {
                    provider: PROVIDER.into(),
                    message: format!("scripted failure for prompt containing '{marker}'"),
                });
            }
        }

        if let Some(response) = &self.response {
            return Ok(response.clone());
        }

        let name = bakery_rag::extract_name(&request.prompt).unwrap_or_else(|| "이 빵집".into());
        Ok(format!("{name}은(는) 당신의 취향에 딱 맞는 곳이에요.\n리뷰 속 분위기가 당신과 닮았어요."))
    }
}
