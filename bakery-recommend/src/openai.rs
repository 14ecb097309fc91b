//! OpenAI chat-completions generator.
//!
//! Only available with the `openai` feature.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::DEFAULT_CHAT_MODEL;
use crate::error::{RecommendError, Result};
use crate::generation::{GenerationRequest, TextGenerator};

const PROVIDER: &str = "OpenAI";

/// A [`TextGenerator`] backed by the OpenAI chat-completions API.
///
/// Each request is a single system message plus a single user message.
/// Does not derive `Debug`: the client holds the API key.
///
/// # Example
///
/// ```rust,ignore
/// use bakery_recommend::openai::OpenAIChatGenerator;
///
/// let generator = OpenAIChatGenerator::from_env()?.with_model("gpt-4o");
/// ```
pub struct OpenAIChatGenerator {
    client: Client<OpenAIConfig>,
    api_key: String,
    model: String,
}

impl OpenAIChatGenerator {
    /// Create a generator with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RecommendError::ConfigError("OpenAI API key must not be empty".into()));
        }

        let config = OpenAIConfig::new().with_api_key(&api_key);
        Ok(Self { client: Client::with_config(config), api_key, model: DEFAULT_CHAT_MODEL.into() })
    }

    /// Create a generator using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RecommendError::ConfigError("OPENAI_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Point the generator at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let config = OpenAIConfig::new()
            .with_api_key(&self.api_key)
            .with_api_base(base_url.trim_end_matches('/'));
        self.client = Client::with_config(config);
        self
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The configured chat model.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages(request: &GenerationRequest) -> Result<Vec<ChatCompletionRequestMessage>> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system.as_str())
            .build()
            .map_err(generation_error)?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(generation_error)?;
        Ok(vec![system.into(), user.into()])
    }
}

fn generation_error(e: OpenAIError) -> RecommendError {
    RecommendError::GenerationError { provider: PROVIDER.into(), message: e.to_string() }
}

#[async_trait]
impl TextGenerator for OpenAIChatGenerator {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = request.prompt.len(), "chat completion");

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(Self::messages(request)?);
        if let Some(temperature) = request.temperature {
            builder.temperature(temperature);
        }
        let chat_request = builder.build().map_err(generation_error)?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "chat request failed");
            generation_error(e)
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RecommendError::GenerationError {
                provider: PROVIDER.into(),
                message: "response contained no message content".into(),
            })
    }
}
