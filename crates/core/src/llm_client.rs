use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

/// A single bounded chat-completion request.
///
/// Every model call in greenroom is one system prompt plus one user message
/// with explicit sampling parameters; conversation context is rendered into
/// the system prompt by the caller rather than replayed as a message list.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Errors produced by a chat-completion call.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat completion request failed: {0}")]
    Api(#[from] async_openai::error::OpenAIError),

    #[error("model returned no content")]
    EmptyContent,
}

/// A generic client for chat-completion calls against an LLM.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Performs a single, non-streaming chat completion and returns the
    /// generated text.
    async fn complete(&self, request: ChatRequest) -> Result<String, ChatError>;
}

/// An implementation of `ChatClient` for any OpenAI-compatible API.
///
/// Credentials are session-scoped in greenroom, so one of these is
/// constructed per interview session from the key the client supplied and
/// is dropped with the session.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The specific model identifier to use for chat completions (e.g., "gpt-4o").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl ChatClient for OpenAICompatibleClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, ChatError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user)
                    .build()?
                    .into(),
            ])
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ChatError::EmptyContent);
        }
        Ok(content.to_string())
    }
}
