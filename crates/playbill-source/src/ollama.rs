//! OpenAI-compatible chat transport for an Ollama server.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use playbill_core::prompt::Prompt;

use crate::error::SourceError;
use crate::service::{GenerateParams, TranscriptSource};

/// Generative source backed by an Ollama server's OpenAI-compatible API.
pub struct OllamaSource {
    client: Client<OpenAIConfig>,
}

impl OllamaSource {
    /// Build a source for the given base URL (e.g. `http://localhost:11434/v1`).
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(SourceError::InvalidConfig {
                message: "base url is required".to_string(),
            });
        }
        // Ollama ignores the key but the client requires one.
        let config = OpenAIConfig::new()
            .with_api_base(trimmed)
            .with_api_key("ollama");
        Ok(Self {
            client: Client::with_config(config),
        })
    }
}

#[async_trait]
impl TranscriptSource for OllamaSource {
    async fn generate(
        &self,
        prompt: &Prompt,
        params: &GenerateParams,
    ) -> Result<String, SourceError> {
        let request = build_chat_request(prompt, params)?;
        let create = self.client.chat().create(request);
        let response = match tokio::time::timeout(params.timeout, create).await {
            Ok(result) => result.map_err(map_openai_err)?,
            Err(_) => {
                return Err(SourceError::Timeout {
                    message: format!("no response within {}s", params.timeout.as_secs()),
                });
            }
        };

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(SourceError::EmptyResponse);
        }
        Ok(text)
    }
}

fn build_chat_request(
    prompt: &Prompt,
    params: &GenerateParams,
) -> Result<CreateChatCompletionRequest, SourceError> {
    let provider = |e: &dyn std::fmt::Display| SourceError::Provider {
        message: e.to_string(),
    };

    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt.system.as_str())
            .build()
            .map_err(|e| provider(&e))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.user.as_str())
            .build()
            .map_err(|e| provider(&e))?
            .into(),
    ];

    CreateChatCompletionRequestArgs::default()
        .model(params.model.as_str())
        .messages(messages)
        .temperature(params.temperature)
        .build()
        .map_err(|e| provider(&e))
}

fn map_openai_err(err: async_openai::error::OpenAIError) -> SourceError {
    use async_openai::error::OpenAIError as E;
    match err {
        E::Reqwest(e) if e.is_timeout() => SourceError::Timeout {
            message: e.to_string(),
        },
        E::Reqwest(e) => SourceError::Transport {
            message: e.to_string(),
        },
        E::ApiError(e) => SourceError::Provider { message: e.message },
        other => SourceError::Provider {
            message: other.to_string(),
        },
    }
}
