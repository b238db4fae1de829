use super::{Backend, RefineRequest, prompts, status_error};
use crate::draft::ScoreCard;
use crate::error::BackendError;
use crate::models::ModelDescriptor;
use crate::params::{EmailParameters, OutputFormat};
use crate::validate;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Direct provider backend: talks to an OpenAI-compatible chat-completions
/// endpoint with hand-built prompts, bypassing the proxy API.
///
/// Structured output (scoring) is recovered from free text and re-validated;
/// the model's adherence to the prompt is never trusted. The credential
/// comes from process configuration, never from the binary.
pub struct DirectBackend {
    base_url: String,
    api_key: Option<String>,
    /// Fallback model for requests made before a model is selected.
    default_model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl DirectBackend {
    pub fn new(base_url: &str, api_key: Option<&str>, default_model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            default_model: default_model.to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .connect_timeout(Duration::from_secs(10))
                .pool_max_idle_per_host(10)
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn model_or_default<'a>(&'a self, model: &'a str) -> &'a str {
        if model.is_empty() {
            &self.default_model
        } else {
            model
        }
    }

    async fn chat(
        &self,
        prompt: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: self.model_or_default(model),
            messages: vec![
                Message {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BackendError::Malformed("provider returned no choices".into()))
    }
}

#[async_trait]
impl Backend for DirectBackend {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, BackendError> {
        let url = format!("{}/v1/models", self.base_url);
        let mut builder = self.client.get(&url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        Ok(models
            .data
            .into_iter()
            .map(|m| ModelDescriptor { name: m.id })
            .collect())
    }

    async fn generate(&self, params: &EmailParameters) -> Result<String, BackendError> {
        let prompt = prompts::generate_prompt(params);
        let model = params.model.as_deref().unwrap_or_default();
        self.chat(&prompt, model, params.temperature).await
    }

    async fn refine(&self, request: RefineRequest<'_>) -> Result<String, BackendError> {
        let prompt = prompts::refine_prompt(&request);
        self.chat(&prompt, request.model, request.temperature).await
    }

    async fn score(
        &self,
        content: &str,
        model: &str,
        format: OutputFormat,
        temperature: f64,
    ) -> Result<ScoreCard, BackendError> {
        let prompt = prompts::score_prompt(content, format);
        let reply = self.chat(&prompt, model, temperature).await?;
        validate::score_card_from_text(&reply)
    }

    async fn convert(
        &self,
        content: &str,
        from: OutputFormat,
        to: OutputFormat,
        model: &str,
    ) -> Result<String, BackendError> {
        let prompt = prompts::convert_prompt(content, from, to);
        let reply = self.chat(&prompt, model, 0.0).await?;
        Ok(reply.trim().to_string())
    }
}
