//! HTTP reasoning client
//!
//! Talks to an OpenAI-compatible chat-completions endpoint and parses the
//! JSON body of each reply into the calling step's artifact schema. Every
//! call is bounded by the configured per-call deadline; exceeding it
//! surfaces as a retryable collaborator error, so the session stays at its
//! checkpoint.

use async_trait::async_trait;
use packeval_types::{
    CollaboratorError, Component, FinalEvaluation, ImageAnalysis, OperationalAssessment,
    ReflectionNotes, TechnicalAssessment,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;

use crate::prompts;
use crate::reasoning::ReasoningClient;
use crate::retrieval::RetrievedPassage;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Per-collaborator-call deadline in seconds
pub const DEFAULT_DEADLINE_SECS: u64 = 300;
pub const AUTH_ENV_VAR: &str = "OPENAI_API_KEY";

/// Reasoning backend settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Base URL of the chat-completions API
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Bearer token; read from `OPENAI_API_KEY` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Deadline for a single collaborator call, in seconds
    pub deadline_secs: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
            deadline_secs: DEFAULT_DEADLINE_SECS,
        }
    }
}

impl ReasoningConfig {
    fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(AUTH_ENV_VAR).ok())
    }
}

// Wire types for the chat-completions reply.

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatOutput,
}

#[derive(Debug, Deserialize)]
struct ChatOutput {
    content: String,
}

/// The component list as the model returns it: a bare JSON array is not a
/// valid `json_object` response, so the list arrives wrapped.
#[derive(Debug, Deserialize)]
struct ComponentList {
    components: Vec<Component>,
}

/// Bound a collaborator call by the per-call deadline
async fn with_deadline<T, F>(secs: u64, call: F) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    tokio::time::timeout(Duration::from_secs(secs), call)
        .await
        .map_err(|_| CollaboratorError::DeadlineExceeded(secs))?
}

/// Reasoning client over an OpenAI-compatible HTTP API
pub struct HttpReasoningClient {
    http: reqwest::Client,
    config: ReasoningConfig,
}

impl HttpReasoningClient {
    pub fn new(config: ReasoningConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Submit one chat completion and parse its JSON body into `T`
    async fn complete<T: DeserializeOwned>(
        &self,
        user_content: Value,
    ) -> Result<T, CollaboratorError> {
        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": prompts::ENGINEER_PERSONA },
                { "role": "user", "content": user_content },
            ],
        });

        let raw = with_deadline(self.config.deadline_secs, self.post(body)).await?;
        serde_json::from_str(&raw)
            .map_err(|e| CollaboratorError::InvalidResponse(format!("schema mismatch: {}", e)))
    }

    async fn post(&self, body: Value) -> Result<String, CollaboratorError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut request = self.http.post(url).json(&body);
        if let Some(key) = self.config.resolved_api_key() {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Transport(format!(
                "reasoning backend returned {}",
                status
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CollaboratorError::InvalidResponse("reply carried no choices".into()))
    }
}

/// Multi-part user content: the prompt text followed by each image
fn image_content(prompt: &str, images: &[String]) -> Value {
    let mut parts = vec![json!({ "type": "text", "text": prompt })];
    for image in images {
        parts.push(json!({ "type": "image_url", "image_url": { "url": image } }));
    }
    Value::Array(parts)
}

#[async_trait]
impl ReasoningClient for HttpReasoningClient {
    async fn analyze_images(
        &self,
        concept: &str,
        images: &[String],
    ) -> Result<ImageAnalysis, CollaboratorError> {
        let prompt = prompts::image_analysis_prompt(concept);
        self.complete(image_content(&prompt, images)).await
    }

    async fn break_down_concept(
        &self,
        concept: &str,
        image_summary: Option<&str>,
    ) -> Result<Vec<Component>, CollaboratorError> {
        let prompt = prompts::concept_breakdown_prompt(concept, image_summary);
        let list: ComponentList = self.complete(Value::String(prompt)).await?;
        Ok(list.components)
    }

    async fn assess_technical(
        &self,
        components: &[Component],
        references: &[RetrievedPassage],
    ) -> Result<TechnicalAssessment, CollaboratorError> {
        let prompt = prompts::technical_prompt(components, references);
        self.complete(Value::String(prompt)).await
    }

    async fn assess_operations(
        &self,
        components: &[Component],
        technical_summary: Option<&str>,
        references: &[RetrievedPassage],
    ) -> Result<OperationalAssessment, CollaboratorError> {
        let prompt = prompts::operations_prompt(components, technical_summary, references);
        self.complete(Value::String(prompt)).await
    }

    async fn reflect(
        &self,
        technical_summary: &str,
        operational_summary: &str,
    ) -> Result<ReflectionNotes, CollaboratorError> {
        let prompt = prompts::reflection_prompt(technical_summary, operational_summary);
        self.complete(Value::String(prompt)).await
    }

    async fn final_evaluation(
        &self,
        technical_summary: &str,
        operational_summary: &str,
        reflection_summary: &str,
    ) -> Result<FinalEvaluation, CollaboratorError> {
        let prompt = prompts::final_evaluation_prompt(
            technical_summary,
            operational_summary,
            reflection_summary,
        );
        self.complete(Value::String(prompt)).await
    }
}
