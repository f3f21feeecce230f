use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::constants;
use crate::error::{PlannerError, PlannerResult};

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

// Keeps the key out of logs.
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: constants::GEMINI_MODEL.clone(),
            base_url: normalize_base_url(&constants::GEMINI_BASE_URL),
            timeout: Duration::from_secs(*constants::GEMINI_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

fn normalize_base_url(input: &str) -> String {
    let mut base = input.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

// Wire format of the generateContent endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    // Absent when generation stops early (MAX_TOKENS, SAFETY).
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self::single("user", text.into())
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::single("model", text.into())
    }

    fn single(role: &str, text: String) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text }],
        }
    }

    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> PlannerResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Sends the whole conversation and returns the text of the first candidate.
    #[instrument(skip(self, contents), fields(model = %self.config.model, turns = contents.len()))]
    pub async fn generate(&self, contents: &[Content]) -> PlannerResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(PlannerError::MissingApiKey)?;
        let url = self.config.endpoint();

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest { contents })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(%status, %message, "Gemini API request failed");
            return Err(PlannerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(PlannerError::Blocked { reason });
        }

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or(PlannerError::EmptyResponse)?;
        let text = candidate.content.map(|c| c.text()).unwrap_or_default();

        if text.trim().is_empty() {
            return Err(match candidate.finish_reason {
                Some(reason) if reason != "STOP" => PlannerError::Blocked { reason },
                _ => PlannerError::EmptyResponse,
            });
        }

        debug!(chars = text.len(), "Received Gemini response");
        Ok(text)
    }
}

/// A conversation with the model. Prior turns are replayed on every request.
#[derive(Debug, Clone)]
pub struct ChatSession {
    client: GeminiClient,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// History only grows when the model answers.
    pub async fn send_message(&mut self, text: &str) -> PlannerResult<String> {
        let mut contents = self.history.clone();
        contents.push(Content::user(text));

        let reply = self.client.generate(&contents).await?;

        self.history.extend([Content::user(text), Content::model(reply.clone())]);
        Ok(reply)
    }
}
