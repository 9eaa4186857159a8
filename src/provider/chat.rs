use super::ReviewClient;
use crate::config::Config;
use crate::error::{ConfigError, ProviderError};
use crate::review::ReviewUnit;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const USER_AGENT: &str = concat!("aireview/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Some servers send `{"error": {"message": ...}}`, others a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiError {
    Detailed { message: String },
    Plain(String),
}

impl ApiError {
    fn into_message(self) -> String {
        match self {
            ApiError::Detailed { message } | ApiError::Plain(message) => message,
        }
    }
}

/// OpenAI-compatible chat-completion client.
pub struct ChatClient {
    http: Client,
    model: String,
    api_key: Option<String>,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.request_timeout(),
        })
    }

    fn status_error(&self, status: StatusCode) -> ProviderError {
        match status {
            StatusCode::BAD_REQUEST => ProviderError::BadRequest {
                model: self.model.clone(),
            },
            StatusCode::UNAUTHORIZED => ProviderError::Unauthorized,
            StatusCode::FORBIDDEN => ProviderError::Forbidden,
            StatusCode::NOT_FOUND => ProviderError::NotFound {
                model: self.model.clone(),
            },
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
            s if s.is_server_error() => ProviderError::ServerUnavailable(s.as_u16()),
            s => ProviderError::Status(s.as_u16()),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }

    async fn send(&self, endpoint: &str, content: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: &self.system_prompt,
                },
                Message {
                    role: "user",
                    content,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        let mut builder = self.http.post(endpoint).timeout(self.timeout).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        parse_completion(&body)
    }
}

/// Pull the review text out of a 2xx response body.
fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(ProviderError::Application(err.into_message()));
    }

    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or(ProviderError::EmptyResult)
}

#[async_trait]
impl ReviewClient for ChatClient {
    fn name(&self) -> &'static str {
        "chat_completions"
    }

    async fn attempt(
        &self,
        endpoint: &str,
        unit: &ReviewUnit,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        debug!("POST {} for {}", endpoint, unit.path.display());

        tokio::select! {
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
            result = self.send(endpoint, &unit.content) => result,
        }
    }
}
