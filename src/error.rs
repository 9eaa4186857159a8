use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("API URL cannot be empty")]
    NoEndpoints,

    #[error("model cannot be empty")]
    EmptyModel,

    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error("temperature must be between 0 and 2, got {0}")]
    Temperature(f32),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to build glob pattern '{pattern}': {source}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Git diff failed: {0}")]
    GitDiff(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a unit is rejected before it is ever sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty content")]
    Empty,

    #[error("too large for remote call ({size} bytes, limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("binary content")]
    Binary,

    #[error("non-text content")]
    NonText,

    #[error("file size {size} exceeds maximum allowed size of {limit} bytes")]
    ExceedsMaxSize { size: u64, limit: u64 },
}

/// Coarse classification of a single failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Status,
    Decode,
    Application,
    EmptyResult,
}

/// Failure of one request against one endpoint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("failed to make request: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("bad request (400): malformed request or unsupported model '{model}'")]
    BadRequest { model: String },

    #[error("authentication failed (401): check your API key")]
    Unauthorized,

    #[error("access forbidden (403): insufficient permissions or invalid API key")]
    Forbidden,

    #[error("model not found (404): check if model '{model}' exists and the endpoint is correct")]
    NotFound { model: String },

    #[error("rate limit exceeded (429): too many requests, please wait and try again")]
    RateLimited,

    #[error("server error ({0}): API service temporarily unavailable")]
    ServerUnavailable(u16),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("API error: {0}")]
    Application(String),

    #[error("no review choices returned")]
    EmptyResult,
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Transport(_) | ProviderError::Timeout(_) | ProviderError::Cancelled => {
                FailureKind::Transport
            }
            ProviderError::BadRequest { .. }
            | ProviderError::Unauthorized
            | ProviderError::Forbidden
            | ProviderError::NotFound { .. }
            | ProviderError::RateLimited
            | ProviderError::ServerUnavailable(_)
            | ProviderError::Status(_) => FailureKind::Status,
            ProviderError::Decode(_) => FailureKind::Decode,
            ProviderError::Application(_) => FailureKind::Application,
            ProviderError::EmptyResult => FailureKind::EmptyResult,
        }
    }

    /// Whether trying the same request again could plausibly succeed.
    /// The dispatcher fails over on every error regardless.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), FailureKind::Transport | FailureKind::Status)
    }
}

/// One failed attempt, keyed by the endpoint it was sent to.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub error: ProviderError,
}

impl std::fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.error)
    }
}

/// Terminal failure for a single review unit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("no endpoints configured")]
    NoEndpoints,

    #[error("all {} endpoints failed: {}", .attempts.len(), join_failures(.attempts))]
    Exhausted { attempts: Vec<EndpointFailure> },

    #[error("review cancelled after {} attempt(s)", .attempts.len())]
    Cancelled { attempts: Vec<EndpointFailure> },

    #[error("review task panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Unwritten(String),
}

impl ReviewError {
    /// Endpoints tried before giving up, in attempt order.
    pub fn attempts(&self) -> &[EndpointFailure] {
        match self {
            ReviewError::Exhausted { attempts } | ReviewError::Cancelled { attempts } => attempts,
            _ => &[],
        }
    }
}

fn join_failures(attempts: &[EndpointFailure]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteReport(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_lists_every_endpoint() {
        let err = ReviewError::Exhausted {
            attempts: vec![
                EndpointFailure {
                    endpoint: "http://a".to_string(),
                    error: ProviderError::RateLimited,
                },
                EndpointFailure {
                    endpoint: "http://b".to_string(),
                    error: ProviderError::Unauthorized,
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.starts_with("all 2 endpoints failed"));
        assert!(msg.contains("http://a: rate limit exceeded"));
        assert!(msg.contains("http://b: authentication failed"));
        assert_eq!(err.attempts().len(), 2);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ProviderError::ServerUnavailable(503).is_retryable());
        assert!(!ProviderError::Decode("eof".to_string()).is_retryable());
        assert!(!ProviderError::Application("bad".to_string()).is_retryable());
        assert_eq!(ProviderError::Cancelled.kind(), FailureKind::Transport);
    }
}
