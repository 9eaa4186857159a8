mod chat;
mod pool;

pub use chat::ChatClient;
pub use pool::EndpointPool;

use crate::config::Config;
use crate::error::{ConfigError, ProviderError};
use crate::review::ReviewUnit;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A single request/response cycle against one endpoint.
///
/// Implementations make exactly one attempt; failover lives in the dispatcher.
#[async_trait]
pub trait ReviewClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(
        &self,
        endpoint: &str,
        unit: &ReviewUnit,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError>;
}

/// Create the HTTP chat-completion client for this config
pub fn create_client(config: &Config) -> Result<Arc<dyn ReviewClient>, ConfigError> {
    Ok(Arc::new(ChatClient::new(config)?))
}
