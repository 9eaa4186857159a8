use crate::error::{EndpointFailure, ProviderError, ReviewError};
use crate::provider::{EndpointPool, ReviewClient};
use crate::review::{Review, ReviewOutcome, ReviewUnit};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sends one unit to the pool, moving to the next endpoint on every failure.
pub struct Dispatcher {
    pool: Arc<EndpointPool>,
    client: Arc<dyn ReviewClient>,
}

impl Dispatcher {
    pub fn new(pool: Arc<EndpointPool>, client: Arc<dyn ReviewClient>) -> Self {
        Self { pool, client }
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    /// At most one attempt per endpoint, starting from the pool's rotating offset.
    pub async fn review(&self, unit: &ReviewUnit, cancel: &CancellationToken) -> ReviewOutcome {
        let endpoints = self.pool.effective_endpoints();
        if endpoints.is_empty() {
            return Err(ReviewError::NoEndpoints);
        }

        let n = endpoints.len();
        let start = self.pool.next_start_index();
        let mut attempts: Vec<EndpointFailure> = Vec::with_capacity(n);

        for i in 0..n {
            if cancel.is_cancelled() {
                return Err(ReviewError::Cancelled { attempts });
            }

            let endpoint = &endpoints[(start + i) % n];
            debug!(
                "Attempt {}/{} for {} on {} ({})",
                i + 1,
                n,
                unit.path.display(),
                endpoint,
                self.client.name()
            );

            match self.client.attempt(endpoint, unit, cancel).await {
                Ok(text) => {
                    if !attempts.is_empty() {
                        info!(
                            "{} reviewed by {} after {} failed attempt(s)",
                            unit.path.display(),
                            endpoint,
                            attempts.len()
                        );
                    }
                    return Ok(Review {
                        text,
                        endpoint: endpoint.clone(),
                    });
                }
                Err(ProviderError::Cancelled) => {
                    attempts.push(EndpointFailure {
                        endpoint: endpoint.clone(),
                        error: ProviderError::Cancelled,
                    });
                    return Err(ReviewError::Cancelled { attempts });
                }
                Err(error) => {
                    if !error.is_retryable() {
                        debug!("{} gave a non-retryable error, moving on", endpoint);
                    }
                    warn!(
                        "Attempt {}/{} for {} failed on {}: {}",
                        i + 1,
                        n,
                        unit.path.display(),
                        endpoint,
                        error
                    );
                    attempts.push(EndpointFailure {
                        endpoint: endpoint.clone(),
                        error,
                    });
                }
            }
        }

        Err(ReviewError::Exhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers per endpoint and records the order endpoints were called in.
    struct ScriptedClient {
        answers: HashMap<String, Result<String, ProviderError>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(answers: &[(&str, Result<&str, ProviderError>)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(ep, r)| (ep.to_string(), r.clone().map(String::from)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReviewClient for ScriptedClient {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn attempt(
            &self,
            endpoint: &str,
            _unit: &ReviewUnit,
            _cancel: &CancellationToken,
        ) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push(endpoint.to_string());
            self.answers[endpoint].clone()
        }
    }

    fn dispatcher(endpoints: &[&str], client: Arc<ScriptedClient>) -> Dispatcher {
        let pool = EndpointPool::new(endpoints.iter().map(|e| e.to_string()).collect(), "");
        Dispatcher::new(Arc::new(pool), client)
    }

    fn unit() -> ReviewUnit {
        ReviewUnit::new("pkg/a.go", "package a\n")
    }

    #[tokio::test]
    async fn test_fails_over_until_last_endpoint_succeeds() {
        let client = Arc::new(ScriptedClient::new(&[
            ("a", Err(ProviderError::RateLimited)),
            ("b", Err(ProviderError::ServerUnavailable(502))),
            ("c", Ok("review from c")),
        ]));
        let d = dispatcher(&["a", "b", "c"], client.clone());

        let review = d.review(&unit(), &CancellationToken::new()).await.unwrap();

        assert_eq!(review.text, "review from c");
        assert_eq!(review.endpoint, "c");
        assert_eq!(client.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let client = Arc::new(ScriptedClient::new(&[
            ("a", Ok("fine")),
            ("b", Ok("never asked")),
        ]));
        let d = dispatcher(&["a", "b"], client.clone());

        let review = d.review(&unit(), &CancellationToken::new()).await.unwrap();

        assert_eq!(review.endpoint, "a");
        assert_eq!(client.calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_exhaustion_lists_one_reason_per_endpoint_in_attempt_order() {
        let client = Arc::new(ScriptedClient::new(&[
            ("a", Err(ProviderError::Unauthorized)),
            ("b", Err(ProviderError::Decode("eof".to_string()))),
            ("c", Err(ProviderError::EmptyResult)),
        ]));
        let d = dispatcher(&["a", "b", "c"], client.clone());

        // First unit starts at index 0; the second starts at 1 and wraps around.
        let _ = d.review(&unit(), &CancellationToken::new()).await;
        let err = d.review(&unit(), &CancellationToken::new()).await.unwrap_err();

        let order: Vec<&str> = err.attempts().iter().map(|a| a.endpoint.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(err.attempts()[2].error, ProviderError::Unauthorized);
        assert!(matches!(err, ReviewError::Exhausted { .. }));
        assert!(err.to_string().starts_with("all 3 endpoints failed"));
        assert_eq!(client.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_rotation_advances_once_per_unit() {
        let client = Arc::new(ScriptedClient::new(&[
            ("a", Err(ProviderError::RateLimited)),
            ("b", Ok("b")),
            ("c", Ok("c")),
        ]));
        let d = dispatcher(&["a", "b", "c"], client.clone());

        // Unit 1 starts at a, fails over to b. Unit 2 starts at b regardless.
        assert_eq!(d.review(&unit(), &CancellationToken::new()).await.unwrap().endpoint, "b");
        assert_eq!(d.review(&unit(), &CancellationToken::new()).await.unwrap().endpoint, "b");
        assert_eq!(d.review(&unit(), &CancellationToken::new()).await.unwrap().endpoint, "c");
        assert_eq!(client.calls(), vec!["a", "b", "b", "c"]);
    }

    #[tokio::test]
    async fn test_empty_pool_fails_without_attempts() {
        let client = Arc::new(ScriptedClient::new(&[]));
        let d = dispatcher(&[], client.clone());

        let err = d.review(&unit(), &CancellationToken::new()).await.unwrap_err();

        assert_eq!(err, ReviewError::NoEndpoints);
        assert_eq!(err.to_string(), "no endpoints configured");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_stops_failover() {
        let client = Arc::new(ScriptedClient::new(&[
            ("a", Err(ProviderError::Cancelled)),
            ("b", Ok("never asked")),
        ]));
        let d = dispatcher(&["a", "b"], client.clone());

        let err = d.review(&unit(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ReviewError::Cancelled { .. }));
        assert_eq!(client.calls(), vec!["a"]);

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        let err = d.review(&unit(), &cancelled).await.unwrap_err();
        assert_eq!(err, ReviewError::Cancelled { attempts: vec![] });
        assert_eq!(client.calls().len(), 1);
    }
}
