use crate::config::Config;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Equivalent endpoints plus the rotation counter shared by every task of a run.
#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<String>,
    counter: AtomicUsize,
}

impl EndpointPool {
    /// `endpoints` wins when non-empty; otherwise the single legacy endpoint, if any.
    pub fn new(endpoints: Vec<String>, fallback: &str) -> Self {
        let endpoints = if !endpoints.is_empty() {
            endpoints
        } else if !fallback.trim().is_empty() {
            vec![fallback.to_string()]
        } else {
            Vec::new()
        };

        Self {
            endpoints,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_urls.clone(), &config.api_url)
    }

    pub fn effective_endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Index to start the next unit's rotation from. Increments once per call.
    pub fn next_start_index(&self) -> usize {
        let n = self.endpoints.len();
        let previous = self.counter.fetch_add(1, Ordering::Relaxed);
        if n == 0 {
            return 0;
        }
        previous % n
    }
}
