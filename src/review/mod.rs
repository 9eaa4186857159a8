mod validate;

pub use validate::validate;

use crate::error::ReviewError;
use std::path::PathBuf;

/// One file's content, as handed over by discovery.
#[derive(Debug, Clone)]
pub struct ReviewUnit {
    pub path: PathBuf,
    pub size: u64,
    pub content: String,
}

impl ReviewUnit {
    #[cfg(test)]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            size: content.len() as u64,
            content,
        }
    }
}

/// A completed review and the endpoint that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub text: String,
    pub endpoint: String,
}

pub type ReviewOutcome = Result<Review, ReviewError>;
