use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    /// Project directory to scan
    #[serde(default = "default_target")]
    pub target: PathBuf,

    /// Single chat-completion endpoint, used when `api_urls` is empty
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Equivalent endpoints to rotate across, with failover
    #[serde(default)]
    pub api_urls: Vec<String>,

    /// Bearer credential; optional for local models
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum file size in bytes to process
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Per-request timeout
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,

    /// Maximum number of reviews in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Pause between task launches, to soften burst rate limits
    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_include")]
    pub include: Vec<String>,

    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Directory names pruned from the walk
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    #[serde(default)]
    pub diff_base: Option<String>,
}
