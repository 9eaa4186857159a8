use std::path::PathBuf;

pub fn default_target() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_api_url() -> String {
    "http://127.0.0.1:1234/v1/chat/completions".to_string()
}

pub fn default_model() -> String {
    "devstral-small-2507-mlx".to_string()
}

pub fn default_max_file_size() -> u64 {
    1024 * 1024 // 1MB
}

pub fn default_timeout_sec() -> u64 {
    30
}

pub fn default_concurrency() -> usize {
    3
}

pub fn default_max_tokens() -> u32 {
    2048
}

pub fn default_temperature() -> f32 {
    0.1
}

pub fn default_launch_delay_ms() -> u64 {
    0
}

pub fn default_system_prompt() -> String {
    "You are a very experienced senior developer. Analyze the following code and provide recommendations on:
- Security vulnerabilities and best practices
- Performance optimizations and efficiency improvements
- Code correctness and potential bugs
- Code readability and maintainability
- Clean architecture principles
- Language-specific best practices

Provide only actionable, specific, and important recommendations. Be concise and focus on real issues."
        .to_string()
}

pub fn default_include() -> Vec<String> {
    vec!["**/*.go".to_string()]
}

pub fn default_exclude() -> Vec<String> {
    vec!["**/*_test.go".to_string()]
}

pub fn default_skip_dirs() -> Vec<String> {
    [
        "vendor",
        ".git",
        ".vscode",
        ".idea",
        "node_modules",
        "build",
        "dist",
        "bin",
        "tmp",
        ".tmp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
