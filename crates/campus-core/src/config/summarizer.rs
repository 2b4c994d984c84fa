//! Document summarizer configuration.

use serde::{Deserialize, Serialize};

/// Settings for the external document summarizer.
///
/// When enabled, every primary upload whose extension is listed here is
/// posted to `endpoint` and the returned summary is stored as a derived
/// attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Whether derived summaries are generated at all.
    #[serde(default)]
    pub enabled: bool,
    /// Summarizer endpoint accepting a multipart `file` field.
    #[serde(default)]
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Extensions worth summarizing.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            timeout_seconds: default_timeout(),
            extensions: default_extensions(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "txt".to_string(), "md".to_string()]
}
