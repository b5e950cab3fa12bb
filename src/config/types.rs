//! Struct definitions and serde defaults for threadline configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for threadline, deserialized from `config.toml`.
///
/// Fields use serde defaults so threadline can run with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Assistant that runs are created against (e.g. `"asst_abc123"`).
    #[serde(default)]
    pub assistant_id: Option<String>,
    /// Delay between run status polls, in milliseconds.
    ///
    /// Left unset until files are merged so an explicit value always wins.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    /// Connection settings for the OpenAI API.
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// Connection details for the OpenAI API.
///
/// Everything is optional; the API key normally comes from `OPENAI_API_KEY`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OpenAiConfig {
    /// API key for authentication. Can also be set via environment variables.
    pub api_key: Option<String>,
    /// Custom base URL (useful for proxies or compatible gateways).
    pub base_url: Option<String>,
    /// Sent as `OpenAI-Organization` when set.
    pub organization: Option<String>,
    /// Sent as `OpenAI-Project` when set.
    pub project: Option<String>,
}
