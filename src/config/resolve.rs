//! Environment variable substitution and credential resolution.

use std::time::Duration;

use super::types::Config;
use crate::constants::{
    API_KEY_ENV, ASSISTANT_ID_ENV, DEFAULT_POLL_INTERVAL_MS, OPENAI_DEFAULT_BASE_URL,
};

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        for field in [
            &mut self.assistant_id,
            &mut self.openai.api_key,
            &mut self.openai.base_url,
            &mut self.openai.organization,
            &mut self.openai.project,
        ] {
            if let Some(value) = field.as_mut() {
                *value = Self::resolve_str(value);
            }
            // A placeholder for an unset variable means "not configured".
            if field.as_deref() == Some("") {
                *field = None;
            }
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        while let Some(start) = result.find("{env:") {
            if let Some(end) = result[start..].find('}') {
                let var_name = &result[start + 5..start + end];
                let value = std::env::var(var_name).unwrap_or_default();
                result = format!(
                    "{}{}{}",
                    &result[..start],
                    value,
                    &result[start + end + 1..]
                );
            } else {
                break;
            }
        }
        result
    }

    /// Resolve the API key: env var first, then config value.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Ok(val) = std::env::var(API_KEY_ENV) {
            if !val.is_empty() {
                return Some(val);
            }
        }
        self.openai.api_key.clone()
    }

    /// Resolve the assistant id.
    /// Priority: CLI flag > `THREADLINE_ASSISTANT_ID` > config.
    pub fn resolve_assistant_id(&self, cli: Option<&str>) -> anyhow::Result<String> {
        if let Some(id) = cli {
            return Ok(id.to_string());
        }
        if let Ok(val) = std::env::var(ASSISTANT_ID_ENV) {
            if !val.is_empty() {
                return Ok(val);
            }
        }
        self.assistant_id.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "No assistant configured. Pass --assistant, set {}, or run: threadline config set assistant_id <id>",
                ASSISTANT_ID_ENV
            )
        })
    }

    /// Base URL of the API, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.openai
            .base_url
            .as_deref()
            .unwrap_or(OPENAI_DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Delay between run status polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }
}
