//! File loading and merging for threadline configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{Config, OpenAiConfig};

/// Written to the global config path on first run.
const DEFAULT_CONFIG_TOML: &str = r#"# Assistant that runs are created against.
# assistant_id = "asst_..."

poll_interval_ms = 1000

[openai]
api_key = "{env:OPENAI_API_KEY}"
"#;

impl Config {
    /// Loads the global config from `~/.config/threadline/config.toml`.
    ///
    /// If no config file exists, creates one with sensible defaults
    /// (including an `{env:VAR}` placeholder for the API key) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        Self::load_or_init(&Self::config_path()?)
    }

    /// Reads the config at `path`, writing the default file first if absent.
    pub(super) fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG_TOML)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::debug!(path = %path.display(), "wrote default config");
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {:?}", path))?;
        Ok(config)
    }

    /// Look for threadline.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        Self::find_project_config(std::env::current_dir()?)
    }

    pub(super) fn find_project_config(start: PathBuf) -> Result<Option<Config>> {
        let mut dir = start;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                let contents = fs::read_to_string(&candidate)?;
                let config: Config = toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config at {:?}", candidate))?;
                tracing::debug!(path = %candidate.display(), "loaded project config");
                return Ok(Some(config));
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            assistant_id: project.assistant_id.or(global.assistant_id),
            poll_interval_ms: project.poll_interval_ms.or(global.poll_interval_ms),
            openai: OpenAiConfig {
                api_key: project.openai.api_key.or(global.openai.api_key),
                base_url: project.openai.base_url.or(global.openai.base_url),
                organization: project.openai.organization.or(global.openai.organization),
                project: project.openai.project.or(global.openai.project),
            },
        }
    }

    /// Sets a dotted `key` (e.g. `openai.base_url`) in the global config file.
    ///
    /// Edits the raw TOML so `{env:VAR}` placeholders elsewhere survive.
    pub fn set_global_value(key: &str, value: &str) -> Result<PathBuf> {
        let path = Self::config_path()?;
        Self::set_value_at(&path, key, value)?;
        Ok(path)
    }

    pub(super) fn set_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?
        } else {
            DEFAULT_CONFIG_TOML.to_string()
        };
        let mut table: toml::Table = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {:?}", path))?;

        Self::check_known_key(key)?;
        let parsed = match (key, value.parse::<i64>()) {
            ("poll_interval_ms", Ok(n)) => toml::Value::Integer(n),
            _ => toml::Value::String(value.to_string()),
        };

        let (sections, leaf) = match key.rsplit_once('.') {
            Some((sections, leaf)) => (sections.split('.').collect::<Vec<_>>(), leaf),
            None => (Vec::new(), key),
        };
        let mut current = &mut table;
        for section in sections {
            let entry = current
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            current = entry
                .as_table_mut()
                .ok_or_else(|| anyhow::anyhow!("'{}' is not a table", section))?;
        }
        current.insert(leaf.to_string(), parsed);

        let rendered = toml::to_string_pretty(&table)?;
        let _: Config = toml::from_str(&rendered)
            .with_context(|| format!("Invalid value for '{}'", key))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, rendered)
            .with_context(|| format!("Failed to write config to {:?}", path))?;
        Ok(())
    }

    fn check_known_key(key: &str) -> Result<()> {
        const KNOWN: &[&str] = &[
            "assistant_id",
            "poll_interval_ms",
            "openai.api_key",
            "openai.base_url",
            "openai.organization",
            "openai.project",
        ];
        if KNOWN.contains(&key) {
            Ok(())
        } else {
            anyhow::bail!("Unknown config key: {}. Known keys: {}", key, KNOWN.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.poll_interval_ms, Some(1000));
        assert!(config.assistant_id.is_none());
        assert_eq!(
            config.openai.api_key.as_deref(),
            Some("{env:OPENAI_API_KEY}")
        );
    }

    #[test]
    fn test_merge_project_wins() {
        let global = Config {
            assistant_id: Some("asst_global".into()),
            poll_interval_ms: Some(500),
            openai: OpenAiConfig {
                api_key: Some("sk-global".into()),
                base_url: Some("https://proxy.example".into()),
                ..Default::default()
            },
        };
        let project = Config {
            assistant_id: Some("asst_project".into()),
            ..Default::default()
        };
        let merged = Config::merge(global, project);
        assert_eq!(merged.assistant_id.as_deref(), Some("asst_project"));
        assert_eq!(merged.poll_interval_ms, Some(500));
        assert_eq!(merged.openai.api_key.as_deref(), Some("sk-global"));
        assert_eq!(merged.openai.base_url.as_deref(), Some("https://proxy.example"));
    }

    #[test]
    fn test_merge_explicit_default_interval_overrides_global() {
        let global: Config = toml::from_str("poll_interval_ms = 500\n").unwrap();
        let project: Config = toml::from_str("poll_interval_ms = 1000\n").unwrap();
        let merged = Config::merge(global, project);
        assert_eq!(merged.poll_interval_ms, Some(1000));
    }

    #[test]
    fn test_find_project_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(
            dir.path().join("threadline.toml"),
            "assistant_id = \"asst_here\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = Config::find_project_config(nested).unwrap().unwrap();
        assert_eq!(found.assistant_id.as_deref(), Some("asst_here"));
    }

    #[test]
    fn test_set_value_nested_and_integer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::set_value_at(&path, "openai.base_url", "http://localhost:8080/v1").unwrap();
        Config::set_value_at(&path, "poll_interval_ms", "250").unwrap();

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(
            config.openai.base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
        assert_eq!(config.poll_interval_ms, Some(250));
        // Placeholder from the default file is preserved verbatim.
        assert_eq!(
            config.openai.api_key.as_deref(),
            Some("{env:OPENAI_API_KEY}")
        );
    }

    #[test]
    fn test_set_value_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(Config::set_value_at(&path, "model", "gpt-4o").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_set_value_rejects_bad_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(Config::set_value_at(&path, "poll_interval_ms", "soon").is_err());
    }
}
