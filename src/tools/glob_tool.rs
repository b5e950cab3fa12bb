use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::{Tool, ToolResult};
use crate::constants::GLOB_MAX_RESULTS;

pub struct GlobTool {
    project_root: PathBuf,
}

impl GlobTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[derive(Deserialize)]
struct GlobInput {
    pattern: String,
}

#[async_trait::async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &str { "glob" }

    fn description(&self) -> &str {
        "List files under the project root that match a glob pattern."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Glob pattern (e.g. 'src/**/*.rs')"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let input: GlobInput = serde_json::from_value(input)?;
        if input.pattern.split(['/', '\\']).any(|part| part == "..") {
            return Ok(ToolResult::error(
                "Pattern may not leave the project directory".into(),
            ));
        }
        let full_pattern = self.project_root.join(&input.pattern);
        let entries = match glob::glob(&full_pattern.to_string_lossy()) {
            Ok(entries) => entries,
            Err(e) => return Ok(ToolResult::error(format!("Invalid pattern: {}", e))),
        };

        let root_canonical = self.project_root.canonicalize()?;
        let mut paths: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .canonicalize()
                    .map(|c| c.starts_with(&root_canonical))
                    .unwrap_or(false)
            })
            .map(|entry| {
                entry
                    .strip_prefix(&self.project_root)
                    .unwrap_or(&entry)
                    .display()
                    .to_string()
            })
            .take(GLOB_MAX_RESULTS + 1)
            .collect();

        if paths.is_empty() {
            return Ok(ToolResult::success("No files matched the pattern.".into()));
        }
        if paths.len() > GLOB_MAX_RESULTS {
            paths.truncate(GLOB_MAX_RESULTS);
            paths.push(format!("... truncated at {} results", GLOB_MAX_RESULTS));
        }
        Ok(ToolResult::success(paths.join("\n")))
    }
}
