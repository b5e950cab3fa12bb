use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::{resolve_within, Tool, ToolResult};
use crate::constants::{BINARY_DETECTION_BYTES, READ_FILE_MAX_SIZE};

pub struct ReadFileTool {
    /// Project root directory. Paths are resolved relative to this.
    project_root: PathBuf,
}

impl ReadFileTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[derive(Deserialize)]
struct ReadFileInput {
    path: String,
    /// 1-based first line to return.
    start_line: Option<usize>,
    /// Number of lines to return from `start_line`.
    line_count: Option<usize>,
}

/// Selects a 1-based line window, or the whole text when no bounds are given.
fn line_window(text: &str, start: Option<usize>, count: Option<usize>) -> String {
    if start.is_none() && count.is_none() {
        return text.to_string();
    }
    let skip = start.unwrap_or(1).saturating_sub(1);
    let take = count.unwrap_or(usize::MAX);
    text.lines().skip(skip).take(take).collect::<Vec<_>>().join("\n")
}

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str { "read_file" }

    fn description(&self) -> &str {
        "Read a text file relative to the project root, optionally a range of lines."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to project root"
                },
                "start_line": {
                    "type": "integer",
                    "description": "First line to return (1-based)"
                },
                "line_count": {
                    "type": "integer",
                    "description": "Number of lines to return"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let input: ReadFileInput = serde_json::from_value(input)?;
        let path = resolve_within(&self.project_root, &input.path)?;

        let metadata = std::fs::metadata(&path)?;
        if metadata.is_dir() {
            return Ok(ToolResult::error(format!("{} is a directory", input.path)));
        }
        if metadata.len() > READ_FILE_MAX_SIZE {
            return Ok(ToolResult::error(format!(
                "File too large: {} bytes (max {})",
                metadata.len(),
                READ_FILE_MAX_SIZE
            )));
        }

        let content = std::fs::read(&path)?;
        let check_len = content.len().min(BINARY_DETECTION_BYTES);
        if content[..check_len].contains(&0) {
            return Ok(ToolResult::error(
                "Binary file detected. Cannot display binary content.".into(),
            ));
        }

        let text = String::from_utf8(content)
            .map_err(|_| anyhow::anyhow!("File is not valid UTF-8"))?;
        Ok(ToolResult::success(line_window(
            &text,
            input.start_line,
            input.line_count,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::line_window;

    #[test]
    fn test_line_window() {
        let text = "one\ntwo\nthree\nfour";
        assert_eq!(line_window(text, None, None), text);
        assert_eq!(line_window(text, Some(2), Some(2)), "two\nthree");
        assert_eq!(line_window(text, Some(3), None), "three\nfour");
        assert_eq!(line_window(text, None, Some(1)), "one");
        assert_eq!(line_window(text, Some(0), Some(1)), "one");
        assert_eq!(line_window(text, Some(10), None), "");
    }
}
