use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::{resolve_within, Tool, ToolResult};
use crate::constants::{BINARY_DETECTION_BYTES, GREP_MAX_MATCHES};

pub struct GrepTool {
    project_root: PathBuf,
}

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// State for one search: the pattern, the optional file filter, and the hits so far.
struct Search<'a> {
    root: &'a Path,
    regex: Regex,
    include: Option<glob::Pattern>,
    matches: Vec<String>,
}

impl Search<'_> {
    fn full(&self) -> bool {
        self.matches.len() >= GREP_MAX_MATCHES
    }

    fn walk(&mut self, dir: &Path) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            if self.full() {
                return;
            }
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if path.is_dir() {
                if name.starts_with('.') || SKIPPED_DIRS.contains(&&*name) {
                    continue;
                }
                self.walk(&path);
            } else if path.is_file() {
                let included = match self.include {
                    Some(ref pattern) => pattern.matches(&name),
                    None => true,
                };
                if included {
                    self.scan_file(&path);
                }
            }
        }
    }

    /// Appends `path:line:content` for every matching line of a text file.
    fn scan_file(&mut self, path: &Path) {
        let Ok(bytes) = fs::read(path) else {
            return;
        };
        if bytes[..bytes.len().min(BINARY_DETECTION_BYTES)].contains(&0) {
            return;
        }
        let Ok(text) = String::from_utf8(bytes) else {
            return;
        };

        let relative = path.strip_prefix(self.root).unwrap_or(path).display().to_string();
        for (idx, line) in text.lines().enumerate() {
            if self.full() {
                return;
            }
            if self.regex.is_match(line) {
                self.matches.push(format!("{}:{}:{}", relative, idx + 1, line));
            }
        }
    }
}

impl GrepTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[derive(Deserialize)]
struct GrepInput {
    pattern: String,
    path: Option<String>,
    include: Option<String>,
}

#[async_trait::async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &str { "grep" }

    fn description(&self) -> &str {
        "Search file contents with a regex. Returns matching lines as path:line:text."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regex pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "Directory to search in (relative to project root, defaults to '.')"
                },
                "include": {
                    "type": "string",
                    "description": "File name glob to filter on (e.g. '*.rs')"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let input: GrepInput = serde_json::from_value(input)?;

        let regex = match Regex::new(&input.pattern) {
            Ok(r) => r,
            Err(e) => return Ok(ToolResult::error(format!("Invalid regex: {}", e))),
        };
        let include = match input.include.as_deref().map(glob::Pattern::new) {
            Some(Ok(p)) => Some(p),
            Some(Err(e)) => return Ok(ToolResult::error(format!("Invalid include pattern: {}", e))),
            None => None,
        };

        let root = self.project_root.canonicalize()?;
        let start = match input.path {
            Some(ref path) => match resolve_within(&self.project_root, path) {
                Ok(p) => p,
                Err(e) => return Ok(ToolResult::error(e.to_string())),
            },
            None => root.clone(),
        };

        let mut search = Search {
            root: &root,
            regex,
            include,
            matches: Vec::new(),
        };
        if start.is_file() {
            search.scan_file(&start);
        } else {
            search.walk(&start);
        }

        if search.matches.is_empty() {
            return Ok(ToolResult::success("No matches found.".into()));
        }
        let mut out = search.matches.join("\n");
        if search.full() {
            out.push_str(&format!("\n... truncated at {} matches", GREP_MAX_MATCHES));
        }
        Ok(ToolResult::success(out))
    }
}
