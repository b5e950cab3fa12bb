//! Local function-call table.
//!
//! The remote assistant names a function and passes JSON arguments; the
//! [`ToolRegistry`] maps that name to a local [`Tool`]. Names with no
//! registered tool are left for the operator to answer by hand.

pub mod glob_tool;
pub mod grep_tool;
pub mod read_file;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob_tool::GlobTool;
use grep_tool::GrepTool;
use read_file::ReadFileTool;

/// The result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

/// Function definition in the shape the Assistants API expects in an
/// assistant's `tools` array.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the assistant uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description, shown by `threadline tools`.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<ToolResult>;
}

/// Holds all registered tools and dispatches calls by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. A later registration replaces an earlier one with
    /// the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    /// Look up a tool by name and execute it.
    pub async fn execute(&self, name: &str, input: Value) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        tool.execute(input).await
    }

    /// Definitions to paste into the assistant's tool list.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.schema(),
                },
            })
            .collect()
    }

    /// `(name, description)` pairs in registration order.
    pub fn summaries(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect()
    }

    /// Definitions as a pretty JSON array.
    pub fn definitions_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&json!(self.definitions()))?)
    }
}

/// Resolve `path` against `root` and reject anything that lands outside it.
///
/// The target must exist; symlinks are followed before the check.
pub(crate) fn resolve_within(root: &Path, path: &str) -> Result<PathBuf> {
    let resolved = if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        root.join(path)
    };
    let canonical = resolved
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("{}: {}", path, e))?;
    let root_canonical = root.canonicalize()?;
    if !canonical.starts_with(&root_canonical) {
        anyhow::bail!("Path escapes project directory: {}", path);
    }
    Ok(canonical)
}

impl ToolRegistry {
    /// Create a registry with all built-in tools rooted at `project_root`.
    pub fn with_builtins(project_root: PathBuf) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ReadFileTool::new(project_root.clone())));
        registry.register(Box::new(GlobTool::new(project_root.clone())));
        registry.register(Box::new(GrepTool::new(project_root)));
        registry
    }
}
