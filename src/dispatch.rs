//! Resolution of the tool calls a run is waiting on.
//!
//! Each requested function is looked up in the [`ToolRegistry`]. Registered
//! tools run locally; anything else is shown to the operator, who types the
//! output the assistant should receive.

use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;

use crate::api::{ToolCall, ToolOutput};
use crate::format;
use crate::interrupt::Interrupted;
use crate::output::Renderer;
use crate::tools::ToolRegistry;

/// A human who can answer tool calls that have no local implementation.
pub trait Operator {
    /// Returns the literal output to submit for `tool_name`.
    ///
    /// Fails with [`Interrupted`] when the operator gives up on the turn.
    fn provide_output(&mut self, tool_name: &str) -> Result<String>;
}

/// Prompts on the terminal and reads one line.
///
/// Reads through rustyline so Ctrl+C arrives as a key press rather than a
/// signal, and becomes [`Interrupted`].
pub struct StdinOperator {
    editor: DefaultEditor,
}

impl StdinOperator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Operator for StdinOperator {
    fn provide_output(&mut self, _tool_name: &str) -> Result<String> {
        println!("{}", "Please provide tool output:".red());
        match self.editor.readline(&format!("{} ", ">".red())) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted) => Err(Interrupted.into()),
            Err(ReadlineError::Eof) => {
                anyhow::bail!("stdin closed while waiting for tool output")
            }
            Err(e) => Err(e).context("Failed to read tool output"),
        }
    }
}

/// Produces one [`ToolOutput`] per function call, in request order.
///
/// Calls whose type is not `function` are reported and left out. Tool
/// failures become an `error: ...` output so the run can carry on.
pub async fn resolve_tool_calls(
    calls: &[ToolCall],
    tools: &ToolRegistry,
    operator: &mut dyn Operator,
    renderer: &mut dyn Renderer,
) -> Result<Vec<ToolOutput>> {
    renderer.tool_calls_requested(calls.len());

    let mut outputs = Vec::with_capacity(calls.len());
    for call in calls {
        if call.kind != "function" {
            renderer.skipped_tool_type(&call.kind);
            continue;
        }

        let name = call.function.name.as_str();
        let pretty_args = format::pretty_json(&call.function.arguments);

        let output = if tools.contains(name) {
            renderer.tool_invoked(name, &pretty_args);
            let output = run_registered(tools, name, &call.function.arguments).await;
            renderer.tool_output(&output);
            output
        } else {
            renderer.unknown_tool(name, &pretty_args);
            operator.provide_output(name)?
        };
        tracing::debug!(tool = name, call_id = %call.id, bytes = output.len(), "tool call resolved");

        outputs.push(ToolOutput {
            tool_call_id: call.id.clone(),
            output,
        });
    }
    Ok(outputs)
}

async fn run_registered(tools: &ToolRegistry, name: &str, raw_args: &str) -> String {
    let args: Value = match serde_json::from_str(raw_args) {
        Ok(v) => v,
        Err(e) => return format!("error: invalid arguments: {}", e),
    };
    match tools.execute(name, args).await {
        Ok(result) if result.is_error => format!("error: {}", result.content),
        Ok(result) => result.content,
        Err(e) => {
            tracing::warn!(tool = name, error = %e, "tool failed");
            format!("error: {}", e)
        }
    }
}
