//! Output rendering abstraction for threadline.
//!
//! Defines the [`Renderer`] trait that decouples the turn loop from the
//! display layer. [`StdoutRenderer`] prints colored text to the terminal;
//! tests substitute a renderer that records events instead.

use colored::Colorize;

use crate::api::RunStatus;
use crate::format;

/// Receives everything the turn loop wants to show the user.
pub trait Renderer {
    /// The assistant asked for `count` tool calls in one step.
    fn tool_calls_requested(&mut self, count: usize);

    /// A registered tool is about to run with the given (pretty) arguments.
    fn tool_invoked(&mut self, name: &str, args: &str);

    /// Output produced by a registered tool.
    fn tool_output(&mut self, output: &str);

    /// The assistant called a tool with no local implementation.
    fn unknown_tool(&mut self, name: &str, args: &str);

    /// A tool call of a type other than `function` was skipped.
    fn skipped_tool_type(&mut self, kind: &str);

    /// The reply for this turn.
    fn assistant_message(&mut self, text: &str);

    /// Ctrl+C arrived while waiting; the run is being cancelled.
    fn interrupted(&mut self);

    /// The run stopped in a state other than `completed`.
    fn run_ended(&mut self, status: RunStatus, error: Option<&str>);
}

/// Renders turn events directly to stdout with ANSI colors.
#[derive(Default)]
pub struct StdoutRenderer;

impl StdoutRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for StdoutRenderer {
    fn tool_calls_requested(&mut self, count: usize) {
        println!(
            "{} {} {}",
            "Model is making".blue(),
            count.to_string().yellow().bold(),
            "tool call(s):".blue()
        );
    }

    fn tool_invoked(&mut self, name: &str, args: &str) {
        println!(
            "{} {} {}",
            "Model invoked tool".blue(),
            name.yellow().bold(),
            "with args:".blue()
        );
        println!("{}", args);
    }

    fn tool_output(&mut self, output: &str) {
        println!("{}", "Tool output:".blue());
        println!("{}", output);
    }

    fn unknown_tool(&mut self, name: &str, args: &str) {
        println!("{} {}", "Unknown tool".red(), name.yellow().bold());
        println!("{}", "Tool arguments:".blue());
        println!("{}", args);
    }

    fn skipped_tool_type(&mut self, kind: &str) {
        println!(
            "{} {}",
            "Skipping processing for unknown tool type:".red(),
            kind
        );
    }

    fn assistant_message(&mut self, text: &str) {
        println!("{}", "Assistant says:".cyan().bold());
        println!("{}", format::render_markdown_lite(text));
    }

    fn interrupted(&mut self) {
        eprintln!("{}", "^C cancelling run...".dimmed());
    }

    fn run_ended(&mut self, status: RunStatus, error: Option<&str>) {
        match error {
            Some(message) => eprintln!("{} run {}: {}", "warning:".yellow().bold(), status, message),
            None => eprintln!("{} run {}", "warning:".yellow().bold(), status),
        }
    }
}
