//! Command-line interface definition and dispatch for threadline.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler; thread bookkeeping lives in the [`threads`]
//! submodule.

mod threads;

use crate::api::{AssistantsApi, AssistantsClient, RunStatus};
use crate::interrupt::Interrupts;
use crate::output::StdoutRenderer;
use crate::runner::Runner;
use crate::threads::ThreadStore;
use crate::{chat, config, dispatch, tools::ToolRegistry};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::time::Duration;

/// Top-level CLI structure for threadline.
#[derive(Parser)]
#[command(
    name = "threadline",
    about = "Chat with a hosted assistant and answer its tool calls locally"
)]
pub struct Cli {
    /// Log HTTP calls and run status changes to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the threadline CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat on a new or existing thread
    Chat {
        /// Resume a thread by id (short prefixes of recorded threads work)
        #[arg(short, long)]
        thread: Option<String>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Send one message, wait for the reply, and exit
    Ask {
        /// The message to send
        prompt: Vec<String>,
        /// Continue an existing thread instead of opening a new one
        #[arg(short, long)]
        thread: Option<String>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Manage threads created from this machine
    Threads {
        #[command(subcommand)]
        action: ThreadsAction,
    },
    /// List the local tools the assistant can call
    Tools {
        /// Print function definitions as JSON for the assistant's tool list
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options shared by commands that start runs.
#[derive(Args)]
pub struct RunArgs {
    /// Assistant to run (overrides config and THREADLINE_ASSISTANT_ID)
    #[arg(short, long)]
    pub assistant: Option<String>,
    /// Delay between status polls in milliseconds (overrides config)
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,
    /// Don't register the built-in file tools; every call goes to you
    #[arg(long)]
    pub no_builtin_tools: bool,
}

/// Subcommands for the `threads` command.
#[derive(Subcommand)]
pub enum ThreadsAction {
    /// List recorded threads
    List,
    /// Print the messages of a thread
    Show { id: String },
    /// Delete a thread on the server and forget it locally
    Delete { id: String },
}

/// Subcommands for the `config` command.
///
/// Controls reading and writing threadline's TOML configuration file
/// stored at the XDG config path (`~/.config/threadline/config.toml`).
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current config
    Show,
    /// Print the config file path
    Path,
    /// Set a config value (e.g. `assistant_id`, `openai.base_url`)
    Set { key: String, value: String },
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Builds the local tool table, rooted at the working directory.
fn build_registry(no_builtin_tools: bool) -> Result<ToolRegistry> {
    if no_builtin_tools {
        return Ok(ToolRegistry::new());
    }
    let project_root = std::env::current_dir()?;
    Ok(ToolRegistry::with_builtins(project_root))
}

fn poll_interval(config: &config::Config, run: &RunArgs) -> Duration {
    run.poll_interval
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.poll_interval())
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Chat { thread, run } => {
            let config = config::Config::load()?;
            let assistant_id = config.resolve_assistant_id(run.assistant.as_deref())?;
            let client = AssistantsClient::from_config(&config)?;
            let tools = build_registry(run.no_builtin_tools)?;
            let store = ThreadStore::open_default()?;
            let thread = thread.map(|t| store.resolve(&t)).transpose()?;

            let interrupts = Interrupts::ctrl_c();
            let runner = Runner::new(&client, &tools, assistant_id)
                .poll_interval(poll_interval(&config, &run))
                .interrupts(&interrupts);
            chat::run_chat(&client, &runner, &store, thread).await
        }
        Commands::Ask { prompt, thread, run } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                anyhow::bail!("No prompt provided. Usage: threadline ask \"your message here\"");
            }

            let config = config::Config::load()?;
            let assistant_id = config.resolve_assistant_id(run.assistant.as_deref())?;
            let client = AssistantsClient::from_config(&config)?;
            let tools = build_registry(run.no_builtin_tools)?;
            let store = ThreadStore::open_default()?;

            let thread_id = match thread {
                Some(t) => store.resolve(&t)?,
                None => {
                    let thread = client.create_thread().await.context("Failed to create thread")?;
                    store.record_created(&thread.id, &assistant_id)?;
                    thread.id
                }
            };

            let interrupts = Interrupts::ctrl_c();
            let runner = Runner::new(&client, &tools, assistant_id.clone())
                .poll_interval(poll_interval(&config, &run))
                .interrupts(&interrupts);
            let mut operator = dispatch::StdinOperator::new()?;
            let mut renderer = StdoutRenderer::new();
            let outcome = runner
                .run_turn(&thread_id, &prompt, &mut operator, &mut renderer)
                .await?;
            store.record_turn(&thread_id, &assistant_id, &prompt)?;

            println!();
            println!("{}", format!("[thread: {}]", thread_id).dimmed());
            if outcome.status != RunStatus::Completed {
                match outcome.last_error {
                    Some(error) => anyhow::bail!(
                        "run {} ended with status {}: {}",
                        outcome.run_id,
                        outcome.status,
                        error
                    ),
                    None => anyhow::bail!("run {} ended with status {}", outcome.run_id, outcome.status),
                }
            }
            Ok(())
        }
        Commands::Threads { action } => threads::handle_threads(action).await,
        Commands::Tools { json } => {
            let tools = build_registry(false)?;
            if json {
                println!("{}", tools.definitions_json()?);
            } else {
                println!("{}", "Local tools:".bold());
                for (name, description) in tools.summaries() {
                    println!("  {} {}", format!("{:<12}", name).cyan(), description.dimmed());
                }
                println!();
                println!(
                    "{}",
                    "Any other function the assistant calls is answered by you at the prompt."
                        .dimmed()
                );
            }
            Ok(())
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => {
                    let config = config::Config::load()?;
                    let path = config::Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    let mut shown = config.clone();
                    if shown.openai.api_key.is_some() {
                        shown.openai.api_key = Some("(set)".into());
                    }
                    println!("{}", toml::to_string_pretty(&shown)?);
                }
                ConfigAction::Path => {
                    println!("{}", config::Config::config_path()?.display());
                }
                ConfigAction::Set { key, value } => {
                    let path = config::Config::set_global_value(&key, &value)?;
                    println!("{} {} = {} ({})", "set".green(), key, value, path.display());
                }
            }
            Ok(())
        }
    }
}
