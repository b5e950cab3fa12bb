//! Entry point for threadline, a terminal chat loop for hosted assistants.
//!
//! This binary loads environment variables, parses CLI arguments via [`cli`],
//! and dispatches to the appropriate subcommand handler.

mod api;
mod chat;
mod cli;
mod config;
mod constants;
mod dispatch;
mod format;
mod interrupt;
mod logging;
mod output;
mod runner;
mod threads;
mod tools;

use anyhow::Result;

/// Runs the threadline CLI.
///
/// Loads `.env` files (silently ignored if absent), parses command-line
/// arguments into a [`cli::Cli`] struct, sets up logging, and dispatches
/// the chosen subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    logging::init(cli.verbose);
    cli::run(cli).await
}
