//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/help`, `/thread`, `/new`, and `/history`. Returns a
//! [`CommandAction`] so the REPL loop can decide how to proceed.

use anyhow::Result;
use colored::Colorize;

use crate::api::AssistantsApi;
use crate::constants::HISTORY_FETCH_LIMIT;
use crate::threads::ThreadStore;

/// Action returned by slash command handling.
pub(crate) enum CommandAction {
    /// Command was handled successfully; continue the REPL loop.
    Continue,
    /// Switch the REPL to a freshly created thread.
    SwitchThread(String),
    /// Unknown command was entered.
    Unknown(String),
}

/// Dispatch and handle a slash command.
pub(crate) async fn handle_slash_command(
    command: &str,
    api: &dyn AssistantsApi,
    store: &ThreadStore,
    thread_id: &str,
    assistant_id: &str,
) -> Result<CommandAction> {
    match command {
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show the current thread id", "/thread".cyan());
            println!("  {} - start a new thread", "/new".cyan());
            println!("  {} - print the messages on this thread", "/history".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
            Ok(CommandAction::Continue)
        }
        "/thread" => {
            println!("{} {}", "thread:".dimmed(), thread_id.yellow());
            Ok(CommandAction::Continue)
        }
        "/new" => {
            let thread = api.create_thread().await?;
            store.record_created(&thread.id, assistant_id)?;
            println!("{} {}", "new thread:".dimmed(), thread.id.yellow());
            Ok(CommandAction::SwitchThread(thread.id))
        }
        "/history" => {
            print_history(api, thread_id).await?;
            Ok(CommandAction::Continue)
        }
        _ => Ok(CommandAction::Unknown(command.to_string())),
    }
}

/// Prints the thread's messages oldest first.
pub(crate) async fn print_history(api: &dyn AssistantsApi, thread_id: &str) -> Result<()> {
    let messages = api.list_messages(thread_id, HISTORY_FETCH_LIMIT).await?;
    if messages.is_empty() {
        println!("{}", "(no messages yet)".dimmed());
    }
    for msg in &messages {
        println!("{}", crate::format::format_message(msg));
        println!();
    }
    Ok(())
}
