//! Thread management CLI operations for threadline.
//!
//! Handles listing, showing, and deleting threads through the
//! `threadline threads` subcommand family. Provides table-formatted output
//! and partial thread ID matching (git-style short IDs).

use anyhow::Result;
use colored::Colorize;

use super::ThreadsAction;
use crate::api::{ApiError, AssistantsApi, AssistantsClient};
use crate::threads::{ThreadRecord, ThreadStore};
use crate::{chat, config};

/// Dispatches a threads subcommand to its handler.
pub(crate) async fn handle_threads(action: ThreadsAction) -> Result<()> {
    let store = ThreadStore::open_default()?;
    match action {
        ThreadsAction::List => thread_list(&store),
        ThreadsAction::Show { id } => {
            let full_id = store.resolve(&id)?;
            let config = config::Config::load()?;
            let client = AssistantsClient::from_config(&config)?;
            println!("{} {}", "thread:".dimmed(), full_id.yellow());
            println!();
            chat::print_history(&client, &full_id).await
        }
        ThreadsAction::Delete { id } => {
            let full_id = store.resolve(&id)?;
            let config = config::Config::load()?;
            let client = AssistantsClient::from_config(&config)?;
            thread_delete(&client, &store, &full_id).await
        }
    }
}

/// Display width of the short id column.
const SHORT_ID_LEN: usize = 14;

fn short_id(id: &str) -> &str {
    let end = id
        .char_indices()
        .nth(SHORT_ID_LEN)
        .map(|(i, _)| i)
        .unwrap_or(id.len());
    &id[..end]
}

/// Lists all recorded threads in a formatted table.
///
/// Displays thread ID, title, turn count, last-updated timestamp, and
/// assistant. Adapts the title column to the terminal width.
pub(crate) fn thread_list(store: &ThreadStore) -> Result<()> {
    let threads = store.list()?;
    if threads.is_empty() {
        println!("{}", "No threads found.".dimmed());
        println!("Start one with: {}", "threadline chat".cyan());
        return Ok(());
    }

    let term_width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80);

    // ID, TURNS, UPDATED, ASSISTANT columns plus separators
    let fixed_cols = (SHORT_ID_LEN + 1) + 6 + 18 + 20;
    let max_title_len = threads
        .iter()
        .map(|t| t.title.as_deref().unwrap_or("(untitled)").chars().count())
        .max()
        .unwrap_or(5);
    let title_width = max_title_len
        .max(5)
        .min(term_width.saturating_sub(fixed_cols).clamp(5, 50));

    println!(
        "{} {} {} {} {}",
        format!("{:<w$}", "ID", w = SHORT_ID_LEN).bold(),
        format!("{:<tw$}", "TITLE", tw = title_width).bold(),
        format!("{:<5}", "TURNS").bold(),
        format!("{:<17}", "UPDATED").bold(),
        "ASSISTANT".bold(),
    );
    println!("{}", "-".repeat(term_width.min(fixed_cols + title_width)));

    for t in &threads {
        print_row(t, title_width);
    }
    println!();
    println!(
        "{} {} threads. Resume with: {}",
        "total:".dimmed(),
        threads.len(),
        "threadline chat --thread <id>".cyan()
    );
    Ok(())
}

fn print_row(t: &ThreadRecord, title_width: usize) {
    let title_str = t.title.as_deref().unwrap_or("(untitled)");
    let title = if title_str.chars().count() > title_width {
        let truncated: String = title_str.chars().take(title_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        title_str.to_string()
    };

    // Format timestamp: parse RFC3339 -> "YYYY-MM-DD HH:MM"
    let updated = chrono::DateTime::parse_from_rfc3339(&t.updated_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| t.updated_at.chars().take(16).collect());

    // Pad first, then colorize to avoid ANSI escape code width issues
    println!(
        "{} {} {} {} {}",
        format!("{:<w$}", short_id(&t.id), w = SHORT_ID_LEN).cyan(),
        format!("{:<tw$}", title, tw = title_width),
        format!("{:<5}", t.turn_count).yellow(),
        format!("{:<17}", updated).dimmed(),
        t.assistant_id.dimmed(),
    );
}

/// Deletes a thread on the server, then drops the local record.
///
/// A thread the server no longer knows (404) is still forgotten locally.
pub(crate) async fn thread_delete(
    api: &dyn AssistantsApi,
    store: &ThreadStore,
    id: &str,
) -> Result<()> {
    let title = store
        .get(id)?
        .and_then(|t| t.title)
        .unwrap_or_else(|| "(untitled)".to_string());
    println!("Deleting thread {} (\"{}\")", id.cyan(), title);

    match api.delete_thread(id).await {
        Ok(_) => {}
        Err(ApiError::Status { status: 404, .. }) => {
            eprintln!("{} thread not found on server", "warning:".yellow().bold());
        }
        Err(e) => return Err(e.into()),
    }
    store.remove(id)?;
    println!("{}", "Deleted.".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::tests::ScriptedApi;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("thread_abcdefghijklmnop"), "thread_abcdefg");
        assert_eq!(short_id("thread_1"), "thread_1");
    }

    #[tokio::test]
    async fn test_thread_delete_removes_remote_and_local() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThreadStore::at(dir.path().join("threads.json"));
        store.record_created("thread_gone", "asst_1").unwrap();
        let api = ScriptedApi::new(Vec::new(), None);

        thread_delete(&api, &store, "thread_gone").await.unwrap();

        assert_eq!(api.call_log(), vec!["delete_thread:thread_gone"]);
        assert!(store.get("thread_gone").unwrap().is_none());
    }
}
