//! Interactive chat REPL for threadline.
//!
//! Provides a multi-turn conversation loop using [`rustyline`] for readline
//! support (history, line editing). Unlike a local chat, nothing is kept in
//! memory between turns: each line is appended to a server-side thread and a
//! run is started, so the assistant sees the full history on its own.

mod commands;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub(crate) use commands::print_history;

use crate::api::AssistantsApi;
use crate::config::Config;
use crate::dispatch::StdinOperator;
use crate::output::StdoutRenderer;
use crate::runner::Runner;
use crate::threads::ThreadStore;
use commands::CommandAction;

/// Runs the interactive chat REPL.
///
/// Opens a new thread, or resumes `thread_id` after printing its recent
/// messages, then enters a readline loop where each line becomes one turn
/// driven by [`Runner::run_turn`].
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL (cancels the run
///   while one is in progress)
/// - **Ctrl+D**: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/threadline/chat_history.txt`
/// - A blank line still starts a run, letting the assistant continue
pub async fn run_chat(
    api: &dyn AssistantsApi,
    runner: &Runner<'_>,
    store: &ThreadStore,
    thread_id: Option<String>,
) -> Result<()> {
    let assistant_id = runner.assistant_id().to_string();

    let mut thread_id = match thread_id {
        Some(id) => {
            println!(
                "{} [thread: {}] [assistant: {}]",
                "resuming".bold().cyan(),
                id.yellow(),
                assistant_id.yellow(),
            );
            println!();
            print_history(api, &id).await?;
            id
        }
        None => {
            let thread = api.create_thread().await?;
            store.record_created(&thread.id, &assistant_id)?;
            println!(
                "{} [thread: {}] [assistant: {}] (Ctrl+D to exit)",
                "threadline chat".bold().cyan(),
                thread.id.yellow(),
                assistant_id.yellow(),
            );
            println!();
            thread.id
        }
    };

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    let mut operator = StdinOperator::new()?;
    let mut renderer = StdoutRenderer::new();

    loop {
        println!("{}", "Enter your message:".green());
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                if let Some(command) = slash_command(&line) {
                    match commands::handle_slash_command(command, api, store, &thread_id, &assistant_id)
                        .await
                    {
                        Ok(CommandAction::Continue) => {}
                        Ok(CommandAction::SwitchThread(id)) => thread_id = id,
                        Ok(CommandAction::Unknown(cmd)) => {
                            println!("{} Unknown command: {}", "?".yellow(), cmd);
                        }
                        Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
                    }
                    continue;
                }

                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                match runner
                    .run_turn(&thread_id, &line, &mut operator, &mut renderer)
                    .await
                {
                    Ok(_) => {
                        if let Err(e) = store.record_turn(&thread_id, &assistant_id, &line) {
                            tracing::warn!(error = %e, "failed to update thread index");
                        }
                    }
                    Err(e) => {
                        eprintln!("{} {:#}", "error:".red().bold(), e);
                    }
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    // Save readline history
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// The trimmed command when `line` is a slash command. Anything else is sent
/// to the assistant untouched.
fn slash_command(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed.starts_with('/').then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_command_is_trimmed() {
        assert_eq!(slash_command("  /history \n"), Some("/history"));
        assert_eq!(slash_command("/new"), Some("/new"));
    }

    #[test]
    fn test_messages_are_not_commands() {
        assert_eq!(slash_command("  keep my   spacing  "), None);
        assert_eq!(slash_command("a/b"), None);
        assert_eq!(slash_command(""), None);
    }
}
