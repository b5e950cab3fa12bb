//! The turn loop: append, advance, poll, dispatch, print.
//!
//! [`Runner::run_turn`] drives one user turn against a thread. All
//! conversation state stays on the server; the runner only walks a single
//! run to a terminal status, answering tool calls whenever the run stops in
//! `requires_action`.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::api::{AssistantsApi, Role, Run, RunStatus};
use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::dispatch::{self, Operator};
use crate::interrupt::{Interrupted, Interrupts, Listener};
use crate::output::Renderer;
use crate::tools::ToolRegistry;

/// What one turn ended with.
#[derive(Debug)]
pub struct TurnOutcome {
    pub run_id: String,
    pub status: RunStatus,
    pub last_error: Option<String>,
}

/// Runs turns for one assistant against the Assistants API.
pub struct Runner<'a> {
    api: &'a dyn AssistantsApi,
    tools: &'a ToolRegistry,
    assistant_id: String,
    poll_interval: Duration,
    interrupts: Option<&'a Interrupts>,
}

impl<'a> Runner<'a> {
    pub fn new(api: &'a dyn AssistantsApi, tools: &'a ToolRegistry, assistant_id: impl Into<String>) -> Self {
        Self {
            api,
            tools,
            assistant_id: assistant_id.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            interrupts: None,
        }
    }

    /// Sets the fixed delay between polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Interrupts raised during a turn cancel its run; a second one abandons it.
    pub fn interrupts(mut self, interrupts: &'a Interrupts) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    /// Sends `input` (unless blank), advances the thread and waits for the run.
    ///
    /// Blank input still starts a run, which lets the assistant continue on
    /// its own. Non-blank input is sent exactly as given. Prints the newest
    /// message when the assistant wrote it.
    pub async fn run_turn(
        &self,
        thread_id: &str,
        input: &str,
        operator: &mut dyn Operator,
        renderer: &mut dyn Renderer,
    ) -> Result<TurnOutcome> {
        let mut listener = self.interrupts.map(Interrupts::listen).unwrap_or_default();

        if !input.trim().is_empty() {
            self.api
                .add_user_message(thread_id, input)
                .await
                .context("Failed to add message to thread")?;
        }

        let run = self
            .api
            .create_run(thread_id, &self.assistant_id)
            .await
            .context("Failed to start run")?;
        tracing::debug!(run_id = %run.id, status = %run.status, "run created");

        let run = self
            .wait_for_run(thread_id, run, &mut listener, operator, renderer)
            .await?;
        let last_error = run.last_error.as_ref().map(|e| e.message.clone());
        if run.status != RunStatus::Completed {
            let code = run.last_error.as_ref().and_then(|e| e.code.as_deref());
            tracing::warn!(run_id = %run.id, status = %run.status, code, "run did not complete");
            renderer.run_ended(run.status, last_error.as_deref());
        }

        let latest = self
            .api
            .latest_message(thread_id)
            .await
            .context("Failed to fetch latest message")?;
        let reply = latest
            .filter(|m| m.role == Role::Assistant)
            .filter(|m| m.run_id.as_deref().map_or(true, |id| id == run.id));
        if let Some(text) = reply.as_ref().and_then(|m| m.text()) {
            renderer.assistant_message(text);
        }

        Ok(TurnOutcome {
            run_id: run.id,
            status: run.status,
            last_error,
        })
    }

    /// Polls until the run is terminal, submitting tool outputs on the way.
    ///
    /// The first interrupt, from `listener` or from the operator, sends one
    /// cancel request and polling continues until the run settles. A second
    /// interrupt returns an error and leaves the run as it is.
    async fn wait_for_run(
        &self,
        thread_id: &str,
        mut run: Run,
        listener: &mut Listener,
        operator: &mut dyn Operator,
        renderer: &mut dyn Renderer,
    ) -> Result<Run> {
        let mut cancel_sent = false;

        while !run.status.is_terminal() {
            let calls = run.pending_tool_calls().to_vec();
            run = if calls.is_empty() {
                self.api
                    .retrieve_run(thread_id, &run.id)
                    .await
                    .context("Failed to poll run")?
            } else {
                let resolved = tokio::select! {
                    biased;
                    _ = listener.recv() => Err(Interrupted.into()),
                    outputs = dispatch::resolve_tool_calls(&calls, self.tools, operator, renderer) => outputs,
                };
                match resolved {
                    Ok(outputs) => self
                        .api
                        .submit_tool_outputs(thread_id, &run.id, &outputs)
                        .await
                        .context("Failed to submit tool outputs")?,
                    Err(e) if e.is::<Interrupted>() => {
                        self.cancel(thread_id, &run, &mut cancel_sent, renderer).await?
                    }
                    Err(e) => return Err(e),
                }
            };
            tracing::debug!(run_id = %run.id, status = %run.status, "run polled");

            if run.status.is_terminal() {
                break;
            }
            let interrupted = tokio::select! {
                biased;
                _ = listener.recv() => true,
                _ = tokio::time::sleep(self.poll_interval) => false,
            };
            if interrupted {
                run = self.cancel(thread_id, &run, &mut cancel_sent, renderer).await?;
            }
        }
        Ok(run)
    }

    async fn cancel(
        &self,
        thread_id: &str,
        run: &Run,
        cancel_sent: &mut bool,
        renderer: &mut dyn Renderer,
    ) -> Result<Run> {
        if *cancel_sent {
            anyhow::bail!(
                "Interrupted again; run {} left in status {}",
                run.id,
                run.status
            );
        }
        *cancel_sent = true;
        renderer.interrupted();
        tracing::info!(run_id = %run.id, "cancelling run");
        self.api
            .cancel_run(thread_id, &run.id)
            .await
            .context("Failed to cancel run")
    }
}
