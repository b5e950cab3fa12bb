//! Assistants API access for threadline.
//!
//! All conversation state lives on the server. This module only models the
//! endpoints threadline calls and hides them behind [`AssistantsApi`] so the
//! turn loop can run against the real [`AssistantsClient`] or a test double.

mod client;
mod error;
pub(crate) mod types;

use async_trait::async_trait;

pub use client::AssistantsClient;
pub use error::ApiError;
pub use types::{Role, Run, RunStatus, Thread, ThreadMessage, ToolCall, ToolOutput};

/// The subset of the Assistants API threadline drives.
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    /// Opens a new, empty conversation.
    async fn create_thread(&self) -> Result<Thread, ApiError>;

    /// Deletes a conversation. Returns whether the server reports it deleted.
    async fn delete_thread(&self, thread_id: &str) -> Result<bool, ApiError>;

    /// Appends a user turn to the thread.
    async fn add_user_message(&self, thread_id: &str, text: &str) -> Result<ThreadMessage, ApiError>;

    /// Asks the assistant to advance the thread.
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ApiError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ApiError>;

    /// Returns the outputs for every pending tool call of a run.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, ApiError>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ApiError>;

    /// The newest message on the thread, regardless of author.
    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>, ApiError>;

    /// Up to `limit` messages, oldest first.
    async fn list_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<ThreadMessage>, ApiError>;
}
