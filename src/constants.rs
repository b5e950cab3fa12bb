//! Centralized constants for threadline.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "threadline";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "threadline.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Thread index filename, stored under the data directory.
pub const THREAD_INDEX_FILENAME: &str = "threads.json";

// --- Assistants API ---

/// Default base URL for the OpenAI API.
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Value of the `OpenAI-Beta` header required by the Assistants endpoints.
pub const ASSISTANTS_BETA_HEADER: &str = "assistants=v2";

/// Exit status when Ctrl+C arrives with no run in flight (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable that overrides the configured assistant id.
pub const ASSISTANT_ID_ENV: &str = "THREADLINE_ASSISTANT_ID";

/// Default delay between run status polls, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Number of messages fetched by `/history` and `threads show`.
pub const HISTORY_FETCH_LIMIT: u32 = 100;

// --- Thread records ---

/// Maximum characters kept from the first user message as a thread title.
pub const THREAD_TITLE_MAX_CHARS: usize = 50;

// --- Tool limits ---

/// Maximum file size (bytes) the read_file tool will read.
pub const READ_FILE_MAX_SIZE: u64 = 100 * 1024;

/// Byte threshold for binary file detection (check first N bytes for null).
pub const BINARY_DETECTION_BYTES: usize = 8192;

/// Maximum number of results the glob tool returns.
pub const GLOB_MAX_RESULTS: usize = 1000;

/// Maximum number of matching lines the grep tool returns.
pub const GREP_MAX_MATCHES: usize = 50;
