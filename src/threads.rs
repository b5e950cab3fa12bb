//! Local records of threads created by threadline.
//!
//! The server owns the conversation itself; this index only remembers which
//! threads were opened from this machine so they can be listed, resumed by
//! short id, and deleted. Stored as `~/.local/share/threadline/threads.json`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constants::{THREAD_INDEX_FILENAME, THREAD_TITLE_MAX_CHARS};

/// Metadata for one thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub id: String,
    pub assistant_id: String,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub turn_count: usize,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct ThreadIndex {
    threads: Vec<ThreadRecord>,
}

/// File-backed index of [`ThreadRecord`]s.
pub struct ThreadStore {
    path: PathBuf,
}

impl ThreadStore {
    /// Opens the index under the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(Config::data_dir()?.join(THREAD_INDEX_FILENAME)))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Registers a newly created thread with no turns yet.
    pub fn record_created(&self, thread_id: &str, assistant_id: &str) -> Result<()> {
        let mut index = self.load()?;
        if !index.threads.iter().any(|t| t.id == thread_id) {
            let now = Utc::now().to_rfc3339();
            index.threads.push(ThreadRecord {
                id: thread_id.to_string(),
                assistant_id: assistant_id.to_string(),
                title: None,
                created_at: now.clone(),
                updated_at: now,
                turn_count: 0,
            });
        }
        self.save(&index)
    }

    /// Bumps the turn count and timestamp. The first non-blank input becomes
    /// the title. Unknown threads (e.g. resumed by full id) are added.
    pub fn record_turn(&self, thread_id: &str, assistant_id: &str, input: &str) -> Result<()> {
        let mut index = self.load()?;
        let now = Utc::now().to_rfc3339();

        let pos = match index.threads.iter().position(|t| t.id == thread_id) {
            Some(pos) => pos,
            None => {
                index.threads.push(ThreadRecord {
                    id: thread_id.to_string(),
                    assistant_id: assistant_id.to_string(),
                    title: None,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                    turn_count: 0,
                });
                index.threads.len() - 1
            }
        };

        let record = &mut index.threads[pos];
        record.turn_count += 1;
        record.updated_at = now;
        if record.title.is_none() && !input.trim().is_empty() {
            record.title = Some(title_from(input));
        }
        self.save(&index)
    }

    /// All records, most recently updated first.
    pub fn list(&self) -> Result<Vec<ThreadRecord>> {
        let mut threads = self.load()?.threads;
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(threads)
    }

    pub fn get(&self, thread_id: &str) -> Result<Option<ThreadRecord>> {
        Ok(self.load()?.threads.into_iter().find(|t| t.id == thread_id))
    }

    /// Removes a record. Returns whether one existed.
    pub fn remove(&self, thread_id: &str) -> Result<bool> {
        let mut index = self.load()?;
        let before = index.threads.len();
        index.threads.retain(|t| t.id != thread_id);
        let removed = index.threads.len() != before;
        if removed {
            self.save(&index)?;
        }
        Ok(removed)
    }

    /// Resolves a partial thread ID to a full ID.
    ///
    /// Matches the prefix against recorded ids, with or without the
    /// `thread_` prefix. Anything that looks like a full server id and
    /// matches nothing is passed through unchanged so foreign threads can
    /// still be resumed.
    pub fn resolve(&self, partial: &str) -> Result<String> {
        let threads = self.load()?.threads;
        let matches: Vec<_> = threads
            .iter()
            .filter(|t| {
                t.id.starts_with(partial)
                    || t.id
                        .strip_prefix("thread_")
                        .is_some_and(|rest| rest.starts_with(partial))
            })
            .collect();
        match matches.len() {
            0 if partial.starts_with("thread_") => Ok(partial.to_string()),
            0 => anyhow::bail!("No thread found matching '{}'", partial),
            1 => Ok(matches[0].id.clone()),
            _ => {
                let ids: Vec<_> = matches.iter().map(|t| t.id.as_str()).collect();
                anyhow::bail!(
                    "'{}' matches {} threads ({}). Provide more characters to disambiguate",
                    partial,
                    matches.len(),
                    ids.join(", ")
                )
            }
        }
    }

    fn load(&self) -> Result<ThreadIndex> {
        if !self.path.exists() {
            return Ok(ThreadIndex::default());
        }
        let contents =
            fs::read_to_string(&self.path).with_context(|| "Failed to read thread index")?;
        serde_json::from_str(&contents).with_context(|| "Failed to parse thread index")
    }

    fn save(&self, index: &ThreadIndex) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let json = serde_json::to_string_pretty(index)?;
        fs::write(&self.path, json).with_context(|| "Failed to write thread index")?;
        tracing::debug!(path = %self.path.display(), threads = index.threads.len(), "saved thread index");
        Ok(())
    }
}

/// First line of the input, truncated for display.
fn title_from(input: &str) -> String {
    let line = input.trim().lines().next().unwrap_or_default();
    if line.chars().count() > THREAD_TITLE_MAX_CHARS {
        let truncated: String = line.chars().take(THREAD_TITLE_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ThreadStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ThreadStore::at(dir.path().join("data").join("threads.json"));
        (dir, store)
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());
        assert!(!store.remove("thread_x").unwrap());
    }

    #[test]
    fn test_record_turn_sets_title_once() {
        let (_dir, store) = store();
        store.record_created("thread_abc123", "asst_1").unwrap();
        store.record_turn("thread_abc123", "asst_1", "  ").unwrap();
        store.record_turn("thread_abc123", "asst_1", "What's the weather?\nin Oslo").unwrap();
        store.record_turn("thread_abc123", "asst_1", "And tomorrow?").unwrap();

        let record = store.get("thread_abc123").unwrap().unwrap();
        assert_eq!(record.turn_count, 3);
        assert_eq!(record.title.as_deref(), Some("What's the weather?"));
        assert_eq!(record.assistant_id, "asst_1");
    }

    #[test]
    fn test_record_turn_adds_unknown_thread() {
        let (_dir, store) = store();
        store.record_turn("thread_foreign", "asst_2", "hello").unwrap();
        let threads = store.list().unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].turn_count, 1);
    }

    #[test]
    fn test_long_title_is_truncated() {
        let title = title_from(&"x".repeat(80));
        assert_eq!(title.chars().count(), THREAD_TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_resolve_prefixes() {
        let (_dir, store) = store();
        store.record_created("thread_abc111", "asst_1").unwrap();
        store.record_created("thread_abd222", "asst_1").unwrap();

        assert_eq!(store.resolve("abc").unwrap(), "thread_abc111");
        assert_eq!(store.resolve("thread_abd").unwrap(), "thread_abd222");
        assert!(store.resolve("ab").is_err());
        assert!(store.resolve("zzz").is_err());
        // Full ids the index has never seen pass through.
        assert_eq!(store.resolve("thread_elsewhere").unwrap(), "thread_elsewhere");
    }

    #[test]
    fn test_remove() {
        let (_dir, store) = store();
        store.record_created("thread_1", "asst_1").unwrap();
        store.record_created("thread_2", "asst_1").unwrap();
        assert!(store.remove("thread_1").unwrap());
        let ids: Vec<_> = store.list().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["thread_2"]);
    }
}
