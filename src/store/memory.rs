//! In-memory document store for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Author, Commit, DocumentStore, Fetched, VersionToken};
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct RecordedCommit {
    pub path: String,
    pub branch: String,
    pub message: String,
    pub content: String,
    pub author: Author,
}

#[derive(Debug)]
struct State {
    content: String,
    revision: u64,
    fetches: usize,
    commits: Vec<RecordedCommit>,
    /// Bump the revision right after the next fetch, simulating another writer.
    race_next_fetch: bool,
}

/// Single-file store. Every commit bumps the revision.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(content: &str) -> Self {
        Self {
            state: Mutex::new(State {
                content: content.to_string(),
                revision: 1,
                fetches: 0,
                commits: Vec::new(),
                race_next_fetch: false,
            }),
        }
    }

    pub fn race_next_fetch(&self) {
        self.state.lock().unwrap().race_next_fetch = true;
    }

    pub fn content(&self) -> String {
        self.state.lock().unwrap().content.clone()
    }

    pub fn fetches(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.state.lock().unwrap().commits.clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, _path: &str, _reference: &str) -> Result<Fetched, Error> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        let fetched = Fetched {
            content: state.content.clone(),
            version: VersionToken::new(state.revision.to_string()),
        };
        if state.race_next_fetch {
            state.race_next_fetch = false;
            state.revision += 1;
        }
        Ok(fetched)
    }

    async fn commit(&self, commit: Commit<'_>) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        if commit.version.as_str() != state.revision.to_string() {
            return Err(Error::ConcurrentModification {
                path: commit.path.to_string(),
            });
        }
        state.revision += 1;
        state.content = commit.content.clone();
        state.commits.push(RecordedCommit {
            path: commit.path.to_string(),
            branch: commit.branch.to_string(),
            message: commit.message,
            content: commit.content,
            author: commit.author,
        });
        Ok(())
    }
}
