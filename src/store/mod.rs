//! Document store: a versioned file in a remote repository.

pub mod github;
#[cfg(test)]
pub(crate) mod memory;

use std::fmt;

use async_trait::async_trait;

use crate::error::Error;

pub use github::GithubStore;

/// Opaque version of a stored file, required to overwrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File content together with the version it was read at.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub content: String,
    pub version: VersionToken,
}

/// Commit author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// A full-content replacement guarded by `version`.
#[derive(Debug, Clone)]
pub struct Commit<'a> {
    pub path: &'a str,
    pub branch: &'a str,
    pub message: String,
    pub content: String,
    pub version: VersionToken,
    pub author: Author,
}

/// Remote file storage with optimistic concurrency.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read `path` at `reference`.
    async fn fetch(&self, path: &str, reference: &str) -> Result<Fetched, Error>;

    /// Replace the file. Fails with [`Error::ConcurrentModification`] when
    /// the stored version no longer matches `commit.version`.
    async fn commit(&self, commit: Commit<'_>) -> Result<(), Error>;
}
