//! Post mutation engine.
//!
//! Every operation is a fresh read-modify-write of the whole document,
//! guarded by the version token from the read. Nothing is cached between
//! calls and conflicts are never retried.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::GithubConfig;
use crate::error::Error;
use crate::posts::{self, NewPost, Post, Record};
use crate::store::{Author, Commit, DocumentStore, VersionToken};

/// Source of "today" for new posts.
pub type Clock = fn() -> NaiveDate;

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// The chat user a command runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

/// Applies post mutations to the stored document.
pub struct MutationEngine {
    store: Option<Arc<dyn DocumentStore>>,
    path: String,
    branch: String,
    author_domain: String,
    today: Clock,
}

impl MutationEngine {
    /// `store` is `None` when the store credentials are missing; every
    /// operation then fails with [`Error::StoreUnavailable`].
    pub fn new(store: Option<Arc<dyn DocumentStore>>, config: &GithubConfig) -> Self {
        Self {
            store,
            path: config.posts_path.clone(),
            branch: config.branch.clone(),
            author_domain: config.author_domain.clone(),
            today: local_today,
        }
    }

    pub fn with_clock(mut self, today: Clock) -> Self {
        self.today = today;
        self
    }

    /// Path of the managed document.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&dyn DocumentStore, Error> {
        self.store.as_deref().ok_or(Error::StoreUnavailable)
    }

    fn author(&self, actor: &Actor) -> Author {
        Author {
            name: actor.name.clone(),
            email: format!("{}@{}", actor.name, self.author_domain),
        }
    }

    /// Fetch and parse the current document.
    async fn load(&self) -> Result<(Vec<Record>, VersionToken), Error> {
        let fetched = self.store()?.fetch(&self.path, &self.branch).await?;
        let records = posts::parse_document(&self.path, &fetched.content)?;
        debug!(path = %self.path, posts = records.len(), version = %fetched.version, "Loaded posts");
        Ok((records, fetched.version))
    }

    /// Rewrite the whole document at `version`.
    async fn save(
        &self,
        records: &[Record],
        version: VersionToken,
        message: String,
        actor: &Actor,
    ) -> Result<(), Error> {
        let content = posts::render_document(records)?;
        self.store()?
            .commit(Commit {
                path: &self.path,
                branch: &self.branch,
                message,
                content,
                version,
                author: self.author(actor),
            })
            .await
    }

    /// Prepend a new post and commit. Returns the stored record.
    pub async fn create(&self, actor: &Actor, new: NewPost) -> Result<Post, Error> {
        let (mut records, version) = self.load().await?;

        let post = Post::from_new(new, records.len() as u64 + 1, (self.today)());
        records.insert(0, post.to_record()?);

        let message = format!("Bot: Nuevo post '{}' añadido por {}", post.title, actor.name);
        self.save(&records, version, message, actor).await?;

        info!(
            id = post.id,
            title = %post.title,
            category = %post.category,
            user = %actor.name,
            "Post created"
        );
        Ok(post)
    }

    /// Remove every post titled exactly `title` and commit. Records without
    /// a string title never match.
    ///
    /// Returns the number of removed posts. Fails with [`Error::NotFound`]
    /// without committing when nothing matches.
    pub async fn delete(&self, actor: &Actor, title: &str) -> Result<usize, Error> {
        let (mut records, version) = self.load().await?;

        let before = records.len();
        records.retain(|r| posts::title_of(r) != Some(title));
        let removed = before - records.len();

        if removed == 0 {
            info!(title, "No post to delete");
            return Err(Error::NotFound {
                title: title.to_string(),
            });
        }

        let message = format!("Bot: Eliminado el post '{}' por {}", title, actor.name);
        self.save(&records, version, message, actor).await?;

        info!(title, removed, user = %actor.name, "Post deleted");
        Ok(removed)
    }
}
