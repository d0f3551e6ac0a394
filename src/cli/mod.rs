//! CLI commands for the bot.

pub mod register;
pub mod serve;

use std::sync::Arc;

use tracing::error;

use crate::config::Config;
use crate::engine::MutationEngine;
use crate::error::Error;
use crate::store::{DocumentStore, GithubStore};

/// Build the mutation engine. A missing GitHub token leaves the engine
/// without a store instead of stopping the process.
pub fn build_engine(config: &Config) -> Result<MutationEngine, Error> {
    let store: Option<Arc<dyn DocumentStore>> = match GithubStore::from_config(&config.github)? {
        Some(store) => Some(Arc::new(store)),
        None => {
            error!("GitHub token not loaded (GITHUB_PAT); the bot will not be able to publish");
            None
        }
    };
    Ok(MutationEngine::new(store, &config.github))
}
