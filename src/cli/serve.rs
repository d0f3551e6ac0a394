//! Bot server - registers commands and answers interactions.

use std::sync::Arc;

use tracing::info;

use super::{build_engine, register};
use crate::config::Config;
use crate::discord::{server, AppState, DiscordClient, SignatureVerifier};
use crate::error::Error;
use crate::router::CommandRouter;

/// Run the bot until the process stops.
pub async fn run(config: Config) -> Result<(), Error> {
    // Without a bot token there is nothing to run.
    let bot_token = config.bot_token()?.to_string();
    info!("Starting MasterStudio bot");

    let discord = DiscordClient::new(bot_token, config.application_id()?.to_string())?;
    let verifier = SignatureVerifier::from_hex(config.public_key()?)?;

    let engine = build_engine(&config)?;
    info!(
        repo = %format!("{}/{}", config.github.owner, config.github.repo),
        branch = %config.github.branch,
        path = %config.github.posts_path,
        store_available = engine.is_available(),
        "Posts document"
    );

    register::sync(&discord, config.discord.guild_id).await;

    let state = AppState {
        router: Arc::new(CommandRouter::new(Arc::new(engine))),
        discord,
        verifier: Arc::new(verifier),
    };
    server::serve(&config.server.listen_addr, state).await
}
