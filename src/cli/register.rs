//! Slash command registration.

use tracing::{error, info, warn};

use crate::config::Config;
use crate::discord::{commands, DiscordClient};
use crate::error::Error;

/// Register the commands in the configured guild (`register` subcommand).
pub async fn run(config: &Config) -> Result<(), Error> {
    let guild_id = config
        .discord
        .guild_id
        .ok_or(Error::MissingConfig("GUILD_ID"))?;
    let client = DiscordClient::new(
        config.bot_token()?.to_string(),
        config.application_id()?.to_string(),
    )?;

    let registered = client
        .register_guild_commands(guild_id, &commands::definitions())
        .await?;
    info!(guild_id, count = registered.len(), "Commands registered");
    Ok(())
}

/// Register at startup. Failures are logged and never stop the bot.
pub async fn sync(client: &DiscordClient, guild_id: Option<u64>) {
    let Some(guild_id) = guild_id else {
        warn!("GUILD_ID not configured; slash commands will not be registered");
        return;
    };

    match client
        .register_guild_commands(guild_id, &commands::definitions())
        .await
    {
        Ok(registered) => {
            let names: Vec<_> = registered.iter().map(|c| c.name.as_str()).collect();
            info!(guild_id, commands = ?names, "Commands synced");
        }
        Err(e) => error!(guild_id, error = %e, "Failed to sync commands"),
    }
}
