//! Discord REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, error};

use super::types::{
    ApplicationCommand, EditMessage, Interaction, InteractionResponse, RegisteredCommand,
};
use crate::router::Responder;
use crate::Error;

/// Default API root.
const API_BASE: &str = "https://discord.com/api/v10";

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/masterstudio-oficial/MasterStudio, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// REST client for one application.
#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: String,
    bot_token: String,
    application_id: String,
}

impl DiscordClient {
    pub fn new(bot_token: String, application_id: String) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_base: API_BASE.to_string(),
            bot_token,
            application_id,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the guild's commands with `commands`.
    ///
    /// Commands missing from the list are removed, so stale commands from
    /// earlier versions disappear in the same call.
    pub async fn register_guild_commands(
        &self,
        guild_id: u64,
        commands: &[ApplicationCommand],
    ) -> Result<Vec<RegisteredCommand>, Error> {
        let url = format!(
            "{}/applications/{}/guilds/{}/commands",
            self.api_base, self.application_id, guild_id
        );
        debug!(url = %url, count = commands.len(), "Registering guild commands");

        let response = self
            .http
            .put(&url)
            .header(header::AUTHORIZATION, format!("Bot {}", self.bot_token))
            .json(commands)
            .send()
            .await?;
        let response = check("register commands", response).await?;
        Ok(response.json().await?)
    }

    /// Send the initial response to an interaction.
    pub async fn create_response(
        &self,
        interaction_id: &str,
        token: &str,
        body: &InteractionResponse,
    ) -> Result<(), Error> {
        let url = format!(
            "{}/interactions/{}/{}/callback",
            self.api_base, interaction_id, token
        );
        let response = self.http.post(&url).json(body).send().await?;
        check("interaction callback", response).await?;
        Ok(())
    }

    /// Edit the initial response of an interaction.
    pub async fn edit_original_response(
        &self,
        application_id: &str,
        token: &str,
        content: &str,
    ) -> Result<(), Error> {
        let url = format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.api_base, application_id, token
        );
        let response = self
            .http
            .patch(&url)
            .json(&EditMessage { content })
            .send()
            .await?;
        check("edit original response", response).await?;
        Ok(())
    }

    /// Responder bound to one interaction.
    pub fn responder(&self, interaction: &Interaction) -> InteractionResponder {
        InteractionResponder {
            client: self.clone(),
            interaction_id: interaction.id.clone(),
            application_id: interaction.application_id.clone(),
            token: interaction.token.clone(),
        }
    }
}

async fn check(action: &str, response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!(%status, body = %body, "Discord {} failed", action);
    Err(Error::Discord(format!("{} returned {}: {}", action, status, body)))
}

/// Replies to a single interaction with ephemeral messages.
pub struct InteractionResponder {
    client: DiscordClient,
    interaction_id: String,
    application_id: String,
    token: String,
}

#[async_trait]
impl Responder for InteractionResponder {
    async fn acknowledge(&self, content: &str) -> Result<(), Error> {
        self.client
            .create_response(
                &self.interaction_id,
                &self.token,
                &InteractionResponse::ephemeral(content),
            )
            .await
    }

    async fn edit_original(&self, content: &str) -> Result<(), Error> {
        self.client
            .edit_original_response(&self.application_id, &self.token, content)
            .await
    }
}
