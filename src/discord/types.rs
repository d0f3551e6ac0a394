//! Discord interaction payloads and command definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::Actor;
use crate::router::Invocation;

/// Interaction types.
pub const INTERACTION_PING: u8 = 1;
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

/// Interaction callback types.
pub const CALLBACK_PONG: u8 = 1;
pub const CALLBACK_CHANNEL_MESSAGE: u8 = 4;

/// Message flag: only the invoking user sees the message.
pub const FLAG_EPHEMERAL: u64 = 1 << 6;

/// Application command option types.
pub const OPTION_STRING: u8 = 3;
pub const OPTION_BOOLEAN: u8 = 5;

/// Incoming interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    #[serde(default)]
    pub data: Option<CommandData>,
    /// Present when invoked in a guild.
    #[serde(default)]
    pub member: Option<Member>,
    /// Present when invoked in a DM.
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl Interaction {
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Convert an application command into a router invocation.
    pub fn invocation(&self) -> Option<Invocation> {
        let data = self.data.as_ref()?;
        let user = self.invoker()?;

        let args: Map<String, Value> = data
            .options
            .iter()
            .filter_map(|o| o.value.clone().map(|v| (o.name.clone(), v)))
            .collect();

        Some(Invocation {
            name: data.name.clone(),
            args,
            actor: Actor {
                id: user.id.clone(),
                name: user.username.clone(),
            },
        })
    }
}

/// Interaction callback body.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageData {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: CALLBACK_PONG,
            data: None,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: CALLBACK_CHANNEL_MESSAGE,
            data: Some(MessageData {
                content: content.into(),
                flags: Some(FLAG_EPHEMERAL),
            }),
        }
    }
}

/// Body for editing an existing message.
#[derive(Debug, Clone, Serialize)]
pub struct EditMessage<'a> {
    pub content: &'a str,
}

/// Slash command definition.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationCommand {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOptionDef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandOptionDef {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub name: String,
    pub value: String,
}

/// Registered command as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredCommand {
    pub id: String,
    pub name: String,
}
