//! Discord transport: interactions endpoint, REST client and command
//! definitions.

pub mod client;
pub mod commands;
pub mod server;
pub mod types;
pub mod verify;

pub use client::{DiscordClient, InteractionResponder};
pub use server::AppState;
pub use verify::SignatureVerifier;
