//! Interactions endpoint.
//!
//! Discord POSTs every interaction to `/interactions`. Commands are handed to
//! the router, which sends the acknowledgment through the callback endpoint
//! before this handler returns.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, error, info, warn};

use super::client::DiscordClient;
use super::types::{
    Interaction, InteractionResponse, INTERACTION_APPLICATION_COMMAND, INTERACTION_PING,
};
use super::verify::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::error::Error;
use crate::router::{CommandRouter, Responder};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<CommandRouter>,
    pub discord: DiscordClient,
    pub verifier: Arc<SignatureVerifier>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/interactions", post(interactions))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn interactions(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let (Some(signature), Some(timestamp)) = (
        header(&headers, SIGNATURE_HEADER),
        header(&headers, TIMESTAMP_HEADER),
    ) else {
        return (StatusCode::UNAUTHORIZED, "missing request signature").into_response();
    };
    if !state.verifier.verify(signature, timestamp, &body) {
        warn!("Rejected interaction with invalid signature");
        return (StatusCode::UNAUTHORIZED, "invalid request signature").into_response();
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "Unparseable interaction");
            return (StatusCode::BAD_REQUEST, "invalid interaction").into_response();
        }
    };

    match interaction.kind {
        INTERACTION_PING => {
            debug!("Interaction ping");
            Json(InteractionResponse::pong()).into_response()
        }
        INTERACTION_APPLICATION_COMMAND => {
            let Some(invocation) = interaction.invocation() else {
                return (StatusCode::BAD_REQUEST, "missing command data").into_response();
            };
            let responder: Arc<dyn Responder> = Arc::new(state.discord.responder(&interaction));
            match state.router.dispatch(invocation, responder).await {
                Ok(_) => StatusCode::ACCEPTED.into_response(),
                Err(e) => {
                    error!(error = %e, "Failed to acknowledge interaction");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        other => {
            debug!(kind = other, "Ignoring interaction type");
            (StatusCode::BAD_REQUEST, "unsupported interaction type").into_response()
        }
    }
}

/// Serve the interactions endpoint until the process stops.
pub async fn serve(listen_addr: &str, state: AppState) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening for interactions");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
