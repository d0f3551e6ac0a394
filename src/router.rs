//! Command router.
//!
//! Validates an invocation, sends the provisional acknowledgment, then runs
//! the mutation on a worker task and replaces the acknowledgment with the
//! outcome. Each accepted invocation produces exactly one acknowledgment and
//! one edit; a rejected one produces a single rejection message.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::engine::{Actor, MutationEngine};
use crate::error::{Error, ErrorKind};
use crate::posts::{NewPost, Post};

/// Command names as registered on the chat platform.
pub const CREATE_POST: &str = "post";
pub const DELETE_POST: &str = "deletepost";

/// Option names.
pub const OPT_CATEGORY: &str = "categoria";
pub const OPT_TITLE: &str = "titulo";
pub const OPT_DESCRIPTION: &str = "descripcion";
pub const OPT_IMAGE_URL: &str = "url_imagen";
pub const OPT_IS_NEW: &str = "es_nuevo";

/// Reply channel for one invocation.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Send the first, provisional message.
    async fn acknowledge(&self, content: &str) -> Result<(), Error>;

    /// Replace the provisional message.
    async fn edit_original(&self, content: &str) -> Result<(), Error>;
}

/// A command invocation received from the transport.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub name: String,
    pub args: Map<String, Value>,
    pub actor: Actor,
}

/// A validated command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreatePost(NewPost),
    DeletePost { title: String },
}

fn string_arg(args: &Map<String, Value>, name: &str) -> Result<String, Error> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::validation(format!("missing '{}'", name)))
}

fn title_arg(args: &Map<String, Value>) -> Result<String, Error> {
    let title = string_arg(args, OPT_TITLE)?;
    if title.trim().is_empty() {
        return Err(Error::validation(format!("'{}' must not be empty", OPT_TITLE)));
    }
    Ok(title)
}

impl Command {
    pub fn parse(name: &str, args: &Map<String, Value>) -> Result<Self, Error> {
        match name {
            CREATE_POST => {
                let category = string_arg(args, OPT_CATEGORY)?.parse()?;
                let is_new = match args.get(OPT_IS_NEW) {
                    None | Some(Value::Null) => true,
                    Some(v) => v.as_bool().ok_or_else(|| {
                        Error::validation(format!("'{}' must be a boolean", OPT_IS_NEW))
                    })?,
                };
                Ok(Command::CreatePost(NewPost {
                    category,
                    title: title_arg(args)?,
                    description: string_arg(args, OPT_DESCRIPTION)?,
                    image_url: string_arg(args, OPT_IMAGE_URL)?,
                    is_new,
                }))
            }
            DELETE_POST => Ok(Command::DeletePost {
                title: title_arg(args)?,
            }),
            other => Err(Error::validation(format!("unknown command '{}'", other))),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Command::CreatePost(new) => &new.title,
            Command::DeletePost { title } => title,
        }
    }

    fn acknowledgment(&self) -> String {
        match self {
            Command::CreatePost(_) => {
                "⚙️ Procesando publicación... iniciando conexión con GitHub.".to_string()
            }
            Command::DeletePost { title } => format!(
                "⚙️ Buscando y eliminando el post con título: **'{}'**...",
                title
            ),
        }
    }
}

/// Successful result of a command.
#[derive(Debug)]
pub enum Outcome {
    Created(Post),
    Deleted { title: String, removed: usize },
}

/// Final user-facing message for a command result.
pub fn final_message(command: &Command, result: &Result<Outcome, Error>, path: &str) -> String {
    let is_create = matches!(command, Command::CreatePost(_));
    match result {
        Ok(Outcome::Created(post)) => format!(
            "🚀 ¡Publicación exitosa! **'{}'** ha sido añadida. Verifica tu web.",
            post.title
        ),
        Ok(Outcome::Deleted { title, .. }) => format!(
            "🗑️ ¡Eliminación exitosa! El post **'{}'** ha sido eliminado de la web. Verifica tu página.",
            title
        ),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => "❌ No se pudo eliminar el post. No se encontró ningún post con ese título exacto. (Verifique mayúsculas y minúsculas)".to_string(),
            ErrorKind::MalformedDocument => format!(
                "❌ ¡Error al {}! El archivo {} no es una lista JSON de objetos válida. Arréglalo manualmente a `[]` en GitHub. Error: {}",
                if is_create { "publicar" } else { "eliminar" },
                path,
                e
            ),
            ErrorKind::StoreUnavailable => if is_create {
                "❌ ¡Error al publicar! El repositorio no está accesible.".to_string()
            } else {
                "❌ ¡Error crítico al intentar eliminar! El repositorio no está accesible.".to_string()
            },
            _ => if is_create {
                format!("❌ ¡Error al publicar! No se pudo actualizar el JSON. Error: {}", e)
            } else {
                format!("❌ ¡Error crítico al intentar eliminar! Revisa la consola. Error: {}", e)
            },
        },
    }
}

async fn execute(engine: &MutationEngine, actor: &Actor, command: Command) -> Result<Outcome, Error> {
    match command {
        Command::CreatePost(new) => engine.create(actor, new).await.map(Outcome::Created),
        Command::DeletePost { title } => {
            let removed = engine.delete(actor, &title).await?;
            Ok(Outcome::Deleted { title, removed })
        }
    }
}

fn log_failure(command: &Command, actor: &Actor, e: &Error) {
    match e.kind() {
        ErrorKind::NotFound => info!(title = command.title(), "Delete matched no post"),
        ErrorKind::StoreUnavailable => {
            error!("GitHub token not loaded (GITHUB_PAT); posts cannot be changed")
        }
        ErrorKind::MalformedDocument => error!(
            error = %e,
            "Posts document is not a JSON array of objects; reset it by hand to []"
        ),
        _ => error!(
            error = ?e,
            title = command.title(),
            user = %actor.name,
            "Command failed"
        ),
    }
}

/// Routes command invocations to the mutation engine.
pub struct CommandRouter {
    engine: Arc<MutationEngine>,
}

impl CommandRouter {
    pub fn new(engine: Arc<MutationEngine>) -> Self {
        Self { engine }
    }

    /// Handle one invocation.
    ///
    /// Returns once the acknowledgment (or rejection) has been sent. The
    /// returned handle completes after the final message has been sent; it is
    /// `None` for rejected invocations.
    pub async fn dispatch(
        &self,
        invocation: Invocation,
        responder: Arc<dyn Responder>,
    ) -> Result<Option<JoinHandle<()>>, Error> {
        let command = match Command::parse(&invocation.name, &invocation.args) {
            Ok(command) => command,
            Err(e) => {
                warn!(command = %invocation.name, error = %e, "Rejected command");
                responder
                    .acknowledge(&format!("❌ Comando inválido: {}", e))
                    .await?;
                return Ok(None);
            }
        };

        info!(
            command = %invocation.name,
            title = command.title(),
            user = %invocation.actor.name,
            "Command received"
        );
        responder.acknowledge(&command.acknowledgment()).await?;

        let engine = self.engine.clone();
        let actor = invocation.actor;
        let handle = tokio::spawn(async move {
            let path = engine.path().to_string();
            let worker = {
                let engine = engine.clone();
                let actor = actor.clone();
                let command = command.clone();
                tokio::spawn(async move { execute(&engine, &actor, command).await })
            };
            let result = worker
                .await
                .unwrap_or_else(|e| Err(Error::Worker(e.to_string())));

            if let Err(e) = &result {
                log_failure(&command, &actor, e);
            }

            let message = final_message(&command, &result, &path);
            if let Err(e) = responder.edit_original(&message).await {
                error!(error = %e, "Failed to send final response");
            }
        });

        Ok(Some(handle))
    }
}
