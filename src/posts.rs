//! Post records and the `posts.json` document format.
//!
//! The published site reads Spanish keys, so the persisted names differ from
//! the Rust field names. Stored records are kept as plain JSON objects: the
//! only requirement on the document is that it is an array of objects, and
//! records are written back exactly as they were read.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "dificultad")]
    DifficultyChange,
    #[serde(rename = "mobs")]
    NewMobs,
    #[serde(rename = "eventos")]
    Events,
    #[serde(rename = "actualizaciones")]
    Updates,
    #[serde(rename = "recompensas")]
    Rewards,
    #[serde(rename = "castigos")]
    Punishments,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::DifficultyChange,
        Category::NewMobs,
        Category::Events,
        Category::Updates,
        Category::Rewards,
        Category::Punishments,
    ];

    /// Value stored in the document and sent by the command choice.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::DifficultyChange => "dificultad",
            Category::NewMobs => "mobs",
            Category::Events => "eventos",
            Category::Updates => "actualizaciones",
            Category::Rewards => "recompensas",
            Category::Punishments => "castigos",
        }
    }

    /// Label shown in the command picker.
    pub fn label(self) -> &'static str {
        match self {
            Category::DifficultyChange => "Cambio de dificultad",
            Category::NewMobs => "Mobs nuevos",
            Category::Events => "Eventos",
            Category::Updates => "Actualizaciones",
            Category::Rewards => "Recompensas",
            Category::Punishments => "Castigos",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown category '{}'", s)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored record, as read from the document.
pub type Record = Map<String, Value>;

/// Key the delete command matches on.
pub const TITLE_KEY: &str = "titulo";

/// A post created by the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Position-derived display id; not a key.
    pub id: u64,
    #[serde(rename = "categoria")]
    pub category: Category,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "imagenUrl")]
    pub image_url: String,
    #[serde(rename = "esNuevo")]
    pub is_new: bool,
}

/// Fields supplied by the user for a new post.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub is_new: bool,
}

impl Post {
    pub fn from_new(new: NewPost, id: u64, date: NaiveDate) -> Self {
        Self {
            id,
            category: new.category,
            title: new.title,
            description: new.description,
            date,
            image_url: new.image_url,
            is_new: new.is_new,
        }
    }

    /// The post as a stored record, keys in declaration order.
    pub fn to_record(&self) -> Result<Record, Error> {
        match serde_json::to_value(self)? {
            Value::Object(record) => Ok(record),
            other => Err(Error::Store(format!(
                "post serialized to {} instead of an object",
                other
            ))),
        }
    }
}

/// Title of a stored record, if it has a string one.
pub fn title_of(record: &Record) -> Option<&str> {
    record.get(TITLE_KEY).and_then(Value::as_str)
}

/// Parse the document at `path`, newest first.
///
/// Fails with [`Error::MalformedDocument`] when the text is not JSON or not
/// an array of objects. The objects themselves are not checked.
pub fn parse_document(path: &str, content: &str) -> Result<Vec<Record>, Error> {
    serde_json::from_str(content).map_err(|source| Error::MalformedDocument {
        path: path.to_string(),
        source,
    })
}

/// Serialize records with four-space indentation and non-ASCII left as is.
pub fn render_document(records: &[Record]) -> Result<String, Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| Error::Store(e.to_string()))
}
