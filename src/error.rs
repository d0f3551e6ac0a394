//! Error types for the MasterStudio bot.

use thiserror::Error;

/// Bot error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid command: {0}")]
    Validation(String),

    #[error("Discord error: {0}")]
    Discord(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Document store is not available (GITHUB_PAT not configured)")]
    StoreUnavailable,

    #[error("{path} is not a valid JSON array of objects: {source}")]
    MalformedDocument {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} changed since it was read; run the command again")]
    ConcurrentModification { path: String },

    #[error("No post titled '{title}'")]
    NotFound { title: String },
}

/// Outcome categories reported back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StoreUnavailable,
    MalformedDocument,
    ConcurrentModification,
    NotFound,
    Validation,
    Other,
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::StoreUnavailable => ErrorKind::StoreUnavailable,
            Error::MalformedDocument { .. } => ErrorKind::MalformedDocument,
            Error::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::StoreUnavailable.kind(), ErrorKind::StoreUnavailable);
        assert_eq!(
            Error::NotFound {
                title: "x".to_string()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::Store("boom".to_string()).kind(),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_malformed_message_names_path() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::MalformedDocument {
            path: "posts.json".to_string(),
            source,
        };
        assert!(err
            .to_string()
            .starts_with("posts.json is not a valid JSON array of objects"));
    }

    #[test]
    fn test_malformed_message_covers_shape_errors() {
        let source = serde_json::from_str::<Vec<serde_json::Map<String, serde_json::Value>>>("{}")
            .unwrap_err();
        let err = Error::MalformedDocument {
            path: "posts.json".to_string(),
            source,
        };
        let message = err.to_string();
        assert!(message.starts_with("posts.json is not a valid JSON array of objects: "));
        assert!(message.contains("expected a sequence"), "{message}");
    }
}
