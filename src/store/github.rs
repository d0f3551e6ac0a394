//! GitHub repository contents API adapter.
//!
//! The blob `sha` returned by a read is the version token; GitHub rejects a
//! `PUT` whose `sha` is stale with 409 Conflict.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{Commit, DocumentStore, Fetched, VersionToken};
use crate::config::GithubConfig;
use crate::Error;

/// Default API root.
const API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("masterstudio-bot/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommitAuthor<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
    author: CommitAuthor<'a>,
}

/// Store backed by one GitHub repository.
pub struct GithubStore {
    http: Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

impl GithubStore {
    /// Create a store for `owner/repo` authenticated with `token`.
    pub fn new(owner: String, repo: String, token: String) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_base: API_BASE.to_string(),
            owner,
            repo,
            token,
        })
    }

    /// Build from config. `None` when no token is configured.
    pub fn from_config(config: &GithubConfig) -> Result<Option<Self>, Error> {
        match &config.token {
            Some(token) => Ok(Some(Self::new(
                config.owner.clone(),
                config.repo.clone(),
                token.clone(),
            )?)),
            None => Ok(None),
        }
    }

    /// Point the client at another API root (GitHub Enterprise, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
    }
}

/// Read the body of a failed response into a store error.
async fn status_error(action: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!(%status, body = %body, "GitHub {} failed", action);
    Error::Store(format!("GitHub {} returned {}: {}", action, status, body))
}

#[async_trait]
impl DocumentStore for GithubStore {
    async fn fetch(&self, path: &str, reference: &str) -> Result<Fetched, Error> {
        let url = self.contents_url(path);
        debug!(url = %url, reference, "Fetching document");

        let response = self
            .request(reqwest::Method::GET, &url)
            .query(&[("ref", reference)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error("fetch", response).await);
        }

        let body: ContentsResponse = response.json().await?;
        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                return Err(Error::Store(format!(
                    "{} has unsupported encoding '{}'",
                    path, encoding
                )));
            }
        }

        // GitHub wraps the base64 payload at 60 columns.
        let packed: String = body
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(packed)
            .map_err(|e| Error::Store(format!("{} content is not base64: {}", path, e)))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| Error::Store(format!("{} is not UTF-8: {}", path, e)))?;

        debug!(sha = %body.sha, bytes = content.len(), "Fetched document");
        Ok(Fetched {
            content,
            version: VersionToken::new(body.sha),
        })
    }

    async fn commit(&self, commit: Commit<'_>) -> Result<(), Error> {
        let url = self.contents_url(commit.path);
        debug!(url = %url, sha = %commit.version, branch = commit.branch, "Committing document");

        let request = UpdateRequest {
            message: &commit.message,
            content: STANDARD.encode(commit.content.as_bytes()),
            sha: commit.version.as_str(),
            branch: commit.branch,
            author: CommitAuthor {
                name: &commit.author.name,
                email: &commit.author.email,
            },
        };

        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(&request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(Error::ConcurrentModification {
                path: commit.path.to_string(),
            }),
            _ => Err(status_error("commit", response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::store::Author;

    #[derive(Default)]
    struct Repo {
        content: String,
        sha: u32,
        authorized: bool,
        /// Served instead of `content` when set.
        raw: Option<Vec<u8>>,
        /// Reported encoding, `base64` when unset.
        encoding: Option<&'static str>,
        last_put: Option<Value>,
    }

    type Shared = Arc<Mutex<Repo>>;

    async fn get_contents(
        State(repo): State<Shared>,
        headers: HeaderMap,
        Path((_owner, _repo, _path)): Path<(String, String, String)>,
    ) -> Json<Value> {
        let mut repo = repo.lock().unwrap();
        repo.authorized = headers
            .get("authorization")
            .map(|v| v == "Bearer secret")
            .unwrap_or(false);
        // Wrap like GitHub does.
        let bytes = repo.raw.clone().unwrap_or_else(|| repo.content.clone().into_bytes());
        let encoded = STANDARD.encode(bytes);
        let wrapped = encoded
            .as_bytes()
            .chunks(8)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        Json(json!({
            "content": wrapped,
            "sha": repo.sha.to_string(),
            "encoding": repo.encoding.unwrap_or("base64"),
        }))
    }

    async fn put_contents(
        State(repo): State<Shared>,
        Path((_owner, _repo, _path)): Path<(String, String, String)>,
        Json(body): Json<Value>,
    ) -> (axum::http::StatusCode, Json<Value>) {
        let mut repo = repo.lock().unwrap();
        repo.last_put = Some(body.clone());
        if body["sha"] != repo.sha.to_string() {
            return (
                axum::http::StatusCode::CONFLICT,
                Json(json!({ "message": "does not match" })),
            );
        }
        let bytes = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
        repo.content = String::from_utf8(bytes).unwrap();
        repo.sha += 1;
        (axum::http::StatusCode::OK, Json(json!({})))
    }

    async fn serve(repo: Shared) -> String {
        let app = Router::new()
            .route(
                "/repos/:owner/:repo/contents/:path",
                get(get_contents).put(put_contents),
            )
            .with_state(repo);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn store(base: &str) -> GithubStore {
        GithubStore::new("owner".to_string(), "repo".to_string(), "secret".to_string())
            .unwrap()
            .with_api_base(base)
    }

    fn commit<'a>(version: &str, content: &str) -> Commit<'a> {
        Commit {
            path: "posts.json",
            branch: "main",
            message: "Bot: test".to_string(),
            content: content.to_string(),
            version: VersionToken::new(version),
            author: Author {
                name: "ana".to_string(),
                email: "ana@masterstudio.com".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_fetch_decodes_wrapped_content() {
        let repo: Shared = Arc::new(Mutex::new(Repo {
            content: "[{\"titulo\": \"Año nuevo\"}]".to_string(),
            sha: 7,
            ..Default::default()
        }));
        let base = serve(repo.clone()).await;

        let fetched = store(&base).fetch("posts.json", "main").await.unwrap();
        assert_eq!(fetched.content, "[{\"titulo\": \"Año nuevo\"}]");
        assert_eq!(fetched.version.as_str(), "7");
        assert!(repo.lock().unwrap().authorized);
    }

    #[tokio::test]
    async fn test_commit_with_current_sha() {
        let repo: Shared = Arc::new(Mutex::new(Repo {
            content: "[]".to_string(),
            sha: 1,
            ..Default::default()
        }));
        let base = serve(repo.clone()).await;

        store(&base)
            .commit(commit("1", "[\n    {\"titulo\": \"Año\"}\n]"))
            .await
            .unwrap();

        let repo = repo.lock().unwrap();
        assert_eq!(repo.content, "[\n    {\"titulo\": \"Año\"}\n]");
        assert_eq!(repo.sha, 2);
        let body = repo.last_put.as_ref().unwrap();
        assert_eq!(body["message"], "Bot: test");
        assert_eq!(body["branch"], "main");
        assert_eq!(body["sha"], "1");
        assert_eq!(body["author"]["name"], "ana");
        assert_eq!(body["author"]["email"], "ana@masterstudio.com");
        assert_eq!(
            body["content"],
            STANDARD.encode("[\n    {\"titulo\": \"Año\"}\n]")
        );
    }

    #[tokio::test]
    async fn test_commit_with_stale_sha_conflicts() {
        let repo: Shared = Arc::new(Mutex::new(Repo {
            content: "[]".to_string(),
            sha: 2,
            ..Default::default()
        }));
        let base = serve(repo.clone()).await;

        let err = store(&base).commit(commit("1", "[1]")).await.unwrap_err();
        assert!(matches!(err, Error::ConcurrentModification { .. }));
        assert_eq!(repo.lock().unwrap().content, "[]");
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_encoding() {
        let repo: Shared = Arc::new(Mutex::new(Repo {
            content: "[]".to_string(),
            encoding: Some("none"),
            ..Default::default()
        }));
        let base = serve(repo).await;

        let err = store(&base).fetch("posts.json", "main").await.unwrap_err();
        assert!(
            matches!(err, Error::Store(ref msg) if msg.contains("unsupported encoding 'none'")),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_utf8_content() {
        let repo: Shared = Arc::new(Mutex::new(Repo {
            raw: Some(vec![b'[', 0xff, 0xfe, b']']),
            ..Default::default()
        }));
        let base = serve(repo).await;

        let err = store(&base).fetch("posts.json", "main").await.unwrap_err();
        assert!(
            matches!(err, Error::Store(ref msg) if msg.contains("is not UTF-8")),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_store_error() {
        let app = Router::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let err = store(&format!("http://{}", addr))
            .fetch("posts.json", "main")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(ref msg) if msg.contains("404")));
    }
}
