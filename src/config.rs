//! Configuration management for the bot.
//!
//! Values come from an optional TOML file and are then overridden by the
//! process environment, which is how the bot is configured when hosted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscordConfig {
    /// Bot token; the process refuses to start without it.
    #[serde(default)]
    pub bot_token: Option<String>,

    #[serde(default)]
    pub application_id: Option<String>,

    /// Hex-encoded Ed25519 key used to verify interaction requests.
    #[serde(default)]
    pub public_key: Option<String>,

    /// Server the commands are registered in. Without it nothing is registered.
    #[serde(default)]
    pub guild_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token. Without it every command fails.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_repo")]
    pub repo: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_posts_path")]
    pub posts_path: String,

    /// Domain for synthesized commit author emails.
    #[serde(default = "default_author_domain")]
    pub author_domain: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: default_owner(),
            repo: default_repo(),
            branch: default_branch(),
            posts_path: default_posts_path(),
            author_domain: default_author_domain(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_owner() -> String {
    "masterstudio-oficial".to_string()
}

fn default_repo() -> String {
    "MasterStudio".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_posts_path() -> String {
    "posts.json".to_string()
}

fn default_author_domain() -> String {
    "masterstudio.com".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    /// Load from `path`, or from the default location if it exists, then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, Error> {
        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Override fields from environment variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("DISCORD_BOT_TOKEN") {
            self.discord.bot_token = Some(v);
        }
        if let Some(v) = var("DISCORD_APPLICATION_ID") {
            self.discord.application_id = Some(v);
        }
        if let Some(v) = var("DISCORD_PUBLIC_KEY") {
            self.discord.public_key = Some(v);
        }
        if let Some(v) = var("GUILD_ID") {
            // A malformed id disables registration rather than startup.
            self.discord.guild_id = v.trim().parse().ok();
        }
        if let Some(v) = var("GITHUB_PAT") {
            self.github.token = Some(v);
        }
        if let Some(v) = var("GITHUB_USER") {
            self.github.owner = v;
        }
        if let Some(v) = var("GITHUB_REPO") {
            self.github.repo = v;
        }
        if let Some(v) = var("GITHUB_BRANCH") {
            self.github.branch = v;
        }
        if let Some(v) = var("POSTS_PATH") {
            self.github.posts_path = v;
        }
        if let Some(v) = var("PORT") {
            self.server.listen_addr = format!("0.0.0.0:{}", v.trim());
        }
    }

    pub fn bot_token(&self) -> Result<&str, Error> {
        self.discord
            .bot_token
            .as_deref()
            .ok_or(Error::MissingConfig("DISCORD_BOT_TOKEN"))
    }

    pub fn application_id(&self) -> Result<&str, Error> {
        self.discord
            .application_id
            .as_deref()
            .ok_or(Error::MissingConfig("DISCORD_APPLICATION_ID"))
    }

    pub fn public_key(&self) -> Result<&str, Error> {
        self.discord
            .public_key
            .as_deref()
            .ok_or(Error::MissingConfig("DISCORD_PUBLIC_KEY"))
    }

    /// Path to global config directory (~/.masterstudio/)
    pub fn global_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".masterstudio")
    }

    /// Path to config file
    pub fn path() -> PathBuf {
        Self::global_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.owner, "masterstudio-oficial");
        assert_eq!(config.github.repo, "MasterStudio");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.github.posts_path, "posts.json");
        assert!(config.github.token.is_none());
        assert!(config.bot_token().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("DISCORD_BOT_TOKEN", "bot"),
            ("GITHUB_PAT", "pat"),
            ("GUILD_ID", "123456789"),
            ("PORT", "5000"),
            ("GITHUB_REPO", ""),
        ]));
        assert_eq!(config.bot_token().unwrap(), "bot");
        assert_eq!(config.github.token.as_deref(), Some("pat"));
        assert_eq!(config.discord.guild_id, Some(123456789));
        assert_eq!(config.server.listen_addr, "0.0.0.0:5000");
        assert_eq!(config.github.repo, "MasterStudio");
    }

    #[test]
    fn test_malformed_guild_id_is_absent() {
        let mut config = Config::default();
        config.discord.guild_id = Some(1);
        config.apply_env(env(&[("GUILD_ID", "not-a-number")]));
        assert!(config.discord.guild_id.is_none());
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[discord]\nguild_id = 42\n\n[github]\nowner = \"someone\"\nposts_path = \"data/posts.json\"\n",
        )
        .unwrap();

        let mut config = Config::from_file(&path).unwrap();
        config.apply_env(env(&[]));
        assert_eq!(config.discord.guild_id, Some(42));
        assert_eq!(config.github.owner, "someone");
        assert_eq!(config.github.posts_path, "data/posts.json");
        assert_eq!(config.github.repo, "MasterStudio");
    }

    #[test]
    fn test_load_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[discord\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(Error::ConfigParse(_))
        ));
    }
}
