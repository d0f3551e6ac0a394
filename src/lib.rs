//! MasterStudio bot library.
//!
//! Discord slash commands that publish and remove posts in a JSON document
//! kept in a GitHub repository.

pub mod cli;
pub mod config;
pub mod discord;
pub mod engine;
pub mod error;
pub mod posts;
pub mod router;
pub mod store;

pub use error::Error;
