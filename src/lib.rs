//! Spotify Playlist Maker Library
//!
//! This library implements a small web service: a browser user signs in with
//! Spotify through the OAuth2 authorization-code flow, submits a list of
//! (song, artist) pairs and gets back a new private playlist built from the best
//! matching tracks.
//!
//! # Modules
//!
//! - `api` - HTTP route handlers
//! - `config` - Configuration management and environment variables
//! - `error` - Error type shared by every component and its HTTP mapping
//! - `server` - Router construction and the HTTP server
//! - `session` - Signed-cookie browser sessions and their store
//! - `spotify` - Spotify accounts service and Web API clients
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use playlist_maker::{config, server, session::MemoryStore, spotify::SpotifyClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     let spotify = Arc::new(SpotifyClient::new(&config)?);
//!     let state = server::AppState::new(config, spotify, Arc::new(MemoryStore::new()));
//!     server::start_api_server(Arc::new(state)).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;
