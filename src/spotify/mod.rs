//! # Spotify Integration Module
//!
//! This module is the integration layer between the playlist maker and Spotify's
//! accounts service and Web API. Route handlers never talk HTTP to Spotify
//! themselves; they go through the [`SpotifyApi`] trait, which keeps every flow
//! testable with a stub implementation.
//!
//! ## Architecture
//!
//! ```text
//! HTTP routes (api)
//!          ↓
//! SpotifyApi trait  ←  PlaylistBuilder (search → match → create → populate)
//!          ↓
//! SpotifyClient
//!     ├── AuthClient      authorize URL, code exchange
//!     ├── UserClient      GET /me
//!     └── PlaylistClient  create, search, add tracks
//!          ↓
//! reqwest (one shared client, fixed timeout)
//! ```
//!
//! ## API Coverage
//!
//! - `GET  /authorize` (browser redirect only)
//! - `POST /api/token` - authorization code exchange
//! - `GET  /me` - current user profile
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `GET  /search` - track search, first result only
//! - `POST /playlists/{playlist_id}/tracks` - add tracks
//!
//! ## Error Types
//!
//! All calls return [`crate::error::Result`]. Token refresh, rate-limit backoff
//! and search pagination are deliberately not implemented.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::Config,
    error::Result,
    types::{Playlist, TokenBundle, TrackMatch, UserProfile},
};

pub mod auth;
pub mod playlist;
pub mod user;

pub use auth::AuthClient;
pub use playlist::{PlaylistBuilder, PlaylistClient, build_search_query};
pub use user::UserClient;

/// Everything the service needs from Spotify.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    fn authorization_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<TokenBundle>;

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile>;

    async fn create_playlist(&self, access_token: &str, owner_id: &str, name: &str)
    -> Result<Playlist>;

    async fn search_track(&self, access_token: &str, query: &str) -> Result<Option<TrackMatch>>;

    async fn add_tracks(&self, access_token: &str, playlist_id: &str, uris: &[String]) -> Result<()>;
}

/// The real Spotify client, backed by one shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    auth: AuthClient,
    user: UserClient,
    playlist: PlaylistClient,
}

impl SpotifyClient {
    /// Creates the client from the service configuration.
    ///
    /// Every request made through it is bounded by `config.http_timeout`.
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(config: &Config) -> std::result::Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(Duration::from_secs(5).min(config.http_timeout))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(SpotifyClient {
            auth: AuthClient::new(http.clone(), config),
            user: UserClient::new(http.clone(), config.api_url.clone()),
            playlist: PlaylistClient::new(http, config.api_url.clone()),
        })
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    fn authorization_url(&self, state: &str) -> String {
        self.auth.authorization_url(state)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenBundle> {
        self.auth.exchange_code(code).await
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile> {
        self.user.fetch_profile(access_token).await
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
    ) -> Result<Playlist> {
        self.playlist.create_playlist(access_token, owner_id, name).await
    }

    async fn search_track(&self, access_token: &str, query: &str) -> Result<Option<TrackMatch>> {
        self.playlist.search_track(access_token, query).await
    }

    async fn add_tracks(&self, access_token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.playlist.add_tracks(access_token, playlist_id, uris).await
    }
}
