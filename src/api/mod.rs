//! # API Module
//!
//! HTTP endpoints of the playlist maker. The handlers are thin: they resolve the
//! browser [`Session`](crate::session::Session), call into the Spotify layer and
//! translate the outcome into a response.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - `GET /`: resets the session and redirects to Spotify's
//!   authorization page.
//! - [`callback`] - `GET /callback`: completes the authorization-code flow and
//!   stores the token bundle in the session. Failures are never turned into a
//!   silent redirect; they surface as error responses.
//! - [`is_authenticated`] - `GET /is_authenticated`: re-checks the stored token
//!   against Spotify on every call.
//! - [`logout`] - `GET /logout`: drops the session.
//!
//! ### Playlists
//!
//! - [`create_playlist`] - `POST /create_playlist`: resolves the submitted songs
//!   and creates a private playlist from the matches.
//!
//! ### UI and monitoring
//!
//! - [`index`] - `GET /index`: the single page app.
//! - [`health`] - `GET /health`: status and version for load balancers.
//!
//! ## Error responses
//!
//! Handlers return [`crate::error::Result`]; errors render as `{"error": ...}`
//! with the status described on [`crate::error::AppError`].

mod auth;
mod health;
mod index;
mod playlist;

pub use auth::{callback, is_authenticated, login, logout};
pub use health::health;
pub use index::index;
pub use playlist::create_playlist;
