//! # Browser sessions
//!
//! A session is server-side state ([`SessionData`]) stored in a [`SessionStore`]
//! under a random id. The browser only holds the id, signed with the
//! `SESSION_SECRET`, in a single cookie.
//!
//! Handlers take a [`Session`] argument; it is resolved from the request cookie
//! and falls back to a fresh, empty session when the cookie is missing, forged or
//! refers to an id the store doesn't know. Whenever a handler changes which id
//! the browser should hold it returns [`Session::cookie`] as part of the
//! response.
//!
//! The user counts as authenticated exactly while a token bundle is stored in
//! the session; no token expiry check is done locally. Sessions themselves
//! expire in the store after `SESSION_TTL_SECS` without use.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponseParts, ResponseParts},
};
use cookie::Cookie;

use crate::{
    error::{AppError, Result},
    server::AppState,
    types::{SessionData, TokenBundle},
    utils,
};

mod cookies;
mod store;

pub use cookies::{SessionKey, read_cookie};
pub use store::{MemoryStore, SessionStore};

const SESSION_ID_LEN: usize = 48;

pub struct Session {
    id: String,
    data: SessionData,
    store: Arc<dyn SessionStore>,
    key: SessionKey,
    cookie_name: String,
    secure: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Resolves the session for a request's headers.
    pub async fn load(state: &AppState, headers: &axum::http::HeaderMap) -> Result<Self> {
        let existing = match cookies::read_cookie(headers, &state.config.cookie_name)
            .and_then(|value| state.session_key.verify(&value))
        {
            Some(id) => state.sessions.get(&id).await?.map(|data| (id, data)),
            None => None,
        };

        let (id, data) = existing.unwrap_or_else(|| (new_session_id(), SessionData::default()));

        Ok(Session {
            id,
            data,
            store: Arc::clone(&state.sessions),
            key: state.session_key.clone(),
            cookie_name: state.config.cookie_name.clone(),
            secure: state.config.secure_cookies(),
        })
    }

    pub fn token(&self) -> Option<&TokenBundle> {
        self.data.token_info.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.token_info.is_some()
    }

    pub fn oauth_state(&self) -> Option<&str> {
        self.data.oauth_state.as_deref()
    }

    pub async fn set_token(&mut self, token: TokenBundle) -> Result<()> {
        self.data.token_info = Some(token);
        self.store.set(&self.id, self.data.clone()).await
    }

    pub async fn set_oauth_state(&mut self, oauth_state: String) -> Result<()> {
        self.data.oauth_state = Some(oauth_state);
        self.store.set(&self.id, self.data.clone()).await
    }

    /// Drops everything stored for this session and switches to a new id.
    pub async fn clear(&mut self) -> Result<()> {
        self.store.clear(&self.id).await?;
        self.id = new_session_id();
        self.data = SessionData::default();
        Ok(())
    }

    /// Cookie pointing the browser at the current session id.
    pub fn cookie(&self) -> SessionCookie {
        SessionCookie(cookies::session_cookie(
            &self.cookie_name,
            self.key.sign(&self.id),
            self.secure,
        ))
    }

    /// Cookie that makes the browser forget the session.
    pub fn removal_cookie(&self) -> SessionCookie {
        SessionCookie(cookies::removal_cookie(&self.cookie_name, self.secure))
    }
}

fn new_session_id() -> String {
    utils::generate_random_string(SESSION_ID_LEN)
}

impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        Session::load(state, &parts.headers).await
    }
}

/// `Set-Cookie` response part.
#[derive(Debug)]
pub struct SessionCookie(Cookie<'static>);

impl SessionCookie {
    pub fn as_cookie(&self) -> &Cookie<'static> {
        &self.0
    }
}

impl IntoResponseParts for SessionCookie {
    type Error = Infallible;

    fn into_response_parts(
        self,
        mut res: ResponseParts,
    ) -> std::result::Result<ResponseParts, Self::Error> {
        match HeaderValue::from_str(&self.0.to_string()) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Cannot encode session cookie: {}", e),
        }
        Ok(res)
    }
}
