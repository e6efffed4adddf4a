#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;

use playlist_maker::{
    config::Config,
    error::{AppError, Result},
    server::{self, AppState},
    session::{MemoryStore, SessionKey, SessionStore},
    spotify::{AuthClient, SpotifyApi},
    types::{Playlist, SessionData, TokenBundle, TrackMatch, UserProfile},
    utils,
};

pub const SESSION_SECRET: &str = "0123456789abcdef0123456789abcdef-test";

pub fn test_config_with(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("CLIENT_ID", "client-123"),
        ("CLIENT_SECRET", "secret-456"),
        ("REDIRECT_URI", "http://127.0.0.1:5000/callback"),
        ("SESSION_SECRET", SESSION_SECRET),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn test_config() -> Config {
    test_config_with(&[])
}

pub fn fixed_token() -> TokenBundle {
    TokenBundle {
        access_token: "access-abc".to_string(),
        refresh_token: Some("refresh-def".to_string()),
        expires_in: 3600,
        token_type: "Bearer".to_string(),
        scope: Some("playlist-modify-private".to_string()),
        obtained_at: 1_700_000_000,
    }
}

/// In-memory stand-in for Spotify that records what it was asked to do.
pub struct StubSpotify {
    auth: AuthClient,
    pub token: Option<TokenBundle>,
    pub profile_error: Option<StatusCode>,
    pub create_error: Option<StatusCode>,
    pub add_error: Option<StatusCode>,
    /// query -> track uri
    pub catalog: HashMap<String, String>,
    pub failing_queries: HashSet<String>,
    /// query -> artificial latency
    pub delays: HashMap<String, Duration>,
    pub exchanged_codes: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<String>>,
    pub created: Mutex<Vec<(String, String)>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
}

impl StubSpotify {
    pub fn new() -> Self {
        StubSpotify {
            auth: AuthClient::new(reqwest::Client::new(), &test_config()),
            token: Some(fixed_token()),
            profile_error: None,
            create_error: None,
            add_error: None,
            catalog: HashMap::new(),
            failing_queries: HashSet::new(),
            delays: HashMap::new(),
            exchanged_codes: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
        }
    }

    pub fn with_track(mut self, query: &str, uri: &str) -> Self {
        self.catalog.insert(query.to_string(), uri.to_string());
        self
    }

    pub fn add_calls(&self) -> Vec<(String, Vec<String>)> {
        self.added.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpotifyApi for StubSpotify {
    fn authorization_url(&self, state: &str) -> String {
        self.auth.authorization_url(state)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenBundle> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        self.token
            .clone()
            .ok_or_else(|| AppError::AuthExchange("token endpoint returned 400".to_string()))
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<UserProfile> {
        if let Some(status) = self.profile_error {
            return Err(AppError::Upstream {
                status,
                body: "The access token expired".to_string(),
            });
        }
        Ok(serde_json::from_value(serde_json::json!({
            "id": "user-1",
            "display_name": "Test User",
            "country": "SE"
        }))
        .unwrap())
    }

    async fn create_playlist(
        &self,
        _access_token: &str,
        owner_id: &str,
        name: &str,
    ) -> Result<Playlist> {
        if let Some(status) = self.create_error {
            return Err(AppError::PlaylistCreate { status });
        }
        self.created
            .lock()
            .unwrap()
            .push((owner_id.to_string(), name.to_string()));
        Ok(Playlist {
            id: "pl-1".to_string(),
            url: utils::playlist_url("pl-1"),
        })
    }

    async fn search_track(&self, _access_token: &str, query: &str) -> Result<Option<TrackMatch>> {
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        self.searches.lock().unwrap().push(query.to_string());
        if self.failing_queries.contains(query) {
            return Err(AppError::Upstream {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            });
        }
        Ok(self
            .catalog
            .get(query)
            .map(|uri| TrackMatch { uri: uri.clone() }))
    }

    async fn add_tracks(&self, _access_token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        if let Some(status) = self.add_error {
            return Err(AppError::TrackAdd { status });
        }
        self.added
            .lock()
            .unwrap()
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub spotify: Arc<StubSpotify>,
}

pub fn test_app(spotify: StubSpotify) -> TestApp {
    test_app_with_store(spotify, MemoryStore::new())
}

pub fn test_app_with_store(spotify: StubSpotify, store: MemoryStore) -> TestApp {
    let spotify = Arc::new(spotify);
    let store = Arc::new(store);
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::clone(&spotify) as Arc<dyn SpotifyApi>,
        Arc::clone(&store) as Arc<dyn SessionStore>,
    ));

    TestApp {
        router: server::router(Arc::clone(&state)),
        state,
        store,
        spotify,
    }
}

impl TestApp {
    /// Stores a session holding `token` and returns the matching `Cookie` header value.
    pub async fn authenticated_cookie(&self, token: TokenBundle) -> String {
        let id = "authenticated-session";
        self.store
            .set(
                id,
                SessionData {
                    token_info: Some(token),
                    oauth_state: None,
                },
            )
            .await
            .unwrap();
        format!(
            "{}={}",
            self.state.config.cookie_name,
            SessionKey::new(SESSION_SECRET).sign(id)
        )
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` part of the response's `Set-Cookie` header.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
