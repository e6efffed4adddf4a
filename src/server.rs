use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    api,
    config::Config,
    session::{SessionKey, SessionStore},
    spotify::{PlaylistBuilder, SpotifyApi},
};

/// Shared state handed to every route.
pub struct AppState {
    pub config: Config,
    pub spotify: Arc<dyn SpotifyApi>,
    pub sessions: Arc<dyn SessionStore>,
    pub session_key: SessionKey,
    pub playlists: PlaylistBuilder,
}

impl AppState {
    pub fn new(
        config: Config,
        spotify: Arc<dyn SpotifyApi>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let session_key = SessionKey::new(&config.session_secret);
        let playlists = PlaylistBuilder::new(Arc::clone(&spotify), config.search_concurrency);

        AppState {
            config,
            spotify,
            sessions,
            session_key,
            playlists,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(api::login))
        .route("/callback", get(api::callback))
        .route("/callback/", get(api::callback))
        .route("/is_authenticated", get(api::is_authenticated))
        .route("/create_playlist", post(api::create_playlist))
        .route("/logout", get(api::logout))
        .route("/index", get(api::index))
        .route("/health", get(api::health))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_api_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = SocketAddr::from_str(&state.config.server_address).map_err(|e| {
        anyhow::anyhow!(
            "Failed to parse server address {}: {}",
            state.config.server_address,
            e
        )
    })?;

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
