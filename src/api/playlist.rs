use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    error::{AppError, Result},
    server::AppState,
    session::Session,
    types::{CreatePlaylistBody, DEFAULT_PLAYLIST_NAME},
};

pub async fn create_playlist(
    State(state): State<Arc<AppState>>,
    session: Session,
    body: std::result::Result<Json<CreatePlaylistBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    // Authentication is checked before the body so an anonymous caller always gets 401.
    let token = session.token().ok_or(AppError::Unauthorized)?;
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let name = match body.playlist_name.trim() {
        "" => DEFAULT_PLAYLIST_NAME,
        name => name,
    };

    let playlist = state
        .playlists
        .build_playlist(&token.access_token, &body.songs, name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "playlistUrl": playlist.url })),
    ))
}
