use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    error::{AppError, Result},
    server::AppState,
    session::{Session, SessionCookie},
    utils,
};

const OAUTH_STATE_LEN: usize = 32;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    mut session: Session,
) -> Result<(SessionCookie, Redirect)> {
    session.clear().await?;

    let oauth_state = utils::generate_random_string(OAUTH_STATE_LEN);
    session.set_oauth_state(oauth_state.clone()).await?;

    let auth_url = state.spotify.authorization_url(&oauth_state);
    Ok((session.cookie(), Redirect::to(&auth_url)))
}

pub async fn callback(
    State(state): State<Arc<AppState>>,
    mut session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<(SessionCookie, Redirect)> {
    if let Some(error) = params.error {
        return Err(AppError::AuthExchange(format!(
            "authorization was denied: {error}"
        )));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::AuthExchange("missing authorization code".to_string()))?;

    let state_matches = matches!(
        (session.oauth_state(), params.state.as_deref()),
        (Some(expected), Some(got)) if expected == got
    );
    if !state_matches {
        tracing::warn!("Rejected OAuth callback with unknown state");
        return Err(AppError::Validation("Invalid OAuth state".to_string()));
    }

    session.clear().await?;

    let token = state.spotify.exchange_code(&code).await?;
    let access_token = token.access_token.clone();
    session.set_token(token).await?;

    match state.spotify.fetch_profile(&access_token).await {
        Ok(user) => {
            tracing::info!("Logged in user ID: {}", user.id);
            tracing::debug!("User info: {:?}", user.display_name);
        }
        Err(e) => {
            session.clear().await?;
            return Err(e);
        }
    }

    Ok((session.cookie(), Redirect::to("/index")))
}

pub async fn is_authenticated(
    State(state): State<Arc<AppState>>,
    session: std::result::Result<Session, AppError>,
) -> Response {
    let session = match session {
        Ok(session) => session,
        Err(e) => return not_authenticated(&e),
    };

    let Some(token) = session.token() else {
        return Json(json!({ "authenticated": false })).into_response();
    };

    match state.spotify.fetch_profile(&token.access_token).await {
        Ok(user) => {
            tracing::debug!("Authenticated user ID: {}", user.id);
            let user_name = user.display_name.unwrap_or(user.id);
            Json(json!({ "authenticated": true, "user_name": user_name })).into_response()
        }
        Err(e) => not_authenticated(&e),
    }
}

fn not_authenticated(e: &AppError) -> Response {
    tracing::error!("Error in /is_authenticated endpoint: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "authenticated": false, "error": e.to_string() })),
    )
        .into_response()
}

pub async fn logout(mut session: Session) -> Result<(SessionCookie, Json<Value>)> {
    session.clear().await?;
    Ok((
        session.removal_cookie(),
        Json(json!({ "message": "Logged out successfully" })),
    ))
}
