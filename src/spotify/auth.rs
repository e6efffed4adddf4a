use chrono::Utc;
use reqwest::Client;
use url::Url;

use crate::{
    config::{Config, SPOTIFY_SCOPE},
    error::{AppError, Result},
    types::TokenBundle,
    utils,
};

/// Client for Spotify's accounts service (authorize + token endpoints).
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    auth_url: Url,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl AuthClient {
    pub fn new(http: Client, config: &Config) -> Self {
        AuthClient {
            http,
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    /// Builds the URL the browser is redirected to in order to grant access.
    ///
    /// The URL asks for an authorization code (`response_type=code`) with the
    /// `playlist-modify-private` scope. `state` is echoed back by Spotify on the
    /// callback and must be checked against the value stored in the session.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let url = auth_client.authorization_url("x8Yq...");
    /// // https://accounts.spotify.com/authorize?response_type=code&client_id=...
    /// ```
    pub fn authorization_url(&self, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", SPOTIFY_SCOPE)
            .append_pair("state", state);
        url.into()
    }

    /// Exchanges an authorization code for a token bundle.
    ///
    /// Posts `grant_type=authorization_code` together with the code, the redirect
    /// URI and the client credentials to the token endpoint.
    ///
    /// # Errors
    ///
    /// Every failure maps to [`AppError::AuthExchange`]:
    /// - transport errors and timeouts
    /// - a non-2xx status (invalid or already used code, bad credentials)
    /// - a body that doesn't parse as a token response
    pub async fn exchange_code(&self, code: &str) -> Result<TokenBundle> {
        let res = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthExchange(format!("token request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| AppError::AuthExchange(format!("cannot read token response: {e}")))?;

        if !status.is_success() {
            tracing::error!(
                "Token exchange failed: {} {}",
                status,
                utils::truncate_body(&body, 512)
            );
            return Err(AppError::AuthExchange(format!(
                "token endpoint returned {status}"
            )));
        }

        let mut token: TokenBundle = serde_json::from_str(&body)
            .map_err(|e| AppError::AuthExchange(format!("malformed token response: {e}")))?;
        token.obtained_at = Utc::now().timestamp();

        Ok(token)
    }
}
