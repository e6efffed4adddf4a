use reqwest::{Client, StatusCode};

use crate::{
    error::{AppError, Result},
    types::UserProfile,
    utils,
};

#[derive(Debug, Clone)]
pub struct UserClient {
    http: Client,
    api_url: String,
}

impl UserClient {
    pub fn new(http: Client, api_url: String) -> Self {
        UserClient { http, api_url }
    }

    /// Retrieves the profile of the user the access token belongs to.
    ///
    /// Calls `GET /me`. The profile is fetched live on every call; nothing is
    /// cached so a revoked or expired token shows up immediately.
    ///
    /// # Errors
    ///
    /// - [`AppError::Upstream`] carrying status and body when Spotify answers
    ///   with anything but 200 (logged before it is returned)
    /// - [`AppError::Upstream`] with 504/502 on timeout or transport failure
    pub async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile> {
        let res = self
            .http
            .get(format!("{}/me", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::from_transport(&e))?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(
                "Failed to fetch user info: {} {}",
                status,
                utils::truncate_body(&body, 512)
            );
            return Err(AppError::Upstream {
                status,
                body: utils::truncate_body(&body, 512),
            });
        }

        res.json::<UserProfile>()
            .await
            .map_err(|e| AppError::from_transport(&e))
    }
}
