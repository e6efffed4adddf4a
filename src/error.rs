use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    AuthExchange(String),

    #[error("Spotify API error {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Failed to create playlist")]
    PlaylistCreate { status: StatusCode },

    #[error("Failed to add tracks to playlist")]
    TrackAdd { status: StatusCode },

    #[error("{0}")]
    Validation(String),

    #[error("User not authenticated")]
    Unauthorized,

    #[error("Session error: {0}")]
    Session(String),
}

impl AppError {
    /// Maps a transport-level failure (no usable response) to an upstream error.
    /// Timeouts report 504, everything else 502.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let status = if err.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            err.status().unwrap_or(StatusCode::BAD_GATEWAY)
        };

        AppError::Upstream {
            status,
            body: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthExchange(_) | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream { status, .. } => error_status_or_bad_gateway(*status),
            AppError::PlaylistCreate { status } | AppError::TrackAdd { status } => {
                error_status_or_bad_gateway(*status)
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

// An upstream "success" status that still violated the contract (e.g. 200
// where 201 was expected) is reported as a gateway failure.
fn error_status_or_bad_gateway(status: StatusCode) -> StatusCode {
    if status.is_client_error() || status.is_server_error() {
        status
    } else {
        StatusCode::BAD_GATEWAY
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Session(ref e) => {
                tracing::error!("Session store error: {}", e);
                "Session error".to_string()
            }
            ref other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
