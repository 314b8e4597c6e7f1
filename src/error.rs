// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::strava::StravaError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::QueryRejection;
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("token query parameter is required")]
    MissingToken,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("STRAVA_CLIENT_ID or STRAVA_CLIENT_SECRET not set")]
    MissingCredentials,

    /// A Strava call failed; `error` names what this service was doing.
    #[error("{error}: {source}")]
    Upstream {
        error: &'static str,
        #[source]
        source: StravaError,
    },
}

impl AppError {
    /// Adapter for `map_err` that tags a Strava failure with a description.
    pub fn upstream(error: &'static str) -> impl FnOnce(StravaError) -> AppError {
        move |source| AppError::Upstream { error, source }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream { source, .. } => match source {
                StravaError::Status { status, .. } => *status,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let (error, detail) = match self {
            AppError::MissingToken | AppError::MissingCredentials => (message, None),
            AppError::BadRequest(msg) => ("bad_request".to_string(), Some(msg)),
            AppError::Upstream { error, source } => {
                tracing::warn!(status = %status, error, "Strava request failed");
                let detail = match source {
                    StravaError::Status { body, .. } => body,
                    other => other.to_string(),
                };
                (error.to_string(), Some(detail))
            }
        };

        (status, Json(ErrorResponse { error, detail })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
