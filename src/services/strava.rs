// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Athlete profile and activity listing
//! - OAuth code exchange
//! - Deauthorization
//!
//! Every call is a single request. There are no retries and no timeouts
//! beyond the reqwest defaults.

use crate::config::Config;
use crate::models::StravaActivity;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Errors from a Strava API call.
#[derive(Debug, thiserror::Error)]
pub enum StravaError {
    /// Strava answered with a non-success status; `body` is kept verbatim.
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Decode(String),
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    oauth_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl StravaClient {
    /// Create a client from the application config.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.strava_api_url.clone(),
            oauth_url: config.strava_oauth_url.clone(),
            client_id: config.strava_client_id.clone(),
            client_secret: config.strava_client_secret.clone(),
        }
    }

    /// Get the authenticated athlete's profile, passed through untouched.
    pub async fn get_athlete(&self, access_token: &str) -> Result<serde_json::Value, StravaError> {
        let url = format!("{}/athlete", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_response_json(response).await
    }

    /// List the athlete's activities, most recent first.
    ///
    /// `page` is omitted from the query when `None`, which Strava treats as page 1.
    pub async fn list_activities(
        &self,
        access_token: &str,
        page: Option<u32>,
        per_page: u32,
    ) -> Result<Vec<StravaActivity>, StravaError> {
        let url = format!("{}/athlete/activities", self.api_url);

        let mut query = vec![("per_page", per_page.to_string())];
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await?;

        check_response_json(response).await
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, StravaError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(&[
                ("client_id", self.client_id.as_deref().unwrap_or_default()),
                (
                    "client_secret",
                    self.client_secret.as_deref().unwrap_or_default(),
                ),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        check_response_json(response).await
    }

    /// Deauthorize the application for a user.
    ///
    /// This invalidates all access and refresh tokens for the user
    /// and removes the app from their Strava settings.
    pub async fn deauthorize(&self, access_token: &str) -> Result<(), StravaError> {
        let response = self
            .http
            .post(format!("{}/deauthorize", self.oauth_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        check_response(response).await?;
        tracing::info!("Strava deauthorization successful");
        Ok(())
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, StravaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!("Strava rate limit hit (429)");
    }

    let body = response.text().await.unwrap_or_default();
    Err(StravaError::Status { status, body })
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StravaError> {
    let response = check_response(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| StravaError::Decode(e.to_string()))
}

/// Token exchange response from Strava OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub athlete: Option<StravaAthlete>,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display_keeps_body() {
        let err = StravaError::Status {
            status: StatusCode::FORBIDDEN,
            body: r#"{"message":"Forbidden"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"HTTP 403 Forbidden: {"message":"Forbidden"}"#);
    }

    #[test]
    fn test_token_exchange_tolerates_missing_athlete() {
        let parsed: TokenExchangeResponse =
            serde_json::from_str(r#"{"access_token": "abc", "token_type": "Bearer"}"#).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert!(parsed.athlete.is_none());
    }
}
