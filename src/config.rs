// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Read once at startup and shared immutably through `AppState`.

use ring::rand::{SecureRandom, SystemRandom};
use std::env;

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/auth/strava/callback";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_STRAVA_API_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_STRAVA_OAUTH_URL: &str = "https://www.strava.com/oauth";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_ACTIVITY_PAGES: u32 = 50;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public). Login is refused while unset.
    pub strava_client_id: Option<String>,
    /// Strava OAuth client secret.
    pub strava_client_secret: Option<String>,
    /// Callback URL registered with Strava; must match exactly.
    pub redirect_uri: String,
    /// Frontend URL for OAuth redirects and CORS.
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Base URL of the Strava REST API.
    pub strava_api_url: String,
    /// Base URL of the Strava OAuth endpoints.
    pub strava_oauth_url: String,
    /// Upper bound on pages fetched by a full activity-history scan.
    pub max_activity_pages: u32,
    /// HMAC key for signing the OAuth `state` parameter.
    pub oauth_state_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: Some("test_client_id".to_string()),
            strava_client_secret: Some("test_secret".to_string()),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            port: DEFAULT_PORT,
            strava_api_url: DEFAULT_STRAVA_API_URL.to_string(),
            strava_oauth_url: DEFAULT_STRAVA_OAUTH_URL.to_string(),
            max_activity_pages: DEFAULT_MAX_ACTIVITY_PAGES,
            oauth_state_key: b"test_oauth_state_key".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let strava_client_id = non_empty_var("STRAVA_CLIENT_ID");
        let strava_client_secret =
            non_empty_var("STRAVA_CLIENT_SECRET").map(|v| v.trim().to_string());

        if strava_client_id.is_none() || strava_client_secret.is_none() {
            tracing::warn!(
                "STRAVA_CLIENT_ID or STRAVA_CLIENT_SECRET not set, OAuth login disabled"
            );
        }

        let oauth_state_key = match non_empty_var("OAUTH_STATE_KEY") {
            Some(key) => key.into_bytes(),
            None => match &strava_client_secret {
                Some(secret) => secret.clone().into_bytes(),
                None => random_key()?,
            },
        };

        let max_activity_pages = parse_var("MAX_ACTIVITY_PAGES", DEFAULT_MAX_ACTIVITY_PAGES)?;
        if max_activity_pages == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_ACTIVITY_PAGES",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            strava_client_id,
            strava_client_secret,
            redirect_uri: env::var("STRAVA_REDIRECT_URI")
                .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            port: parse_var("PORT", DEFAULT_PORT)?,
            strava_api_url: env::var("STRAVA_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_STRAVA_API_URL.to_string()),
            strava_oauth_url: env::var("STRAVA_OAUTH_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_STRAVA_OAUTH_URL.to_string()),
            max_activity_pages,
            oauth_state_key,
        })
    }

    /// Client credentials, if both are configured.
    pub fn strava_credentials(&self) -> Option<(&str, &str)> {
        match (&self.strava_client_id, &self.strava_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

/// Per-process signing key, used when nothing stable is configured.
fn random_key() -> Result<Vec<u8>, ConfigError> {
    let mut key = vec![0u8; 32];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| ConfigError::Random)?;
    Ok(key)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Failed to generate OAuth state key")]
    Random,
}
