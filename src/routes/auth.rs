// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authentication routes.
//!
//! The access token is handed straight back to the frontend; nothing is stored.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::AccessToken;
use crate::services::oauth_state::{issue_state, verify_state};
use crate::AppState;

const STRAVA_AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";

/// Scopes requested at login; `activity:read_all` includes private activities.
const OAUTH_SCOPE: &str = "read,activity:read_all";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava/login", get(auth_login))
        .route("/auth/strava/callback", get(auth_callback))
        .route("/auth/strava/revoke", post(auth_revoke))
}

/// Start OAuth flow - redirect to Strava authorization.
async fn auth_login(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let (client_id, _) = state
        .config
        .strava_credentials()
        .ok_or(AppError::MissingCredentials)?;

    let oauth_state = issue_state(&state.config.oauth_state_key, chrono::Utc::now());

    let auth_url = format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&approval_prompt=auto&state={}",
        STRAVA_AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(&state.config.redirect_uri),
        urlencoding::encode(OAUTH_SCOPE),
        oauth_state
    );

    tracing::info!(
        client_id = %client_id,
        redirect_uri = %state.config.redirect_uri,
        "Starting OAuth flow, redirecting to Strava"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange the code and hand the token to the frontend.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let frontend_url = state.config.frontend_url.trim_end_matches('/');

    // User denied access on Strava's consent screen
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        let redirect = format!("{}/?error={}", frontend_url, urlencoding::encode(&error));
        return Ok(Redirect::temporary(&redirect));
    }

    if let Some(oauth_state) = params.state.as_deref() {
        verify_state(oauth_state, &state.config.oauth_state_key, chrono::Utc::now())
            .map_err(|e| AppError::BadRequest(format!("Invalid OAuth state: {}", e)))?;
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("code query parameter is required".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");

    let tokens = state
        .strava
        .exchange_code(&code)
        .await
        .map_err(AppError::upstream("failed_to_exchange_token"))?;

    if let Some(athlete) = &tokens.athlete {
        tracing::info!(
            athlete_id = athlete.id,
            firstname = athlete.firstname.as_deref().unwrap_or(""),
            "OAuth successful"
        );
    }

    let redirect_url = format!(
        "{}/?token={}",
        frontend_url,
        urlencoding::encode(&tokens.access_token)
    );

    Ok(Redirect::temporary(&redirect_url))
}

#[derive(Serialize)]
pub struct RevokeResponse {
    pub status: &'static str,
}

/// Revoke the app's access for the token's athlete.
async fn auth_revoke(
    State(state): State<Arc<AppState>>,
    token: AccessToken,
) -> Result<Json<RevokeResponse>> {
    state
        .strava
        .deauthorize(token.as_str())
        .await
        .map_err(AppError::upstream("failed to revoke token"))?;

    Ok(Json(RevokeResponse { status: "revoked" }))
}
