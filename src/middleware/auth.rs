// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava access token extraction.
//!
//! The frontend passes the token it received from the OAuth callback as a
//! `token` query parameter. An `Authorization: Bearer` header is accepted
//! as a fallback.

use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::Query;
use serde::Deserialize;

#[derive(Deserialize)]
struct TokenQuery {
    #[serde(default)]
    token: Option<String>,
}

/// Strava access token supplied by the caller.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<TokenQuery>::from_request_parts(parts, state).await?;

        let token = query
            .token
            .filter(|t| !t.is_empty())
            .or_else(|| bearer_token(parts));

        token.map(AccessToken).ok_or(AppError::MissingToken)
    }
}

/// Token from an `Authorization: Bearer` header, if present and non-empty.
fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
