// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes proxying Strava for the frontend.
//!
//! Every route takes the caller's Strava access token (see [`AccessToken`]).

use crate::error::{AppError, Result};
use crate::middleware::AccessToken;
use crate::models::{ActivityLine, ActivitySummary};
use crate::services::activity_lines::RECENT_ACTIVITIES;
use crate::services::ActivityLineAggregator;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::{Query, WithRejection};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(get_me))
        .route("/activities", get(get_activities))
        .route("/activity_lines", get(get_activity_lines))
}

// ─── User Profile ────────────────────────────────────────────

/// Get the athlete profile straight from Strava.
async fn get_me(
    State(state): State<Arc<AppState>>,
    token: AccessToken,
) -> Result<Json<serde_json::Value>> {
    let profile = state
        .strava
        .get_athlete(token.as_str())
        .await
        .map_err(AppError::upstream("failed to fetch profile"))?;

    Ok(Json(profile))
}

// ─── Activities ──────────────────────────────────────────────

/// Most recent activities, trimmed to the fields the frontend shows.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    token: AccessToken,
) -> Result<Json<Vec<ActivitySummary>>> {
    let activities = state
        .strava
        .list_activities(token.as_str(), None, RECENT_ACTIVITIES)
        .await
        .map_err(AppError::upstream("failed to fetch activities"))?;

    tracing::debug!(count = activities.len(), "Fetched recent activities");

    Ok(Json(
        activities.into_iter().map(ActivitySummary::from).collect(),
    ))
}

// ─── Activity Lines ──────────────────────────────────────────

#[derive(Deserialize)]
struct ActivityLinesQuery {
    /// Activity ids to include, as repeated `ids=` parameters
    #[serde(default)]
    ids: Vec<u64>,
}

/// Decoded routes for the requested activities (or the recent ones).
async fn get_activity_lines(
    State(state): State<Arc<AppState>>,
    token: AccessToken,
    WithRejection(Query(params), _): WithRejection<Query<ActivityLinesQuery>, AppError>,
) -> Result<Json<Vec<ActivityLine>>> {
    let report = ActivityLineAggregator::new(&state.strava, state.config.max_activity_pages)
        .aggregate(token.as_str(), &params.ids)
        .await?;

    Ok(Json(report.lines))
}
