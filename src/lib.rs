// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava Route Explorer: a thin backend in front of the Strava API
//!
//! This crate provides the OAuth flow and authenticated proxy routes used by
//! the route-explorer frontend, including decoding activity polylines into
//! coordinate lists.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::StravaClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let strava = StravaClient::new(&config);
        Self { config, strava }
    }
}
