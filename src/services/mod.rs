// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity_lines;
pub mod oauth_state;
pub mod strava;

pub use activity_lines::{ActivityLineAggregator, LineOutcome, LineReport, SkipReason};
pub use strava::{StravaClient, StravaError};
