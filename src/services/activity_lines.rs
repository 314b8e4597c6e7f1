// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity-line aggregation.
//!
//! Handles the core workflow:
//! 1. Fetch activities from Strava (full history when filtering by id)
//! 2. Filter by the requested ids
//! 3. Decode each summary polyline into `[lat, lng]` pairs
//!
//! Records that cannot produce a line are skipped individually and counted.

use crate::error::{AppError, Result};
use crate::models::{ActivityLine, StravaActivity};
use crate::services::strava::StravaClient;
use std::collections::HashSet;

/// Page size for the full-history scan (Strava's maximum).
pub const SCAN_PAGE_SIZE: u32 = 200;

/// Number of recent activities fetched when no ids are requested.
pub const RECENT_ACTIVITIES: u32 = 30;

/// Polyline precision used by Strava (1e5).
const POLYLINE_PRECISION: u32 = 5;

/// Why a scanned activity produced no line.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Ids were requested and this one is not among them.
    NotRequested,
    /// The activity has no map or no polyline string.
    NoPolyline,
    /// The polyline string failed to decode.
    InvalidPolyline(String),
}

/// Outcome of turning one activity into a line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Decoded(ActivityLine),
    Skipped(SkipReason),
}

/// Lines produced for a request, plus counters for diagnostics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LineReport {
    pub lines: Vec<ActivityLine>,
    pub scanned: usize,
    /// Activity-list requests issued, including a terminating empty page.
    pub pages_fetched: u32,
    pub not_requested: usize,
    pub missing_polyline: usize,
    pub invalid_polyline: usize,
}

impl LineReport {
    fn record(&mut self, outcome: LineOutcome) {
        self.scanned += 1;
        match outcome {
            LineOutcome::Decoded(line) => self.lines.push(line),
            LineOutcome::Skipped(SkipReason::NotRequested) => self.not_requested += 1,
            LineOutcome::Skipped(SkipReason::NoPolyline) => self.missing_polyline += 1,
            LineOutcome::Skipped(SkipReason::InvalidPolyline(_)) => self.invalid_polyline += 1,
        }
    }
}

/// Decode an encoded polyline (Strava format, precision 5) into `[lat, lng]` pairs.
pub fn decode_coords(encoded: &str) -> std::result::Result<Vec<[f64; 2]>, String> {
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION).map_err(|e| e.to_string())?;
    // geo coordinates are (x = lng, y = lat)
    Ok(line.coords().map(|c| [c.y, c.x]).collect())
}

/// Classify a single activity against the requested id set.
///
/// An empty `wanted` set means every activity is requested.
pub fn line_for_activity(activity: &StravaActivity, wanted: &HashSet<u64>) -> LineOutcome {
    if !wanted.is_empty() && !wanted.contains(&activity.id) {
        return LineOutcome::Skipped(SkipReason::NotRequested);
    }

    let Some(encoded) = activity.get_polyline() else {
        return LineOutcome::Skipped(SkipReason::NoPolyline);
    };

    match decode_coords(encoded) {
        Ok(coords) => LineOutcome::Decoded(ActivityLine {
            id: activity.id,
            coords,
        }),
        Err(e) => {
            tracing::debug!(activity_id = activity.id, error = %e, "Skipping undecodable polyline");
            LineOutcome::Skipped(SkipReason::InvalidPolyline(e))
        }
    }
}

/// Build lines for already-fetched activities, preserving scan order.
pub fn extract_lines(activities: &[StravaActivity], wanted: &HashSet<u64>) -> LineReport {
    let mut report = LineReport::default();
    for activity in activities {
        report.record(line_for_activity(activity, wanted));
    }
    report
}

/// Fetches activities and aggregates their decoded routes.
pub struct ActivityLineAggregator<'a> {
    strava: &'a StravaClient,
    max_pages: u32,
}

impl<'a> ActivityLineAggregator<'a> {
    pub fn new(strava: &'a StravaClient, max_pages: u32) -> Self {
        Self { strava, max_pages }
    }

    /// Produce lines for the requested ids, or for the recent activities if none.
    ///
    /// Any upstream failure aborts the whole request.
    pub async fn aggregate(&self, access_token: &str, ids: &[u64]) -> Result<LineReport> {
        let wanted: HashSet<u64> = ids.iter().copied().collect();

        let (activities, pages_fetched) = if wanted.is_empty() {
            let recent = self
                .strava
                .list_activities(access_token, None, RECENT_ACTIVITIES)
                .await
                .map_err(AppError::upstream("failed to fetch activities"))?;
            (recent, 1)
        } else {
            self.fetch_history(access_token).await?
        };

        let mut report = extract_lines(&activities, &wanted);
        report.pages_fetched = pages_fetched;

        tracing::info!(
            requested_ids = wanted.len(),
            pages = report.pages_fetched,
            scanned = report.scanned,
            lines = report.lines.len(),
            not_requested = report.not_requested,
            missing_polyline = report.missing_polyline,
            invalid_polyline = report.invalid_polyline,
            "Activity lines aggregated"
        );

        Ok(report)
    }

    /// Page through the full history until an empty page (or the page cap).
    ///
    /// Also returns the number of pages requested.
    async fn fetch_history(&self, access_token: &str) -> Result<(Vec<StravaActivity>, u32)> {
        let mut activities = Vec::new();

        for page in 1..=self.max_pages {
            let batch = self
                .strava
                .list_activities(access_token, Some(page), SCAN_PAGE_SIZE)
                .await
                .map_err(AppError::upstream("failed to fetch activities"))?;

            tracing::debug!(page, count = batch.len(), "Fetched activity page");

            if batch.is_empty() {
                return Ok((activities, page));
            }

            activities.extend(batch);
        }

        tracing::warn!(
            max_pages = self.max_pages,
            scanned = activities.len(),
            "Activity page cap reached, stopping scan"
        );
        Ok((activities, self.max_pages))
    }
}
