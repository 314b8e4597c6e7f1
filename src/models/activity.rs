// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity models: the upstream record and what we send to the frontend.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Summary activity as returned by `GET /athlete/activities`.
///
/// Only `id` is required; Strava omits fields for some activity types.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StravaActivity {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: Option<u64>,
    /// Start date/time (ISO 8601)
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub map: Option<StravaMap>,
}

impl StravaActivity {
    /// Get the summary polyline, falling back to the detailed one.
    ///
    /// Empty strings are treated as missing.
    pub fn get_polyline(&self) -> Option<&str> {
        let map = self.map.as_ref()?;
        map.summary_polyline
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| map.polyline.as_deref().filter(|p| !p.is_empty()))
    }
}

/// Activity map data with polylines.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StravaMap {
    #[serde(default)]
    pub polyline: Option<String>,
    #[serde(default)]
    pub summary_polyline: Option<String>,
}

/// Cleaned activity record returned by `GET /activities`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub distance: Option<f64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub moving_time: Option<u64>,
    pub start_date: Option<String>,
}

impl From<StravaActivity> for ActivitySummary {
    fn from(a: StravaActivity) -> Self {
        Self {
            id: a.id,
            name: a.name,
            activity_type: a.activity_type,
            distance: a.distance,
            moving_time: a.moving_time,
            start_date: a.start_date,
        }
    }
}

/// Decoded route of one activity, as `[lat, lng]` pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityLine {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub coords: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_strava_summary() {
        let json = r#"{
            "id": 16906743520,
            "name": "Morning Ride",
            "type": "Ride",
            "sport_type": "MountainBikeRide",
            "distance": 28099.1,
            "moving_time": 5322,
            "start_date": "2025-01-04T16:02:11Z",
            "map": { "id": "a16906743520", "summary_polyline": "_p~iF~ps|U", "resource_state": 2 }
        }"#;

        let activity: StravaActivity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.id, 16906743520);
        assert_eq!(activity.activity_type.as_deref(), Some("Ride"));
        assert_eq!(activity.moving_time, Some(5322));
        assert_eq!(activity.get_polyline(), Some("_p~iF~ps|U"));
    }

    #[test]
    fn test_deserialize_minimal_activity() {
        let activity: StravaActivity = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(activity.map, None);
        assert_eq!(activity.get_polyline(), None);
    }

    #[test]
    fn test_get_polyline_falls_back_to_detailed() {
        let activity = StravaActivity {
            id: 1,
            map: Some(StravaMap {
                polyline: Some("detailed".to_string()),
                summary_polyline: Some(String::new()),
            }),
            ..Default::default()
        };
        assert_eq!(activity.get_polyline(), Some("detailed"));
    }

    #[test]
    fn test_get_polyline_prefers_summary() {
        let activity = StravaActivity {
            id: 1,
            map: Some(StravaMap {
                polyline: Some("detailed".to_string()),
                summary_polyline: Some("summary".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(activity.get_polyline(), Some("summary"));
    }

    #[test]
    fn test_summary_serializes_type_field() {
        let summary = ActivitySummary::from(StravaActivity {
            id: 7,
            name: Some("Lunch Run".to_string()),
            activity_type: Some("Run".to_string()),
            ..Default::default()
        });
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["type"], "Run");
        assert_eq!(value["distance"], serde_json::Value::Null);
    }
}
