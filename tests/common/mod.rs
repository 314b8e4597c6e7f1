// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test harness: an in-process fake of the Strava API.
//!
//! The fake is served by axum on `127.0.0.1:0` and the app under test is
//! pointed at it through `strava_api_url` / `strava_oauth_url`.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use strava_route_explorer::config::Config;
use strava_route_explorer::routes::create_router;
use strava_route_explorer::AppState;

/// Encodes [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)].
#[allow(dead_code)]
pub const SAMPLE_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

#[allow(dead_code)]
pub const UPSTREAM_ERROR_BODY: &str =
    r#"{"message":"Authorization Error","errors":[{"resource":"Athlete","field":"access_token","code":"invalid"}]}"#;

/// One request received by the fake.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

/// Canned Strava behavior plus a log of what was asked of it.
#[derive(Default)]
pub struct FakeStrava {
    /// Activity pages; `pages[0]` is page 1. Pages past the end are empty.
    pub pages: Vec<Vec<Value>>,
    /// Fail every request for this page with the given status.
    pub fail_on_page: Option<(u32, u16)>,
    /// Fail every request with the given status.
    pub fail_all: Option<u16>,
    pub athlete: Value,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeStrava {
    #[allow(dead_code)]
    pub fn with_pages(pages: Vec<Vec<Value>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    #[allow(dead_code)]
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Page numbers requested from `/athlete/activities`, in order.
    #[allow(dead_code)]
    pub fn activity_pages_requested(&self) -> Vec<Option<u32>> {
        self.recorded()
            .iter()
            .filter(|r| r.path == "/api/v3/athlete/activities")
            .map(|r| r.query.get("page").map(|p| p.parse().unwrap()))
            .collect()
    }

    fn record(&self, path: &str, query: HashMap<String, String>, headers: &HeaderMap) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(RecordedRequest {
            path: path.to_string(),
            query,
            authorization,
        });
    }

    fn failure(status: u16) -> Response {
        let status = StatusCode::from_u16(status).unwrap();
        (status, UPSTREAM_ERROR_BODY).into_response()
    }
}

/// Summary activity as Strava would list it.
#[allow(dead_code)]
pub fn activity_json(id: u64, summary_polyline: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": format!("Activity {}", id),
        "type": "Ride",
        "sport_type": "Ride",
        "distance": 12345.6,
        "moving_time": 3600,
        "start_date": "2025-06-01T15:00:00Z",
        "map": {
            "id": format!("a{}", id),
            "summary_polyline": summary_polyline,
            "resource_state": 2
        }
    })
}

async fn fake_athlete(
    State(fake): State<Arc<FakeStrava>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    fake.record("/api/v3/athlete", query, &headers);
    if let Some(status) = fake.fail_all {
        return FakeStrava::failure(status);
    }
    Json(fake.athlete.clone()).into_response()
}

async fn fake_activities(
    State(fake): State<Arc<FakeStrava>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let page: u32 = query.get("page").map(|p| p.parse().unwrap()).unwrap_or(1);
    let per_page: usize = query
        .get("per_page")
        .map(|p| p.parse().unwrap())
        .unwrap_or(30);
    fake.record("/api/v3/athlete/activities", query, &headers);

    if let Some(status) = fake.fail_all {
        return FakeStrava::failure(status);
    }
    if let Some((failing_page, status)) = fake.fail_on_page {
        if failing_page == page {
            return FakeStrava::failure(status);
        }
    }

    let items: Vec<Value> = fake
        .pages
        .get(page as usize - 1)
        .map(|p| p.iter().take(per_page).cloned().collect())
        .unwrap_or_default();
    Json(items).into_response()
}

async fn fake_token(State(fake): State<Arc<FakeStrava>>, body: String) -> Response {
    let form: HashMap<String, String> = body
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    fake.record("/oauth/token", form.clone(), &HeaderMap::new());

    if let Some(status) = fake.fail_all {
        return FakeStrava::failure(status);
    }
    if form.get("code").map(String::as_str) != Some("good_code") {
        return (
            StatusCode::BAD_REQUEST,
            r#"{"message":"Bad Request","errors":[{"resource":"AuthorizationCode","field":"code","code":"invalid"}]}"#,
        )
            .into_response();
    }

    Json(json!({
        "token_type": "Bearer",
        "access_token": "fresh_access_token",
        "refresh_token": "fresh_refresh_token",
        "expires_at": 1_900_000_000,
        "athlete": { "id": 42, "firstname": "Ada", "lastname": "Lovelace" }
    }))
    .into_response()
}

async fn fake_deauthorize(State(fake): State<Arc<FakeStrava>>, headers: HeaderMap) -> Response {
    fake.record("/oauth/deauthorize", HashMap::new(), &headers);
    if let Some(status) = fake.fail_all {
        return FakeStrava::failure(status);
    }
    Json(json!({ "access_token": "revoked" })).into_response()
}

/// Serve the fake on an ephemeral port and return its base URL.
pub async fn spawn_fake_strava(fake: FakeStrava) -> (String, Arc<FakeStrava>) {
    let fake = Arc::new(fake);
    let app = Router::new()
        .route("/api/v3/athlete", get(fake_athlete))
        .route("/api/v3/athlete/activities", get(fake_activities))
        .route("/oauth/token", post(fake_token))
        .route("/oauth/deauthorize", post(fake_deauthorize))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), fake)
}

/// Create a test app talking to a fresh fake Strava.
#[allow(dead_code)]
pub async fn create_test_app(fake: FakeStrava) -> (Router, Arc<FakeStrava>) {
    create_test_app_with_config(fake, Config::default()).await
}

/// Like [`create_test_app`], with config overrides (the Strava URLs are replaced).
#[allow(dead_code)]
pub async fn create_test_app_with_config(
    fake: FakeStrava,
    config: Config,
) -> (Router, Arc<FakeStrava>) {
    let (base_url, fake) = spawn_fake_strava(fake).await;
    let config = Config {
        strava_api_url: format!("{}/api/v3", base_url),
        strava_oauth_url: format!("{}/oauth", base_url),
        ..config
    };
    (create_router(Arc::new(AppState::new(config))), fake)
}

/// Build a GET request with an empty body.
#[allow(dead_code)]
pub fn get_request(uri: &str) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("JSON body")
}
