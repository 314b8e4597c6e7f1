// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed OAuth `state` parameter.
//!
//! The state is `base64url("timestamp_hex|signature_hex")` where the
//! signature is HMAC-SHA256 over the timestamp. Nothing is stored server side.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// How long a login attempt may take before its state is rejected.
pub const STATE_MAX_AGE_MINUTES: i64 = 10;

/// Errors from verifying an OAuth state value.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StateError {
    #[error("malformed state")]
    Malformed,

    #[error("state signature mismatch")]
    BadSignature,

    #[error("state expired")]
    Expired,
}

fn sign(payload: &str, key: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Create a signed state for a login started at `now`.
pub fn issue_state(key: &[u8], now: DateTime<Utc>) -> String {
    let payload = format!("{:x}", now.timestamp_millis());
    let signed = format!("{}|{}", payload, sign(&payload, key));
    URL_SAFE_NO_PAD.encode(signed.as_bytes())
}

/// Verify a state created by [`issue_state`] and check its age against `now`.
pub fn verify_state(state: &str, key: &[u8], now: DateTime<Utc>) -> Result<(), StateError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(state)
        .map_err(|_| StateError::Malformed)?;
    let decoded = String::from_utf8(bytes).map_err(|_| StateError::Malformed)?;

    let (timestamp_hex, signature_hex) = decoded.split_once('|').ok_or(StateError::Malformed)?;

    let expected = sign(timestamp_hex, key);
    if !bool::from(expected.as_bytes().ct_eq(signature_hex.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return Err(StateError::BadSignature);
    }

    let issued_ms = i64::from_str_radix(timestamp_hex, 16).map_err(|_| StateError::Malformed)?;
    let issued = DateTime::from_timestamp_millis(issued_ms).ok_or(StateError::Malformed)?;

    if now.signed_duration_since(issued) > Duration::minutes(STATE_MAX_AGE_MINUTES) {
        return Err(StateError::Expired);
    }

    Ok(())
}
