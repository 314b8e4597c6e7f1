// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extractors and response middleware.

pub mod auth;
pub mod security;

pub use auth::AccessToken;
