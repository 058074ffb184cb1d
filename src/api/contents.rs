// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content lookup endpoint.

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    error::ApiError,
    relay::RelayOutcome,
    resolver::QueryOutcome,
    state::AppState,
};

/// Raw query string that opts into relay mode. Nothing else does.
pub const PROXY_MARKER: &str = "proxy";

/// Resolve a slug and return its content.
///
/// With the exact query string `?proxy`, content that is a URI is fetched
/// and its body returned instead. If the fetch fails the content itself is
/// returned.
#[utoipa::path(
    get,
    path = "/contents/{slug}",
    tag = "Contents",
    params(
        ("slug" = String, Path, description = "Opaque content key")
    ),
    responses(
        (status = 200, description = "Stored content, or the relayed resource body", body = String),
        (status = 400, description = "Query response could not be decoded", body = String),
        (status = 404, description = "No content stored under this slug", body = String),
        (status = 503, description = "State source session unavailable", body = String)
    )
)]
pub async fn get_content(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let wants_relay = query.as_deref() == Some(PROXY_MARKER);

    let content = match state.resolver.resolve(&slug).await? {
        QueryOutcome::Found(content) => content,
        QueryOutcome::NotFound => return Err(ApiError::not_found()),
        QueryOutcome::Malformed => return Err(ApiError::bad_request()),
    };

    let response = match state.relay.dispatch(content, wants_relay).await {
        RelayOutcome::Bytes(payload) => (StatusCode::OK, payload).into_response(),
        RelayOutcome::Verbatim(text) => (StatusCode::OK, text).into_response(),
    };
    Ok(response)
}
