// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod contents;
pub mod health;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/contents/{slug}", get(contents::get_content))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(contents::get_content, health::liveness, health::readiness),
    components(schemas(health::HealthResponse, health::ReadyResponse, health::HealthChecks)),
    tags(
        (name = "Contents", description = "Slug resolution and relay"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
pub(crate) const TEST_CONTRACT: &str =
    "0x11cd8e45a89eb508c21edc505c95a61b496a453c76966736c64345fd572cab1d";

/// App state over in-memory collaborators, configured for [`TEST_CONTRACT`].
#[cfg(test)]
pub(crate) fn test_state(
    connector: crate::chain::testing::FakeConnector,
    fetcher: crate::relay::testing::FakeFetcher,
) -> AppState {
    use std::sync::Arc;

    let config = crate::config::ChainConfig {
        rpc_url: url::Url::parse("http://127.0.0.1:9933").unwrap(),
        contract_id: TEST_CONTRACT.to_string(),
        abi: crate::chain::ContractAbi::builtin().unwrap(),
        signing_seed: "//Alice".to_string(),
        credential_ttl: std::time::Duration::from_secs(3600),
    };
    AppState::new(config, Arc::new(connector), Arc::new(fetcher))
}
