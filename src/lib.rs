// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content Gateway - Slug to Content Resolver
//!
//! Serves `GET /contents/{slug}` by querying a content contract on a remote
//! ledger through one lazily established, process-wide session. Content
//! that is a URI can optionally be fetched and relayed (`?proxy`).
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum)
//! - `chain` - State source client: identity, credentials, registry, contract
//! - `session` - Single-flight session construction and caching
//! - `resolver` - Slug lookup and response envelope decoding
//! - `relay` - Verbatim return or fetch-and-relay

pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod relay;
pub mod resolver;
pub mod session;
pub mod state;
