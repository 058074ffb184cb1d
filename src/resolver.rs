// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Slug Resolver
//!
//! Looks a slug up through the content contract and classifies the raw
//! output envelope.
//!
//! ## Envelope
//!
//! The contract answers with a nested result:
//!
//! ```text
//! {"ok": {"ok": "<content>"}}        -> Found
//! {"ok": {"err": "KeyNotFound"}}     -> NotFound
//! {"err": ...} / no "ok" / garbage   -> Malformed
//! ```
//!
//! The outer layer reports whether the query executed, the inner layer is
//! the contract's own result.

use std::sync::Arc;

use serde_json::Value;

use crate::chain::ChainError;
use crate::session::{SessionError, SessionManager};

/// Application-level error tag for an absent key.
pub const KEY_NOT_FOUND: &str = "KeyNotFound";

/// Classified result of a content query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Found(String),
    NotFound,
    Malformed,
}

/// Decode a raw query response.
///
/// Both layers must be JSON objects. Arrays, strings and other shapes are
/// [`QueryOutcome::Malformed`].
pub fn decode(raw: Result<Value, ChainError>) -> QueryOutcome {
    let raw = match raw {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(error = %e, "Content query failed");
            return QueryOutcome::Malformed;
        }
    };

    let Some(envelope) = raw.as_object() else {
        return QueryOutcome::Malformed;
    };

    // A present but falsy success value counts as no success.
    let inner = match envelope.get("ok") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return QueryOutcome::Malformed,
        Some(inner) => inner,
    };

    let Some(result) = inner.as_object() else {
        return QueryOutcome::Malformed;
    };

    match (result.get("ok"), result.get("err")) {
        (_, Some(Value::String(tag))) if tag == KEY_NOT_FOUND => QueryOutcome::NotFound,
        (Some(Value::String(content)), None) => QueryOutcome::Found(content.clone()),
        _ => QueryOutcome::Malformed,
    }
}

/// Resolves slugs against the content contract.
#[derive(Clone)]
pub struct Resolver {
    sessions: Arc<SessionManager>,
}

impl Resolver {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Resolve `slug`. Only session failures surface as errors; query and
    /// decode failures become [`QueryOutcome::Malformed`].
    pub async fn resolve(&self, slug: &str) -> Result<QueryOutcome, SessionError> {
        let session = self.sessions.session().await?;

        let raw = session
            .contract
            .get_content(session.identity.address(), &session.credential, slug)
            .await;

        let outcome = decode(raw);
        if outcome == QueryOutcome::Malformed {
            tracing::debug!(slug = %slug, "Malformed content query response");
        }
        Ok(outcome)
    }
}
