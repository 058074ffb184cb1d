// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Relay Dispatcher
//!
//! Decides whether resolved content is returned as-is or treated as a URI
//! to fetch and relay.
//!
//! ## Rules
//!
//! - Relay not requested: content is returned verbatim, unvalidated.
//! - Relay requested but content is not a URI: verbatim.
//! - Relay requested and the fetch fails at the transport level: verbatim.
//! - Otherwise the fetched body is relayed. The upstream status code and
//!   headers are dropped; a 404 page from upstream is still relayed.
//!
//! A URI here is an absolute RFC 3986 URI: a scheme, then only unreserved,
//! reserved and percent-encoded characters. Whitespace, control characters
//! and characters such as `\`, `<` or `"` disqualify the content. The
//! fetch goes to the content string exactly as stored.
//!
//! Fetch targets come straight from contract storage and are not
//! restricted by scheme or host.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// Outcome of dispatching resolved content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Body of the fetched resource.
    Bytes(Bytes),
    /// The resolved content itself.
    Verbatim(String),
}

/// Transport-level fetch failure.
#[derive(Debug, thiserror::Error)]
#[error("Fetch of {url} failed: {message}")]
pub struct FetchError {
    pub url: String,
    pub message: String,
}

/// Fetches the body of a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<Bytes, FetchError>;
}

/// [`Fetcher`] backed by reqwest. No timeout beyond the client defaults.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, uri: &str) -> Result<Bytes, FetchError> {
        let failed = |e: reqwest::Error| FetchError {
            url: uri.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(uri).send().await.map_err(failed)?;
        response.bytes().await.map_err(failed)
    }
}

/// Check that `content` is a syntactically valid absolute URI.
pub fn parse_uri(content: &str) -> Option<Url> {
    if !has_uri_syntax(content) {
        return None;
    }
    Url::parse(content).ok()
}

/// `scheme ":" rest`, where the scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
/// and the rest holds only URI characters and well-formed `%XX` escapes.
fn has_uri_syntax(content: &str) -> bool {
    let Some((scheme, rest)) = content.split_once(':') else {
        return false;
    };

    let mut scheme_chars = scheme.bytes();
    match scheme_chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    if !scheme_chars.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')) {
        return false;
    }

    let mut bytes = rest.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'%' => {
                let (Some(hi), Some(lo)) = (bytes.next(), bytes.next()) else {
                    return false;
                };
                if !hi.is_ascii_hexdigit() || !lo.is_ascii_hexdigit() {
                    return false;
                }
            }
            b if is_uri_char(b) => {}
            _ => return false,
        }
    }
    true
}

/// Unreserved and reserved characters (RFC 3986 section 2).
fn is_uri_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'.'
                | b'_'
                | b'~'
                | b':'
                | b'/'
                | b'?'
                | b'#'
                | b'['
                | b']'
                | b'@'
                | b'!'
                | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
        )
}

/// Chooses between verbatim return and fetch-and-relay.
#[derive(Clone)]
pub struct RelayDispatcher {
    fetcher: Arc<dyn Fetcher>,
}

impl RelayDispatcher {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn dispatch(&self, content: String, wants_relay: bool) -> RelayOutcome {
        if !wants_relay {
            return RelayOutcome::Verbatim(content);
        }

        if parse_uri(&content).is_none() {
            return RelayOutcome::Verbatim(content);
        }

        match self.fetcher.fetch(&content).await {
            Ok(payload) => {
                tracing::debug!(url = %content, bytes = payload.len(), "Relayed content");
                RelayOutcome::Bytes(payload)
            }
            Err(e) => {
                tracing::warn!(url = %content, error = %e, "Relay fetch failed, returning content verbatim");
                RelayOutcome::Verbatim(content)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fetcher serving fixed bodies keyed by the exact URI; unknown URIs fail.
    #[derive(Default)]
    pub struct FakeFetcher {
        bodies: HashMap<String, Bytes>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, uri: &str, body: &'static [u8]) -> Self {
            self.bodies.insert(uri.to_string(), Bytes::from_static(body));
            self
        }

        pub fn fetched(&self) -> Vec<String> {
            self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, uri: &str) -> Result<Bytes, FetchError> {
            if let Ok(mut fetched) = self.fetched.lock() {
                fetched.push(uri.to_string());
            }
            self.bodies.get(uri).cloned().ok_or_else(|| FetchError {
                url: uri.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }
}
