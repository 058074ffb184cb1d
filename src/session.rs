// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Manager
//!
//! Owns the single process-wide session to the remote state source.
//!
//! ## Lifecycle
//!
//! 1. The first caller of [`SessionManager::session`] derives the identity,
//!    connects, attaches to the registry, looks up the contract key, binds
//!    the contract handle and signs a read credential.
//! 2. Callers arriving while that is in flight wait for it instead of
//!    starting their own construction. Construction runs on its own task, so
//!    a caller that goes away (a dropped request) does not cancel it.
//! 3. On success the session is published and every later call returns the
//!    same `Arc`. On failure nothing is cached and the next call starts over.
//!
//! The session is never rebuilt or refreshed afterwards; a dropped
//! connection needs a process restart.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;

use crate::chain::{
    ChainError, Connector, ContentContract, Credential, Identity, Ledger, Registry,
};
use crate::config::ChainConfig;

/// Established session. Immutable once built.
pub struct Session {
    pub connection: Arc<dyn Ledger>,
    pub registry: Registry,
    pub contract: ContentContract,
    pub credential: Credential,
    pub identity: Identity,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("registry", &self.registry)
            .field("contract", &self.contract)
            .field("credential", &self.credential)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Failure to establish the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session initialization failed: {0}")]
    InitFailed(#[from] ChainError),

    #[error("Session initialization task failed: {0}")]
    TaskFailed(String),
}

/// Lazily builds and caches the [`Session`].
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: ChainConfig,
    connector: Arc<dyn Connector>,
    session: OnceCell<Arc<Session>>,
}

impl SessionManager {
    pub fn new(config: ChainConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                connector,
                session: OnceCell::new(),
            }),
        }
    }

    /// Return the session, building it on first use.
    ///
    /// Construction is single-flight: concurrent first callers share one
    /// attempt. A failed attempt leaves the manager empty.
    pub async fn session(&self) -> Result<Arc<Session>, SessionError> {
        if let Some(session) = self.inner.session.get() {
            return Ok(session.clone());
        }

        // The spawned task holds the cell's init slot until construction
        // finishes, even if this caller is dropped.
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.get_or_establish().await })
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))?
    }

    /// Whether a session has been established.
    pub fn is_established(&self) -> bool {
        self.inner.session.initialized()
    }
}

impl Inner {
    async fn get_or_establish(&self) -> Result<Arc<Session>, SessionError> {
        self.session
            .get_or_try_init(|| async {
                match self.establish().await {
                    Ok(session) => {
                        tracing::info!(
                            chain = %session.registry.chain(),
                            contract = %session.contract.contract_id(),
                            address = %session.identity.address(),
                            expires_at = %session.credential.expires_at,
                            "Session established"
                        );
                        Ok(Arc::new(session))
                    }
                    Err(e) => {
                        tracing::warn!(
                            endpoint = %self.config.rpc_url,
                            error = %e,
                            "Session initialization failed"
                        );
                        Err(SessionError::InitFailed(e))
                    }
                }
            })
            .await
            .cloned()
    }

    async fn establish(&self) -> Result<Session, ChainError> {
        let identity = Identity::from_seed(&self.config.signing_seed)?;

        let connection = self.connector.connect(&self.config.rpc_url).await?;
        let registry = Registry::create(connection.clone()).await?;
        let contract_key = registry
            .contract_key_or_fail(&self.config.contract_id)
            .await?;

        let contract = ContentContract::new(
            connection.clone(),
            registry.clone(),
            &self.config.abi,
            self.config.contract_id.clone(),
            contract_key,
        )?;

        let credential = Credential::sign(
            &identity,
            registry.chain(),
            Utc::now(),
            self.config.credential_ttl,
        )?;

        Ok(Session {
            connection,
            registry,
            contract,
            credential,
            identity,
        })
    }
}
