// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory state source used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{
    rpc::{ContractQuery, Connector, Ledger},
    ChainError,
};

/// Ledger answering from fixed tables.
#[derive(Default)]
pub struct FakeLedger {
    contract_keys: HashMap<String, String>,
    envelopes: HashMap<String, Value>,
    failing_queries: bool,
    queries: Mutex<Vec<ContractQuery>>,
}

impl FakeLedger {
    pub const CHAIN: &'static str = "fake-testnet";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contract_key(mut self, contract_id: &str, key: &str) -> Self {
        self.contract_keys
            .insert(contract_id.to_string(), key.to_string());
        self
    }

    /// Raw envelope returned for `slug`. Unknown slugs get a `KeyNotFound`
    /// envelope.
    pub fn with_envelope(mut self, slug: &str, envelope: Value) -> Self {
        self.envelopes.insert(slug.to_string(), envelope);
        self
    }

    /// Make every query fail at the transport level.
    pub fn with_failing_queries(mut self) -> Self {
        self.failing_queries = true;
        self
    }

    pub fn last_query(&self) -> Option<ContractQuery> {
        self.queries.lock().ok()?.last().cloned()
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn chain_name(&self) -> Result<String, ChainError> {
        Ok(Self::CHAIN.to_string())
    }

    async fn contract_key(&self, contract_id: &str) -> Result<Option<String>, ChainError> {
        Ok(self.contract_keys.get(contract_id).cloned())
    }

    async fn query(&self, query: &ContractQuery) -> Result<Value, ChainError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }

        if self.failing_queries {
            return Err(ChainError::Rpc("connection reset".to_string()));
        }

        let slug = query.args.first().cloned().unwrap_or_default();
        Ok(self
            .envelopes
            .get(&slug)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({"ok": {"err": "KeyNotFound"}})))
    }
}

/// Connector handing out a shared [`FakeLedger`] and counting connects.
pub struct FakeConnector {
    ledger: Arc<FakeLedger>,
    connects: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl FakeConnector {
    pub fn new(ledger: FakeLedger) -> Self {
        Self {
            ledger: Arc::new(ledger),
            connects: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Refuse the first `count` connection attempts.
    pub fn failing_first(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Suspend for `delay` inside every connect.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of connection attempts so far.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _endpoint: &Url) -> Result<Arc<dyn Ledger>, ChainError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let refused = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refused {
            return Err(ChainError::Rpc("connection refused".to_string()));
        }

        let ledger: Arc<dyn Ledger> = self.ledger.clone();
        Ok(ledger)
    }
}
