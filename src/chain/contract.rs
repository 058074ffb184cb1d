// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content contract handle.

use std::sync::Arc;

use alloy::primitives::Address;

use super::{
    abi::{ContractAbi, GET_CONTENT},
    credential::Credential,
    registry::Registry,
    rpc::{ContractQuery, Ledger},
    ChainError,
};

/// Handle to the deployed content contract.
#[derive(Clone)]
pub struct ContentContract {
    ledger: Arc<dyn Ledger>,
    registry: Registry,
    contract_id: String,
    contract_key: String,
    get_content_selector: String,
}

impl ContentContract {
    /// Bind a contract handle. Fails if the ABI has no read-only
    /// `get_content` message.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        registry: Registry,
        abi: &ContractAbi,
        contract_id: impl Into<String>,
        contract_key: impl Into<String>,
    ) -> Result<Self, ChainError> {
        let get_content_selector = abi.selector(GET_CONTENT)?.to_string();
        Ok(Self {
            ledger,
            registry,
            contract_id: contract_id.into(),
            contract_key: contract_key.into(),
            get_content_selector,
        })
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Query the value stored under `slug`, returning the raw output
    /// envelope.
    pub async fn get_content(
        &self,
        origin: Address,
        credential: &Credential,
        slug: &str,
    ) -> Result<serde_json::Value, ChainError> {
        let query = ContractQuery {
            contract_id: self.contract_id.clone(),
            contract_key: self.contract_key.clone(),
            selector: self.get_content_selector.clone(),
            origin: origin.to_string(),
            args: vec![slug.to_string()],
            certificate: credential.clone(),
        };

        self.ledger.query(&query).await
    }
}

impl std::fmt::Debug for ContentContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentContract")
            .field("contract_id", &self.contract_id)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
