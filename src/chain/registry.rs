// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-chain contract registry.

use std::sync::Arc;

use super::{rpc::Ledger, ChainError};

/// Registry handle over an open connection.
#[derive(Clone)]
pub struct Registry {
    ledger: Arc<dyn Ledger>,
    chain: String,
}

impl Registry {
    /// Attach to the registry of the chain behind `ledger`.
    pub async fn create(ledger: Arc<dyn Ledger>) -> Result<Self, ChainError> {
        let chain = ledger.chain_name().await?;
        Ok(Self { ledger, chain })
    }

    /// Chain this registry belongs to.
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Access key of `contract_id`, failing when none is registered.
    pub async fn contract_key_or_fail(&self, contract_id: &str) -> Result<String, ChainError> {
        match self.ledger.contract_key(contract_id).await? {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ChainError::ContractKeyUnavailable(contract_id.to_string())),
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::testing::FakeLedger;

    #[tokio::test]
    async fn registered_contract_key_is_returned() {
        let ledger = FakeLedger::new().with_contract_key("0xabc", "0xkey");
        let registry = Registry::create(Arc::new(ledger)).await.unwrap();

        assert_eq!(registry.chain(), FakeLedger::CHAIN);
        assert_eq!(registry.contract_key_or_fail("0xabc").await.unwrap(), "0xkey");
    }

    #[tokio::test]
    async fn missing_contract_key_fails() {
        let registry = Registry::create(Arc::new(FakeLedger::new())).await.unwrap();
        assert!(matches!(
            registry.contract_key_or_fail("0xabc").await,
            Err(ChainError::ContractKeyUnavailable(id)) if id == "0xabc"
        ));
    }

    #[tokio::test]
    async fn empty_contract_key_counts_as_missing() {
        let ledger = FakeLedger::new().with_contract_key("0xabc", "");
        let registry = Registry::create(Arc::new(ledger)).await.unwrap();
        assert!(matches!(
            registry.contract_key_or_fail("0xabc").await,
            Err(ChainError::ContractKeyUnavailable(_))
        ));
    }
}
