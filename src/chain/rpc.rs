// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Connection to the remote state source.
//!
//! [`Connector`] opens a connection and [`Ledger`] is the handle that comes
//! back. The production implementation speaks JSON-RPC over HTTP through
//! alloy's RPC client; tests substitute in-memory fakes.

use std::sync::Arc;

use alloy::rpc::client::RpcClient;
use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use super::{abi::AbiError, credential::Credential};

/// Read-only query against a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuery {
    pub contract_id: String,
    pub contract_key: String,
    pub selector: String,
    /// Address the query is issued on behalf of.
    pub origin: String,
    pub args: Vec<String>,
    pub certificate: Credential,
}

/// Open connection to the state source.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Name of the chain behind this connection.
    async fn chain_name(&self) -> Result<String, ChainError>;

    /// Access key of a deployed contract, if the registry knows it.
    async fn contract_key(&self, contract_id: &str) -> Result<Option<String>, ChainError>;

    /// Run a read-only contract query and return the raw output envelope.
    async fn query(&self, query: &ContractQuery) -> Result<serde_json::Value, ChainError>;
}

/// Opens connections to a state source endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Arc<dyn Ledger>, ChainError>;
}

/// JSON-RPC connector over HTTP(S).
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcConnector;

#[async_trait]
impl Connector for RpcConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Arc<dyn Ledger>, ChainError> {
        let ledger: Arc<dyn Ledger> = Arc::new(RpcLedger::connect(endpoint).await?);
        Ok(ledger)
    }
}

/// State source reached through JSON-RPC.
pub struct RpcLedger {
    client: RpcClient,
    chain: String,
}

impl RpcLedger {
    /// Open the transport and confirm the endpoint answers.
    pub async fn connect(endpoint: &Url) -> Result<Self, ChainError> {
        let url = http_endpoint(endpoint)?;
        let client = RpcClient::new_http(url);

        let chain: String = client
            .request_noparams("system_chain")
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        tracing::debug!(endpoint = %endpoint, chain = %chain, "Connected to state source");

        Ok(Self { client, chain })
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn chain_name(&self) -> Result<String, ChainError> {
        Ok(self.chain.clone())
    }

    async fn contract_key(&self, contract_id: &str) -> Result<Option<String>, ChainError> {
        self.client
            .request("registry_getContractKey", (contract_id.to_string(),))
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn query(&self, query: &ContractQuery) -> Result<serde_json::Value, ChainError> {
        self.client
            .request("contract_query", (query.clone(),))
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

/// Map websocket endpoints onto their HTTP equivalents.
///
/// Public nodes commonly advertise `ws(s)://` URLs while serving the same
/// JSON-RPC API over plain HTTP on the same path.
fn http_endpoint(endpoint: &Url) -> Result<Url, ChainError> {
    let scheme = match endpoint.scheme() {
        "http" | "ws" => "http",
        "https" | "wss" => "https",
        other => {
            return Err(ChainError::InvalidEndpoint(format!(
                "unsupported scheme `{other}` in {endpoint}"
            )))
        }
    };

    let rebuilt = format!("{scheme}{}", &endpoint.as_str()[endpoint.scheme().len()..]);
    Url::parse(&rebuilt).map_err(|e| ChainError::InvalidEndpoint(e.to_string()))
}

/// Errors that can occur while talking to the state source.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("No access key registered for contract {0}")]
    ContractKeyUnavailable(String),

    #[error("Invalid signing seed: {0}")]
    InvalidSeed(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Abi(#[from] AbiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_endpoints_map_to_http() {
        let ws = Url::parse("wss://poc5.phala.network/ws").unwrap();
        assert_eq!(
            http_endpoint(&ws).unwrap().as_str(),
            "https://poc5.phala.network/ws"
        );

        let plain = Url::parse("ws://127.0.0.1:9944").unwrap();
        assert_eq!(http_endpoint(&plain).unwrap().as_str(), "http://127.0.0.1:9944/");

        let https = Url::parse("https://rpc.example.org/path").unwrap();
        assert_eq!(http_endpoint(&https).unwrap(), https);
    }

    #[test]
    fn unsupported_schemes_are_rejected() {
        let ftp = Url::parse("ftp://rpc.example.org").unwrap();
        assert!(matches!(
            http_endpoint(&ftp),
            Err(ChainError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_to_connect() {
        // Port 9 (discard) on localhost is not expected to serve JSON-RPC.
        let endpoint = Url::parse("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            RpcLedger::connect(&endpoint).await,
            Err(ChainError::Rpc(_))
        ));
    }

    #[test]
    fn contract_query_serializes_with_camel_case_fields() {
        let identity = crate::chain::Identity::from_seed("//Alice").unwrap();
        let certificate = Credential::sign(
            &identity,
            "testnet",
            chrono::Utc::now(),
            std::time::Duration::from_secs(60),
        )
        .unwrap();
        let query = ContractQuery {
            contract_id: "0x01".to_string(),
            contract_key: "0x02".to_string(),
            selector: "0x2e2e2b5e".to_string(),
            origin: identity.address().to_string(),
            args: vec!["hello".to_string()],
            certificate,
        };

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["contractId"], "0x01");
        assert_eq!(json["contractKey"], "0x02");
        assert_eq!(json["args"][0], "hello");
        assert_eq!(json["certificate"]["chain"], "testnet");
    }
}
