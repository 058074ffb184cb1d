// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`GatewayConfig`] loaded from them at startup. The configuration is read
//! once and injected into the session manager; nothing reads the environment
//! mid-request.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RPC_URL` | JSON-RPC endpoint of the remote state source | `https://poc5.phala.network/ws` |
//! | `CONTRACT_ID` | Deployed content contract id | see [`DEFAULT_CONTRACT_ID`] |
//! | `CONTRACT_ABI_PATH` | Contract metadata JSON | built-in metadata |
//! | `SIGNING_SEED` | Seed for the read identity | `//Alice` |
//! | `CREDENTIAL_TTL_SECS` | Validity of the signed read credential | `2147483647` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | unset |
//! | `TLS_KEY_PATH` | PEM private key | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! ## State Source Endpoint
//!
//! The default `RPC_URL` is the public testnet node. The gateway speaks
//! `system_chain`, `registry_getContractKey` and `contract_query` over
//! JSON-RPC, and that node does not serve the last two. Point `RPC_URL` at a
//! compatible bridge; otherwise `/health/ready` and every content request
//! answer 503. Startup logs a warning while the default is in use.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::chain::abi::{AbiError, ContractAbi};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CONTRACT_ID_ENV: &str = "CONTRACT_ID";
pub const CONTRACT_ABI_PATH_ENV: &str = "CONTRACT_ABI_PATH";
pub const SIGNING_SEED_ENV: &str = "SIGNING_SEED";
pub const CREDENTIAL_TTL_ENV: &str = "CREDENTIAL_TTL_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// Public testnet node. See the module docs on what it must serve.
pub const DEFAULT_RPC_URL: &str = "https://poc5.phala.network/ws";

/// Content contract deployed on the public testnet.
pub const DEFAULT_CONTRACT_ID: &str =
    "0x11cd8e45a89eb508c21edc505c95a61b496a453c76966736c64345fd572cab1d";

/// Well-known development seed.
///
/// Anyone can derive the same key from it. It only authorizes reads and
/// must never hold funds or write access.
pub const DEFAULT_SIGNING_SEED: &str = "//Alice";

/// Default credential validity. The session is never rebuilt while the
/// process runs, so the credential has to outlive it.
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(0x7fff_ffff);

/// Connection parameters for the remote state source.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: Url,
    pub contract_id: String,
    pub abi: ContractAbi,
    pub signing_seed: String,
    pub credential_ttl: Duration,
}

/// PEM certificate/key pair used to serve HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub chain: ChainConfig,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address `{0}`")]
    InvalidBindAddress(String),

    #[error("Invalid PORT: {0}")]
    InvalidPort(String),

    #[error("Invalid RPC_URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid CONTRACT_ID: {0}")]
    InvalidContractId(String),

    #[error("Invalid CREDENTIAL_TTL_SECS: {0}")]
    InvalidCredentialTtl(String),

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,

    #[error("Invalid LOG_FORMAT: {0} (expected `json` or `pretty`)")]
    InvalidLogFormat(String),

    #[error("Failed to read contract metadata {path}: {source}")]
    AbiRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Abi(#[from] AbiError),
}

impl ChainConfig {
    /// Whether `RPC_URL` was left at [`DEFAULT_RPC_URL`].
    pub fn uses_default_rpc_url(&self) -> bool {
        self.rpc_url.as_str() == DEFAULT_RPC_URL
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let bind = format!("{host}:{port}");
        let bind_addr: SocketAddr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(bind))?;

        let rpc_raw = get(RPC_URL_ENV).unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let rpc_url = Url::parse(rpc_raw.trim())
            .map_err(|e| ConfigError::InvalidRpcUrl(format!("{rpc_raw}: {e}")))?;

        let contract_id = get(CONTRACT_ID_ENV).unwrap_or_else(|| DEFAULT_CONTRACT_ID.to_string());
        let contract_id = normalize_contract_id(&contract_id)?;

        let abi = match get(CONTRACT_ABI_PATH_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::AbiRead {
                    path: path.clone(),
                    source,
                })?;
                ContractAbi::from_json(&raw)?
            }
            None => ContractAbi::builtin()?,
        };

        let signing_seed = get(SIGNING_SEED_ENV).unwrap_or_else(|| DEFAULT_SIGNING_SEED.to_string());

        let credential_ttl = match get(CREDENTIAL_TTL_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidCredentialTtl(raw)),
            },
            None => DEFAULT_CREDENTIAL_TTL,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            None => LogFormat::Pretty,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::InvalidLogFormat(raw)),
            },
        };

        Ok(Self {
            bind_addr,
            chain: ChainConfig {
                rpc_url,
                contract_id,
                abi,
                signing_seed,
                credential_ttl,
            },
            tls,
            log_format,
        })
    }
}

/// Validate a contract id: `0x` followed by 64 hex characters, lowercased.
fn normalize_contract_id(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .ok_or_else(|| ConfigError::InvalidContractId(format!("{trimmed}: missing 0x prefix")))?;

    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidContractId(format!(
            "{trimmed}: expected 32 hex-encoded bytes"
        )));
    }

    Ok(format!("0x{}", hex.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn load(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.chain.rpc_url.as_str(), DEFAULT_RPC_URL);
        assert!(config.chain.uses_default_rpc_url());
        assert_eq!(config.chain.contract_id, DEFAULT_CONTRACT_ID);
        assert_eq!(config.chain.signing_seed, DEFAULT_SIGNING_SEED);
        assert_eq!(config.chain.credential_ttl, DEFAULT_CREDENTIAL_TTL);
        assert!(config.tls.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_honoured() {
        let config = load(&[
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (RPC_URL_ENV, "http://localhost:9933"),
            (CREDENTIAL_TTL_ENV, "600"),
            (LOG_FORMAT_ENV, "JSON"),
            (TLS_CERT_PATH_ENV, "/tls/cert.pem"),
            (TLS_KEY_PATH_ENV, "/tls/key.pem"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.chain.rpc_url.as_str(), "http://localhost:9933/");
        assert!(!config.chain.uses_default_rpc_url());
        assert_eq!(config.chain.credential_ttl, Duration::from_secs(600));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: "/tls/cert.pem".into(),
                key: "/tls/key.pem".into(),
            })
        );
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = load(&[(PORT_ENV, ""), (SIGNING_SEED_ENV, "  ")]).unwrap();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.chain.signing_seed, DEFAULT_SIGNING_SEED);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[(PORT_ENV, "eighty")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            load(&[(RPC_URL_ENV, "not a url")]),
            Err(ConfigError::InvalidRpcUrl(_))
        ));
        assert!(matches!(
            load(&[(CREDENTIAL_TTL_ENV, "0")]),
            Err(ConfigError::InvalidCredentialTtl(_))
        ));
        assert!(matches!(
            load(&[(LOG_FORMAT_ENV, "xml")]),
            Err(ConfigError::InvalidLogFormat(_))
        ));
        assert!(matches!(
            load(&[(TLS_CERT_PATH_ENV, "/tls/cert.pem")]),
            Err(ConfigError::IncompleteTls)
        ));
    }

    #[test]
    fn contract_id_is_validated_and_lowercased() {
        let upper = "0x11CD8E45A89EB508C21EDC505C95A61B496A453C76966736C64345FD572CAB1D";
        let config = load(&[(CONTRACT_ID_ENV, upper)]).unwrap();
        assert_eq!(config.chain.contract_id, DEFAULT_CONTRACT_ID);

        assert!(matches!(
            load(&[(CONTRACT_ID_ENV, "11cd8e45")]),
            Err(ConfigError::InvalidContractId(_))
        ));
        assert!(matches!(
            load(&[(CONTRACT_ID_ENV, "0x1234")]),
            Err(ConfigError::InvalidContractId(_))
        ));
    }

    #[test]
    fn abi_is_loaded_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"spec":{{"messages":[{{"label":"get_content","selector":"0xdeadbeef"}}]}}}}"#
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let config = load(&[(CONTRACT_ABI_PATH_ENV, path.as_str())]).unwrap();
        assert_eq!(
            config.chain.abi.selector("get_content").unwrap(),
            "0xdeadbeef"
        );
    }

    #[test]
    fn missing_abi_file_is_an_error() {
        let result = load(&[(CONTRACT_ABI_PATH_ENV, "/nonexistent/abi.json")]);
        assert!(matches!(result, Err(ConfigError::AbiRead { .. })));
    }
}
