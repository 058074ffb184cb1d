// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote state source client.
//!
//! This module provides functionality for:
//! - Deriving the read identity and signing read credentials
//! - Connecting to the state source over JSON-RPC
//! - Resolving contract access keys from the on-chain registry
//! - Issuing the read-only `get_content` contract query

pub mod abi;
pub mod contract;
pub mod credential;
pub mod identity;
pub mod registry;
pub mod rpc;

#[cfg(test)]
pub(crate) mod testing;

pub use abi::{AbiError, ContractAbi};
pub use contract::ContentContract;
pub use credential::Credential;
pub use identity::Identity;
pub use registry::Registry;
pub use rpc::{ChainError, Connector, ContractQuery, Ledger, RpcConnector};
