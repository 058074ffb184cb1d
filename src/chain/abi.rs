// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract interface schema.
//!
//! Only the parts of the contract metadata needed to address a message are
//! parsed: its label, selector and whether it mutates state. Everything
//! else in the metadata document is ignored.

use serde::Deserialize;

/// Metadata shipped with the binary for the default content contract.
/// Override with `CONTRACT_ABI_PATH` when talking to a different deployment.
const BUILTIN_METADATA: &str = include_str!("content_abi.json");

/// Message label of the content read.
pub const GET_CONTENT: &str = "get_content";

#[derive(Debug, Clone, Deserialize)]
struct Metadata {
    spec: MetadataSpec,
}

#[derive(Debug, Clone, Deserialize)]
struct MetadataSpec {
    messages: Vec<AbiMessage>,
}

/// A callable contract message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbiMessage {
    pub label: String,
    pub selector: String,
    #[serde(default)]
    pub mutates: bool,
}

/// Parsed contract interface.
#[derive(Debug, Clone)]
pub struct ContractAbi {
    messages: Vec<AbiMessage>,
}

/// Errors raised while reading contract metadata.
#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("Invalid contract metadata: {0}")]
    InvalidMetadata(String),

    #[error("Contract has no message `{0}`")]
    UnknownMessage(String),

    #[error("Message `{0}` mutates state and cannot be queried")]
    MutatingMessage(String),
}

impl ContractAbi {
    /// Parse an ink!-style metadata document.
    pub fn from_json(raw: &str) -> Result<Self, AbiError> {
        let metadata: Metadata =
            serde_json::from_str(raw).map_err(|e| AbiError::InvalidMetadata(e.to_string()))?;

        if let Some(bad) = metadata
            .spec
            .messages
            .iter()
            .find(|m| !is_selector(&m.selector))
        {
            return Err(AbiError::InvalidMetadata(format!(
                "selector `{}` of `{}` is not 4 hex-encoded bytes",
                bad.selector, bad.label
            )));
        }

        Ok(Self {
            messages: metadata.spec.messages,
        })
    }

    /// Metadata of the default content contract.
    pub fn builtin() -> Result<Self, AbiError> {
        Self::from_json(BUILTIN_METADATA)
    }

    /// Look up a message by label.
    pub fn message(&self, label: &str) -> Option<&AbiMessage> {
        self.messages.iter().find(|m| m.label == label)
    }

    /// Selector of a read-only message.
    pub fn selector(&self, label: &str) -> Result<&str, AbiError> {
        let message = self
            .message(label)
            .ok_or_else(|| AbiError::UnknownMessage(label.to_string()))?;

        if message.mutates {
            return Err(AbiError::MutatingMessage(label.to_string()));
        }

        Ok(&message.selector)
    }
}

fn is_selector(raw: &str) -> bool {
    raw.strip_prefix("0x")
        .map(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}
