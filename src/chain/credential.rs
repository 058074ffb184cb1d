// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed read credential.
//!
//! A credential binds the signer's address to the chain it was issued for
//! and a validity window. The signature covers the canonical message
//! produced by [`Credential::message`].

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, Signature};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{identity::Identity, ChainError};

/// Proof of identity attached to every contract query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub signer: String,
    pub chain: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Hex-encoded 65-byte signature, 0x-prefixed.
    pub signature: String,
}

impl Credential {
    /// Sign a credential for `chain`, valid from `now` for `ttl`.
    pub fn sign(
        identity: &Identity,
        chain: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, ChainError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| ChainError::Signing(format!("credential ttl out of range: {e}")))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| ChainError::Signing("credential expiry out of range".to_string()))?;

        let signer = identity.address().to_string();
        let message = Self::message(&signer, chain, now, expires_at);
        let signature = identity.sign(message.as_bytes())?;

        Ok(Self {
            signer,
            chain: chain.to_string(),
            issued_at: now,
            expires_at,
            signature: format!("0x{}", alloy::hex::encode(signature.as_bytes())),
        })
    }

    /// Canonical message covered by the signature.
    pub fn message(
        signer: &str,
        chain: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> String {
        format!(
            "content-gateway read credential\nsigner: {signer}\nchain: {chain}\nissued: {}\nexpires: {}",
            issued_at.timestamp(),
            expires_at.timestamp()
        )
    }

    /// Whether `at` falls inside the validity window.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.issued_at <= at && at < self.expires_at
    }

    /// Check that the signature was produced by `signer`.
    pub fn verify(&self) -> Result<(), ChainError> {
        let raw = alloy::hex::decode(&self.signature)
            .map_err(|e| ChainError::Signing(format!("signature is not hex: {e}")))?;
        let signature = Signature::try_from(raw.as_slice())
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        let expected = Address::from_str(&self.signer)
            .map_err(|e| ChainError::Signing(format!("invalid signer: {e}")))?;

        let message = Self::message(&self.signer, &self.chain, self.issued_at, self.expires_at);
        let recovered = signature
            .recover_address_from_msg(message.as_bytes())
            .map_err(|e| ChainError::Signing(e.to_string()))?;

        if recovered == expected {
            Ok(())
        } else {
            Err(ChainError::Signing(format!(
                "signature was made by {recovered}, not {expected}"
            )))
        }
    }
}
