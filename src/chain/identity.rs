// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read identity derived from a fixed seed.
//!
//! The key is `sha256(seed)` interpreted as a secp256k1 secret. With the
//! default `//Alice` seed every deployment shares the same key, so it is a
//! placeholder identity for authorizing reads and nothing else.

use alloy::{
    primitives::{Address, Signature},
    signers::{local::PrivateKeySigner, SignerSync},
};
use sha2::{Digest, Sha256};

use super::ChainError;

/// Keypair used to sign read credentials.
#[derive(Clone)]
pub struct Identity {
    signer: PrivateKeySigner,
}

impl Identity {
    /// Derive the identity for `seed`. Same seed, same key.
    pub fn from_seed(seed: &str) -> Result<Self, ChainError> {
        let key_bytes = Sha256::digest(seed.as_bytes());
        let signer = PrivateKeySigner::from_slice(&key_bytes[..])
            .map_err(|e| ChainError::InvalidSeed(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Account address of this identity.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign an arbitrary message (EIP-191 prefixed).
    pub fn sign(&self, message: &[u8]) -> Result<Signature, ChainError> {
        self.signer
            .sign_message_sync(message)
            .map_err(|e| ChainError::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
