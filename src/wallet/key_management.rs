// src/wallet/key_management.rs
//! Signing authority for eligibility attestations.
//!
//! Holds the attestor's secp256k1 key in memory and signs claim digests with
//! the EIP-191 wrapping fixed in [`crate::utils::crypto::signing_hash`].
//!
//! Uses the following cryptographic primitives:
//! - secp256k1 curve (via `k256` crate)
//! - Keccak-256 hashing and recoverable signatures (via `ethers` crate)

use crate::error::{AttestationError, AttestationResult};
use crate::utils::crypto::signing_hash;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Signature, H256};
use ethers::utils::hex;
use k256::ecdsa::SigningKey;
use std::fmt;

/// Anything able to sign claim digests on behalf of the attestor.
///
/// The issuer only sees this trait, so tests can substitute a fixed or
/// instrumented key.
pub trait AttestationSigner: Send + Sync {
    /// Address every verifier trusts for this signer.
    fn address(&self) -> Address;

    /// Signs the EIP-191 hash of `digest`.
    fn sign_digest(&self, digest: H256) -> AttestationResult<Signature>;
}

/// The process-wide attestor key.
///
/// Constructed once at startup. Signing is deterministic (RFC 6979) and takes
/// `&self`, so concurrent requests share it through an `Arc` without a lock.
#[derive(Clone)]
pub struct SigningAuthority {
    wallet: LocalWallet,
}

impl SigningAuthority {
    /// Loads the key from hex (with or without `0x`).
    ///
    /// # Errors
    /// `SigningUnavailable` if the key is absent, not hex, or not a valid
    /// secp256k1 scalar. The message never echoes key material.
    pub fn from_hex(private_key: Option<&str>) -> AttestationResult<Self> {
        let private_key = private_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AttestationError::SigningUnavailable("signing key not configured".into()))?;

        let bytes = hex::decode(private_key.trim_start_matches("0x"))
            .map_err(|_| AttestationError::SigningUnavailable("signing key is not valid hex".into()))?;
        if bytes.len() != 32 {
            return Err(AttestationError::SigningUnavailable(format!(
                "signing key must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        let signing_key = SigningKey::from_slice(&bytes).map_err(|_| {
            AttestationError::SigningUnavailable("signing key is not a valid secp256k1 scalar".into())
        })?;

        Ok(Self {
            wallet: LocalWallet::from(signing_key),
        })
    }
}

impl AttestationSigner for SigningAuthority {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    fn sign_digest(&self, digest: H256) -> AttestationResult<Signature> {
        self.wallet
            .sign_hash(signing_hash(digest))
            .map_err(|e| AttestationError::Internal(format!("signing failed: {}", e)))
    }
}

impl fmt::Debug for SigningAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningAuthority")
            .field("address", &self.wallet.address())
            .finish_non_exhaustive()
    }
}
