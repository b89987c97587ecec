// src/services/verifier.rs
//! Attestation verification.
//!
//! [`verify`] is the off-chain twin of `KYCProofSale.checkAttestation`: it
//! rebuilds the canonical digest from the claim, recovers the signer and
//! compares it with the trusted address. A `false` result is an ordinary
//! outcome (tampered claim, wrong signer, garbage signature), not an error.

use crate::models::claim::Claim;
use crate::utils::crypto::recover_signer;
use ethers::types::{Address, Signature};
use std::str::FromStr;

/// Checks `signature` over `claim` against `trusted_verifier`.
///
/// Pure: depends on nothing but its arguments.
pub fn verify(claim: &Claim, signature: &Signature, trusted_verifier: Address) -> bool {
    match recover_signer(claim, signature) {
        Some(signer) if signer == trusted_verifier => true,
        Some(signer) => {
            log::debug!(
                "attestation signer mismatch: recovered 0x{:x}, trusted 0x{:x}",
                signer,
                trusted_verifier
            );
            false
        }
        None => {
            log::debug!("attestation signature not recoverable");
            false
        }
    }
}

/// Verifier bound to the configured trusted attestor address.
#[derive(Debug, Clone, Copy)]
pub struct Verifier {
    trusted_verifier: Address,
}

impl Verifier {
    pub fn new(trusted_verifier: Address) -> Self {
        Self { trusted_verifier }
    }

    pub fn trusted_verifier(&self) -> Address {
        self.trusted_verifier
    }

    pub fn verify(&self, claim: &Claim, signature: &Signature) -> bool {
        verify(claim, signature, self.trusted_verifier)
    }

    /// Verifies wire-format input: hex subject and hex signature.
    ///
    /// Undecodable input verifies as `false` like any other bad attestation.
    pub fn verify_encoded(
        &self,
        subject: &str,
        policy_id: &str,
        eligible: bool,
        signature: &str,
    ) -> bool {
        let subject = match Address::from_str(subject.trim()) {
            Ok(subject) => subject,
            Err(_) => return false,
        };
        let signature = match Signature::from_str(signature.trim()) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        match Claim::new(subject, policy_id, eligible) {
            Ok(claim) => self.verify(&claim, &signature),
            Err(_) => false,
        }
    }
}
