// src/services/sale_gate.rs
//! In-process model of the `KYCProofSale.purchase` gate.
//!
//! Same checks in the same order as the contract: verify the attestation
//! against the stored verifier, require `eligible`, require the payment to
//! cover `price`, then record the contribution. Any rejection leaves the
//! ledger untouched, like a reverted transaction.

use crate::models::claim::Claim;
use crate::services::verifier::verify;
use ethers::types::{Address, Signature, U256};
use std::collections::HashMap;
use thiserror::Error;

/// Why a purchase was refused. Matches the contract's revert reasons.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    #[error("invalid attestation")]
    InvalidAttestation,

    #[error("subject not eligible")]
    NotEligible,

    #[error("insufficient payment")]
    InsufficientPayment,
}

/// Sale gate holding the trusted verifier and per-subject contributions.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SaleGate {
    verifier_signer: Address,
    price: U256,
    contributions: HashMap<Address, U256>,
}

#[allow(dead_code)]
impl SaleGate {
    pub fn new(verifier_signer: Address, price: U256) -> Self {
        Self {
            verifier_signer,
            price,
            contributions: HashMap::new(),
        }
    }

    pub fn verifier_signer(&self) -> Address {
        self.verifier_signer
    }

    pub fn price(&self) -> U256 {
        self.price
    }

    /// `checkAttestation`: signature validity only, eligibility not consulted.
    pub fn check_attestation(&self, claim: &Claim, signature: &Signature) -> bool {
        verify(claim, signature, self.verifier_signer)
    }

    /// `purchase`: gated state transition.
    pub fn purchase(
        &mut self,
        claim: &Claim,
        signature: &Signature,
        amount: U256,
    ) -> Result<(), GateRejection> {
        if !self.check_attestation(claim, signature) {
            return Err(GateRejection::InvalidAttestation);
        }
        if !claim.eligible() {
            return Err(GateRejection::NotEligible);
        }
        if amount < self.price {
            return Err(GateRejection::InsufficientPayment);
        }

        let entry = self.contributions.entry(claim.subject()).or_default();
        *entry = entry.saturating_add(amount);
        log::info!(
            "purchase accepted: subject=0x{:x} policy={} amount={}",
            claim.subject(),
            claim.policy_id(),
            amount
        );
        Ok(())
    }

    pub fn contribution_of(&self, subject: Address) -> U256 {
        self.contributions.get(&subject).copied().unwrap_or_default()
    }
}
