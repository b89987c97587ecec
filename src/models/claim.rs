// src/models/claim.rs
//! Eligibility claim and attestation data model.
//!
//! A [`Claim`] is the exact tuple the authority signs: who, under which policy,
//! and the yes/no decision. Attribute values (age, country) never enter a claim.

use crate::error::{AttestationError, AttestationResult};
use ethers::types::{Address, Signature};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Longest policy id, in UTF-8 bytes, that fits the canonical encoding.
pub const MAX_POLICY_ID_LEN: usize = 256;

/// Attribute name for the subject's age in years.
pub const ATTR_AGE: &str = "age";

/// Attribute name for the subject's numeric country code.
pub const ATTR_COUNTRY_CODE: &str = "countryCode";

/// Immutable `(subject, policy id, eligible)` tuple covered by the signature.
///
/// Fields are private so a claim cannot drift after it has been hashed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "RawClaim")]
pub struct Claim {
    subject: Address,
    policy_id: String,
    eligible: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClaim {
    subject: Address,
    policy_id: String,
    eligible: bool,
}

impl TryFrom<RawClaim> for Claim {
    type Error = AttestationError;

    fn try_from(raw: RawClaim) -> Result<Self, Self::Error> {
        Claim::new(raw.subject, raw.policy_id, raw.eligible)
    }
}

impl Claim {
    /// Builds a claim, rejecting policy ids that cannot be length-prefixed.
    pub fn new(
        subject: Address,
        policy_id: impl Into<String>,
        eligible: bool,
    ) -> AttestationResult<Self> {
        let policy_id = policy_id.into();
        if policy_id.len() > MAX_POLICY_ID_LEN {
            return Err(AttestationError::BadRequest(format!(
                "policyId exceeds {} bytes",
                MAX_POLICY_ID_LEN
            )));
        }
        Ok(Self {
            subject,
            policy_id,
            eligible,
        })
    }

    pub fn subject(&self) -> Address {
        self.subject
    }

    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    pub fn eligible(&self) -> bool {
        self.eligible
    }
}

/// Per-request attribute values keyed by name.
///
/// `Debug` prints names only; values must not reach logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    values: BTreeMap<String, i64>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: i64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: i64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSet")
            .field("names", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A claim together with the authority's signature and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub claim: Claim,
    pub signature: Signature,
    pub verifier_address: Address,
}

impl Attestation {
    /// `0x`-prefixed hex of the 65-byte `r || s || v` signature.
    pub fn signature_hex(&self) -> String {
        format!("0x{}", ethers::utils::hex::encode(self.signature.to_vec()))
    }

    /// EIP-55 checksummed verifier address.
    pub fn verifier_address_checksummed(&self) -> String {
        to_checksum(&self.verifier_address, None)
    }
}
