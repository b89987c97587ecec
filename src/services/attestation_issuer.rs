// src/services/attestation_issuer.rs
//! Attestation Issuer Service
//!
//! Turns an eligibility request into a signed attestation:
//! validate → evaluate → build claim → digest → sign → assemble.
//!
//! The issuer owns no mutable state besides the audit trail. The evaluator and
//! signer are injected once at startup so tests can substitute either.

use crate::error::{AttestationError, AttestationResult};
use crate::models::claim::{
    Attestation, AttributeSet, Claim, ATTR_AGE, ATTR_COUNTRY_CODE, MAX_POLICY_ID_LEN,
};
use crate::models::request::{AttestRequest, AttestResponse};
use crate::policy::evaluator::EligibilityEvaluator;
use crate::services::audit::AuditTrail;
use crate::utils::crypto::claim_digest;
use crate::wallet::key_management::AttestationSigner;
use ethers::types::Address;
use std::str::FromStr;
use std::sync::Arc;

/// Service issuing signed eligibility attestations.
#[derive(Clone)]
pub struct AttestationIssuer {
    /// Pluggable eligibility predicate
    evaluator: Arc<dyn EligibilityEvaluator>,

    /// The attestor key
    signer: Arc<dyn AttestationSigner>,

    /// Policy used when a request names none
    default_policy_id: String,

    audit: Arc<AuditTrail>,
}

impl AttestationIssuer {
    /// Creates a new AttestationIssuer instance
    ///
    /// # Arguments
    /// * `evaluator` - Eligibility predicate selected at startup
    /// * `signer` - Signing authority
    /// * `default_policy_id` - Policy applied when a request omits `policyId`
    /// * `audit` - Shared audit trail
    pub fn new(
        evaluator: Arc<dyn EligibilityEvaluator>,
        signer: Arc<dyn AttestationSigner>,
        default_policy_id: impl Into<String>,
        audit: Arc<AuditTrail>,
    ) -> Self {
        Self {
            evaluator,
            signer,
            default_policy_id: default_policy_id.into(),
            audit,
        }
    }

    /// Address of the signing authority.
    pub fn verifier_address(&self) -> Address {
        self.signer.address()
    }

    pub fn default_policy_id(&self) -> &str {
        &self.default_policy_id
    }

    /// Evaluates `attributes` under `policy_id` and signs the resulting claim.
    ///
    /// # Errors
    /// - `BadRequest` for an empty or malformed subject, empty attributes, or
    ///   an empty or overlong policy id. The signer is not touched.
    /// - `UnknownPolicy` / `InvalidAttributes` from the evaluator
    /// - `Internal` if signing itself fails
    pub fn issue(
        &self,
        subject: &str,
        attributes: &AttributeSet,
        policy_id: &str,
    ) -> AttestationResult<Attestation> {
        let subject = parse_subject(subject)?;
        if attributes.is_empty() {
            return Err(AttestationError::BadRequest("attributes are required".into()));
        }
        check_policy_id(policy_id)?;

        let eligible = self.evaluator.evaluate(attributes, policy_id)?;
        let claim = Claim::new(subject, policy_id, eligible)?;
        let signature = self.signer.sign_digest(claim_digest(&claim))?;

        self.audit
            .record(format!("0x{:x}", subject), policy_id.to_string(), eligible);

        Ok(Attestation {
            claim,
            signature,
            verifier_address: self.signer.address(),
        })
    }

    /// Handles a wire request: required fields, default policy, then [`issue`](Self::issue).
    pub fn handle(&self, request: &AttestRequest) -> AttestationResult<AttestResponse> {
        let subject = request
            .subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AttestationError::BadRequest("subject is required".into()))?;
        let age = request
            .age
            .ok_or_else(|| AttestationError::BadRequest("age is required".into()))?;
        let country_code = request
            .country_code
            .ok_or_else(|| AttestationError::BadRequest("countryCode is required".into()))?;
        let policy_id = request
            .policy_id
            .as_deref()
            .unwrap_or(&self.default_policy_id);

        let attributes = AttributeSet::new()
            .with(ATTR_AGE, age)
            .with(ATTR_COUNTRY_CODE, country_code);

        let attestation = self.issue(subject, &attributes, policy_id)?;
        Ok(AttestResponse::from(&attestation))
    }
}

/// Rejects an empty policy id or one too long for the canonical encoding.
pub fn check_policy_id(policy_id: &str) -> AttestationResult<()> {
    if policy_id.is_empty() {
        return Err(AttestationError::BadRequest("policyId is required".into()));
    }
    if policy_id.len() > MAX_POLICY_ID_LEN {
        return Err(AttestationError::BadRequest(format!(
            "policyId exceeds {} bytes",
            MAX_POLICY_ID_LEN
        )));
    }
    Ok(())
}

fn parse_subject(subject: &str) -> AttestationResult<Address> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(AttestationError::BadRequest("subject is required".into()));
    }
    if !subject.starts_with("0x") || subject.len() != 42 {
        return Err(AttestationError::BadRequest(
            "subject must be a 0x-prefixed 20-byte address".into(),
        ));
    }
    Address::from_str(subject)
        .map_err(|_| AttestationError::BadRequest("subject is not a valid address".into()))
}
