// src/models/request.rs
//! Wire types for the attestation HTTP API.

use crate::models::claim::Attestation;
use serde::{Deserialize, Serialize};

/// Request payload for `POST /attest`.
///
/// Every field is optional at the serde layer so that a missing one surfaces
/// as `BadRequest` from the issuer rather than a framework rejection.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttestRequest {
    /// Subject address. `userAddress` is accepted for older frontends.
    #[serde(alias = "userAddress")]
    pub subject: Option<String>,
    pub age: Option<i64>,
    pub country_code: Option<i64>,
    pub policy_id: Option<String>,
}

/// Response for `POST /attest`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttestResponse {
    pub eligible: bool,
    pub policy_id: String,
    pub signature: String,
    pub verifier_address: String,
}

impl From<&Attestation> for AttestResponse {
    fn from(attestation: &Attestation) -> Self {
        Self {
            eligible: attestation.claim.eligible(),
            policy_id: attestation.claim.policy_id().to_string(),
            signature: attestation.signature_hex(),
            verifier_address: attestation.verifier_address_checksummed(),
        }
    }
}

/// Request payload for `POST /verify`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub subject: String,
    pub policy_id: String,
    pub eligible: bool,
    pub signature: String,
}

/// Response for `POST /verify`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub verifier_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attest_request_accepts_legacy_field_name() {
        let request: AttestRequest = serde_json::from_str(
            r#"{"userAddress":"0xabc","age":21,"countryCode":1}"#,
        )
        .unwrap();
        assert_eq!(request.subject.as_deref(), Some("0xabc"));
        assert_eq!(request.age, Some(21));
        assert_eq!(request.country_code, Some(1));
        assert!(request.policy_id.is_none());
    }

    #[test]
    fn test_attest_request_missing_age_still_parses() {
        let request: AttestRequest =
            serde_json::from_str(r#"{"subject":"0xabc","countryCode":1}"#).unwrap();
        assert!(request.age.is_none());
    }
}
