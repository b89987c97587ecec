// src/utils/serialization.rs
//! Canonical byte encoding of eligibility claims.
//!
//! Version 1 layout, fixed forever:
//!
//! | offset    | width | content                                  |
//! |-----------|-------|------------------------------------------|
//! | 0         | 1     | version tag `0x01`                       |
//! | 1         | 20    | subject address                          |
//! | 21        | 2     | policy id byte length, big-endian `u16`  |
//! | 23        | len   | policy id, UTF-8                         |
//! | 23 + len  | 1     | eligible, `0x01` or `0x00`               |
//!
//! Solidity reproduces it with
//! `abi.encodePacked(bytes1(0x01), subject, uint16(bytes(policyId).length), policyId, eligible)`.
//! Adding a field means a new version tag, never a reordering.

use crate::models::claim::Claim;

/// Version tag prefixed to every encoded claim.
pub const CLAIM_ENCODING_VERSION: u8 = 0x01;

const ELIGIBLE_TRUE: u8 = 0x01;
const ELIGIBLE_FALSE: u8 = 0x00;

/// Encodes a claim into its canonical bytes.
///
/// Infallible: `Claim::new` already bounds the policy id to `u16` range.
pub fn encode_claim(claim: &Claim) -> Vec<u8> {
    let policy_id = claim.policy_id().as_bytes();
    let mut out = Vec::with_capacity(1 + 20 + 2 + policy_id.len() + 1);

    out.push(CLAIM_ENCODING_VERSION);
    out.extend_from_slice(claim.subject().as_bytes());
    out.extend_from_slice(&(policy_id.len() as u16).to_be_bytes());
    out.extend_from_slice(policy_id);
    out.push(if claim.eligible() {
        ELIGIBLE_TRUE
    } else {
        ELIGIBLE_FALSE
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::claim::MAX_POLICY_ID_LEN;
    use ethers::types::Address;

    fn subject(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from(bytes)
    }

    #[test]
    fn test_golden_layout() {
        let claim = Claim::new(subject(0x01), "AB", true).unwrap();
        let mut expected = vec![0x01];
        expected.extend_from_slice(&[0u8; 19]);
        expected.push(0x01);
        expected.extend_from_slice(&[0x00, 0x02, b'A', b'B', 0x01]);
        assert_eq!(encode_claim(&claim), expected);
    }

    #[test]
    fn test_golden_digest() {
        use crate::utils::crypto::{claim_digest, signing_hash};
        use ethers::utils::hex;

        // Same value `KYCProofSale.claimDigest` returns for this claim.
        let claim = Claim::new(Address::repeat_byte(0xab), "KYC_POLICY_V1", true).unwrap();
        let digest = claim_digest(&claim);
        assert_eq!(
            hex::encode(digest.as_bytes()),
            "8a7fa7c9472354cee8c6d271549d83f1ea7d8a7cbbd124d8ce5f156d21dc8adc"
        );
        assert_eq!(
            hex::encode(signing_hash(digest).as_bytes()),
            "b756c4cc38e60b3b8064f27a525a4faa4a4e9517caed083e76039e8f1dab5e08"
        );

        let short = Claim::new(subject(0x01), "AB", true).unwrap();
        assert_eq!(
            hex::encode(claim_digest(&short).as_bytes()),
            "3802d8b5761ec88e812e1c42a2c593d59ed62652b2af00a7ff6e189a7b26372f"
        );
    }

    #[test]
    fn test_eligible_flag_is_last_byte() {
        let yes = encode_claim(&Claim::new(subject(7), "KYC_POLICY_V1", true).unwrap());
        let no = encode_claim(&Claim::new(subject(7), "KYC_POLICY_V1", false).unwrap());
        assert_ne!(yes, no);
        assert_eq!(yes[..yes.len() - 1], no[..no.len() - 1]);
        assert_eq!(*yes.last().unwrap(), 0x01);
        assert_eq!(*no.last().unwrap(), 0x00);
    }

    #[test]
    fn test_empty_policy_id() {
        let encoded = encode_claim(&Claim::new(subject(1), "", false).unwrap());
        assert_eq!(encoded.len(), 1 + 20 + 2 + 1);
        assert_eq!(&encoded[21..23], &[0x00, 0x00]);
    }

    #[test]
    fn test_maximum_policy_id() {
        let id = "Z".repeat(MAX_POLICY_ID_LEN);
        let encoded = encode_claim(&Claim::new(subject(1), id, true).unwrap());
        assert_eq!(encoded.len(), 1 + 20 + 2 + MAX_POLICY_ID_LEN + 1);
        assert_eq!(&encoded[21..23], &(MAX_POLICY_ID_LEN as u16).to_be_bytes());
    }

    #[test]
    fn test_injective_over_boundary_claims() {
        // The length prefix keeps "A" + eligible byte apart from "A\u{1}" etc.
        let claims = vec![
            Claim::new(subject(1), "", false).unwrap(),
            Claim::new(subject(1), "", true).unwrap(),
            Claim::new(subject(2), "", false).unwrap(),
            Claim::new(subject(1), "A", false).unwrap(),
            Claim::new(subject(1), "A", true).unwrap(),
            Claim::new(subject(1), "A\u{1}", false).unwrap(),
            Claim::new(subject(1), "AA", true).unwrap(),
            Claim::new(subject(1), "Z".repeat(MAX_POLICY_ID_LEN), false).unwrap(),
            Claim::new(subject(1), "Z".repeat(MAX_POLICY_ID_LEN), true).unwrap(),
            Claim::new(subject(1), "Z".repeat(MAX_POLICY_ID_LEN - 1), true).unwrap(),
        ];

        for (i, a) in claims.iter().enumerate() {
            for (j, b) in claims.iter().enumerate() {
                if i != j {
                    assert_ne!(encode_claim(a), encode_claim(b), "claims {} and {}", i, j);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let claim = Claim::new(subject(9), "KYC_ELIGIBLE", true).unwrap();
        assert_eq!(encode_claim(&claim), encode_claim(&claim.clone()));
    }
}
