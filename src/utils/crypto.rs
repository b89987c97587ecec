// src/utils/crypto.rs
//! Digest and signature primitives for claim attestations.
//!
//! Uses Keccak-256 (Ethereum's standard hash function) so the same digest can
//! be recomputed inside a contract with `keccak256(...)`.
//!
//! Protocol constant: the authority signs the EIP-191 personal-message hash of
//! the 32-byte claim digest, never the raw digest.

use crate::models::claim::Claim;
use crate::utils::serialization::encode_claim;
use ethers::types::{Address, RecoveryMessage, Signature, H256, U256};
use ethers::utils::{hash_message, keccak256};
use once_cell::sync::Lazy;

/// Half of the secp256k1 group order. Signatures with a larger `s` are
/// malleated twins and are rejected, as OpenZeppelin's `ECDSA` does.
static SECP256K1_HALF_ORDER: Lazy<U256> = Lazy::new(|| {
    U256::from_big_endian(&[
        0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b,
        0x20, 0xa0,
    ])
});

/// Computes a Keccak-256 hash of the input data.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    keccak256(data)
}

/// Keccak-256 of the canonical claim bytes.
pub fn claim_digest(claim: &Claim) -> H256 {
    H256::from(hash_data(&encode_claim(claim)))
}

/// `keccak256("\x19Ethereum Signed Message:\n32" || digest)`.
pub fn signing_hash(digest: H256) -> H256 {
    hash_message(digest.as_bytes())
}

/// True when `v` is 27/28 and `s` is in the lower half of the curve order.
pub fn is_canonical_signature(signature: &Signature) -> bool {
    (signature.v == 27 || signature.v == 28)
        && !signature.r.is_zero()
        && !signature.s.is_zero()
        && signature.s <= *SECP256K1_HALF_ORDER
}

/// Recovers the address that signed `claim`, or `None` if the signature is
/// non-canonical or does not recover to a point.
pub fn recover_signer(claim: &Claim, signature: &Signature) -> Option<Address> {
    if !is_canonical_signature(signature) {
        return None;
    }
    let hash = signing_hash(claim_digest(claim));
    signature.recover(RecoveryMessage::Hash(hash)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_data_matches_known_vector() {
        // keccak256("") is a well-known constant.
        let empty = hash_data(b"");
        assert_eq!(
            ethers::utils::hex::encode(empty),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_signing_hash_differs_from_digest() {
        let claim = Claim::new(Address::repeat_byte(0xab), "KYC_ELIGIBLE", true).unwrap();
        let digest = claim_digest(&claim);
        assert_ne!(signing_hash(digest), digest);
        assert_eq!(signing_hash(digest), signing_hash(claim_digest(&claim)));
    }

    #[test]
    fn test_signing_hash_uses_32_byte_prefix() {
        let digest = H256::repeat_byte(0x42);
        let mut preimage = b"\x19Ethereum Signed Message:\n32".to_vec();
        preimage.extend_from_slice(digest.as_bytes());
        assert_eq!(signing_hash(digest), H256::from(keccak256(preimage)));
    }

    #[test]
    fn test_non_canonical_signatures_rejected() {
        let base = Signature {
            r: U256::one(),
            s: U256::one(),
            v: 27,
        };
        assert!(is_canonical_signature(&base));
        assert!(!is_canonical_signature(&Signature { v: 1, ..base }));
        assert!(!is_canonical_signature(&Signature { v: 29, ..base }));
        assert!(!is_canonical_signature(&Signature {
            s: *SECP256K1_HALF_ORDER + U256::one(),
            ..base
        }));
        assert!(!is_canonical_signature(&Signature {
            r: U256::zero(),
            ..base
        }));
    }
}
