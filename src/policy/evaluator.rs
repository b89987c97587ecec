// src/policy/evaluator.rs
//! Eligibility evaluation against versioned policies.
//!
//! The issuer depends only on [`EligibilityEvaluator`]. Today the single
//! implementation is [`PlaintextEvaluator`], which sees attribute values in
//! the clear; a confidential-computation backend can replace it without
//! touching the issuer.

use crate::error::{AttestationError, AttestationResult};
use crate::models::claim::{AttributeSet, ATTR_AGE, ATTR_COUNTRY_CODE};
use std::collections::HashMap;

/// Policy id used by deployments that predate versioned ids.
pub const KYC_ELIGIBLE: &str = "KYC_ELIGIBLE";

/// First versioned age-and-jurisdiction policy.
pub const KYC_POLICY_V1: &str = "KYC_POLICY_V1";

/// Oldest age accepted as plausible input.
pub const MAX_PLAUSIBLE_AGE: i64 = 150;

/// Decides eligibility for a subject from their attributes.
///
/// Implementations must be pure: same inputs, same answer, no I/O.
pub trait EligibilityEvaluator: Send + Sync {
    /// # Errors
    /// - `UnknownPolicy` if `policy_id` is not registered
    /// - `InvalidAttributes` if a required attribute is missing or out of range
    fn evaluate(&self, attributes: &AttributeSet, policy_id: &str) -> AttestationResult<bool>;

    /// True when `policy_id` can be evaluated.
    fn supports(&self, policy_id: &str) -> bool;
}

/// Predicate behind a policy id. Semantics never change for an existing id;
/// a different rule gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeJurisdictionRule {
    pub min_age: i64,
    pub country_allowed: i64,
}

impl AgeJurisdictionRule {
    fn holds(&self, age: i64, country_code: i64) -> bool {
        age >= self.min_age && country_code == self.country_allowed
    }
}

/// Plaintext evaluator over a fixed table of policies.
#[derive(Debug, Clone)]
pub struct PlaintextEvaluator {
    policies: HashMap<String, AgeJurisdictionRule>,
}

impl PlaintextEvaluator {
    /// Registers the built-in policies (`KYC_ELIGIBLE`, `KYC_POLICY_V1`):
    /// adult (18+) in `country_allowed`.
    pub fn new(country_allowed: i64) -> Self {
        let adult = AgeJurisdictionRule {
            min_age: 18,
            country_allowed,
        };
        let mut policies = HashMap::new();
        policies.insert(KYC_ELIGIBLE.to_string(), adult);
        policies.insert(KYC_POLICY_V1.to_string(), adult);
        Self { policies }
    }

    /// Adds or replaces a policy. Only meant for startup wiring.
    pub fn with_policy(mut self, policy_id: &str, rule: AgeJurisdictionRule) -> Self {
        self.policies.insert(policy_id.to_string(), rule);
        self
    }

    fn required(attributes: &AttributeSet, name: &str) -> AttestationResult<i64> {
        let value = attributes
            .get(name)
            .ok_or_else(|| AttestationError::InvalidAttributes(format!("{} is required", name)))?;
        if value < 0 {
            return Err(AttestationError::InvalidAttributes(format!(
                "{} must not be negative",
                name
            )));
        }
        Ok(value)
    }
}

impl EligibilityEvaluator for PlaintextEvaluator {
    fn evaluate(&self, attributes: &AttributeSet, policy_id: &str) -> AttestationResult<bool> {
        let rule = self
            .policies
            .get(policy_id)
            .ok_or_else(|| AttestationError::UnknownPolicy(policy_id.to_string()))?;

        let age = Self::required(attributes, ATTR_AGE)?;
        if age > MAX_PLAUSIBLE_AGE {
            return Err(AttestationError::InvalidAttributes(format!(
                "{} exceeds {}",
                ATTR_AGE, MAX_PLAUSIBLE_AGE
            )));
        }
        let country_code = Self::required(attributes, ATTR_COUNTRY_CODE)?;

        Ok(rule.holds(age, country_code))
    }

    fn supports(&self, policy_id: &str) -> bool {
        self.policies.contains_key(policy_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: i64 = 1;
    const DISALLOWED: i64 = 44;

    fn attributes(age: i64, country_code: i64) -> AttributeSet {
        AttributeSet::new()
            .with(ATTR_AGE, age)
            .with(ATTR_COUNTRY_CODE, country_code)
    }

    #[test]
    fn test_age_threshold() {
        let evaluator = PlaintextEvaluator::new(ALLOWED);
        assert!(!evaluator.evaluate(&attributes(17, ALLOWED), KYC_POLICY_V1).unwrap());
        assert!(evaluator.evaluate(&attributes(18, ALLOWED), KYC_POLICY_V1).unwrap());
    }

    #[test]
    fn test_disallowed_country() {
        let evaluator = PlaintextEvaluator::new(ALLOWED);
        assert!(!evaluator.evaluate(&attributes(25, DISALLOWED), KYC_POLICY_V1).unwrap());
    }

    #[test]
    fn test_deterministic() {
        let evaluator = PlaintextEvaluator::new(ALLOWED);
        let input = attributes(30, ALLOWED);
        let first = evaluator.evaluate(&input, KYC_ELIGIBLE);
        let second = evaluator.evaluate(&input, KYC_ELIGIBLE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_policy() {
        let evaluator = PlaintextEvaluator::new(ALLOWED);
        assert_eq!(
            evaluator.evaluate(&attributes(30, ALLOWED), "KYC_POLICY_V9"),
            Err(AttestationError::UnknownPolicy("KYC_POLICY_V9".into()))
        );
        assert!(!evaluator.supports("KYC_POLICY_V9"));
    }

    #[test]
    fn test_missing_attribute() {
        let evaluator = PlaintextEvaluator::new(ALLOWED);
        let only_age = AttributeSet::new().with(ATTR_AGE, 30);
        assert!(matches!(
            evaluator.evaluate(&only_age, KYC_POLICY_V1),
            Err(AttestationError::InvalidAttributes(_))
        ));
    }

    #[test]
    fn test_out_of_range_attributes() {
        let evaluator = PlaintextEvaluator::new(ALLOWED);
        for (age, country) in [(-1, ALLOWED), (151, ALLOWED), (30, -5)] {
            assert!(matches!(
                evaluator.evaluate(&attributes(age, country), KYC_POLICY_V1),
                Err(AttestationError::InvalidAttributes(_))
            ));
        }
    }

    #[test]
    fn test_custom_policy() {
        let evaluator = PlaintextEvaluator::new(ALLOWED).with_policy(
            "KYC_POLICY_V2_21PLUS",
            AgeJurisdictionRule {
                min_age: 21,
                country_allowed: ALLOWED,
            },
        );
        assert!(!evaluator
            .evaluate(&attributes(20, ALLOWED), "KYC_POLICY_V2_21PLUS")
            .unwrap());
        assert!(evaluator.evaluate(&attributes(20, ALLOWED), KYC_POLICY_V1).unwrap());
    }
}
