// src/main.rs

//! # KYC Eligibility Attestor - Main Entry Point
//!
//! Evaluates an age/jurisdiction policy for a subject and returns an
//! attestation signed by the attestor key. The `KYCProofSale` contract (see
//! `contracts/`) checks that signature before allowing a purchase.
//!
//! ## Architecture Overview
//! 1. **Policy Layer**: pluggable `EligibilityEvaluator`
//! 2. **Protocol Layer**: canonical claim encoding, Keccak-256 digest, EIP-191 signing
//! 3. **Services Layer**: issuer, verifier, sale gate model, HTTP API
//! 4. **Blockchain Layer**: read-only `SaleClient` for the deployed contract
//!
//! ## Configuration (see `settings.rs`)
//! - `ATTESTOR_SIGNING_KEY` / `VERIFIER_PRIV_KEY`: attestor private key (required)
//! - `ATTESTOR_DEFAULT_POLICY_ID` / `POLICY_ID`: default policy (default `KYC_ELIGIBLE`)
//! - `ATTESTOR_COUNTRY_ALLOWED` / `COUNTRY_CODE_ALLOWED`: allowed country code (default 1)
//! - `ATTESTOR_BIND_ADDRESS`: listen address (default `127.0.0.1:8080`)
//! - `ATTESTOR_RPC_URL`, `ATTESTOR_SALE_CONTRACT_ADDRESS`: optional on-chain check

use crate::blockchain::sale_client::SaleClient;
use crate::models::claim::{Attestation, Claim};
use crate::policy::evaluator::{AgeJurisdictionRule, EligibilityEvaluator, PlaintextEvaluator};
use crate::services::api_server::ApiServer;
use crate::services::attestation_issuer::{check_policy_id, AttestationIssuer};
use crate::services::audit::AuditTrail;
use crate::services::verifier::Verifier;
use crate::settings::Settings;
use crate::utils::crypto::claim_digest;
use crate::wallet::key_management::{AttestationSigner, SigningAuthority};
use anyhow::Context;
use dotenv::dotenv;
use ethers::types::Address;
use ethers::utils::to_checksum;
use std::net::SocketAddr;
use std::sync::Arc;

// Module declarations (organized by functional domain)
mod blockchain;    // Sale contract binding
mod error;         // Error taxonomy
mod models;        // Claims, attestations, wire types
mod policy;        // Eligibility evaluation
mod services;      // Issuer, verifier, API
mod settings;      // Configuration loading
mod utils;         // Canonical encoding and digests
mod wallet;        // Signing authority

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load configuration
/// 2. Construct the signing authority (fatal if the key is unusable)
/// 3. Wire evaluator, issuer, verifier
/// 4. Optionally confirm the on-chain verifier
/// 5. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load().context("failed to load configuration")?;
    log::debug!("loaded {:?}", settings);

    // No key, no service.
    let authority = Arc::new(
        SigningAuthority::from_hex(settings.signing_key.as_deref())
            .context("refusing to start without a usable signing key")?,
    );
    let verifier_address = authority.address();
    log::info!("verifier signer address: {}", to_checksum(&verifier_address, None));

    let evaluator = PlaintextEvaluator::new(settings.country_allowed).with_policy(
        &settings.default_policy_id,
        AgeJurisdictionRule {
            min_age: 18,
            country_allowed: settings.country_allowed,
        },
    );

    check_default_policy(&evaluator, &settings.default_policy_id)?;

    let audit = Arc::new(AuditTrail::default());
    let issuer = AttestationIssuer::new(
        Arc::new(evaluator),
        authority.clone(),
        settings.default_policy_id.clone(),
        audit.clone(),
    );
    let verifier = Verifier::new(verifier_address);

    if let (Some(rpc_url), Some(contract)) = (&settings.rpc_url, &settings.sale_contract_address) {
        if let Err(e) = check_sale_contract(rpc_url, contract, authority.as_ref()).await {
            log::warn!("on-chain verifier check skipped: {:#}", e);
        }
    }

    let addr: SocketAddr = settings
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.bind_address))?;

    log::info!("Available endpoints:");
    log::info!("- GET  /");
    log::info!("- POST /attest");
    log::info!("- POST /verify");
    log::info!("- GET  /audit-log");

    ApiServer::new(issuer, verifier, audit).run(addr).await
}

/// Fails startup when requests without a `policyId` could never be served.
fn check_default_policy(
    evaluator: &dyn EligibilityEvaluator,
    default_policy_id: &str,
) -> anyhow::Result<()> {
    check_policy_id(default_policy_id)
        .with_context(|| format!("invalid default_policy_id {:?}", default_policy_id))?;
    anyhow::ensure!(
        evaluator.supports(default_policy_id),
        "default_policy_id {} has no registered rule",
        default_policy_id
    );
    Ok(())
}

/// Confirms the deployed sale contract trusts this signer and accepts a
/// probe attestation. Mismatches are logged, not fatal.
async fn check_sale_contract(
    rpc_url: &str,
    contract: &str,
    authority: &SigningAuthority,
) -> anyhow::Result<()> {
    let client = SaleClient::new(rpc_url, contract)?;

    if !client.trusts(authority.address()).await? {
        let on_chain = client.verifier_signer().await?;
        log::warn!(
            "sale contract {} trusts {}, not this signer {}",
            to_checksum(&client.address(), None),
            to_checksum(&on_chain, None),
            to_checksum(&authority.address(), None)
        );
        return Ok(());
    }

    // Probe claim for the zero address; never handed to anyone.
    let claim = Claim::new(Address::zero(), "ATTESTOR_SELF_CHECK", false)?;
    let signature = authority.sign_digest(claim_digest(&claim))?;
    let probe = Attestation {
        claim,
        signature,
        verifier_address: authority.address(),
    };

    if client.check_attestation(&probe).await? {
        log::info!("sale contract {} accepts this signer", to_checksum(&client.address(), None));
    } else {
        log::warn!("sale contract rejected a probe attestation; claim encoding may differ");
    }
    Ok(())
}
