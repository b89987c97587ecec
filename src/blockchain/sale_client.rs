// src/blockchain/sale_client.rs
//! Client for the deployed `KYCProofSale` contract.
//!
//! Read-only: the attestor never sends sale transactions itself. It uses the
//! contract to confirm that the on-chain `verifierSigner` is its own address
//! and to run `checkAttestation` as an end-to-end sanity check.

use crate::models::claim::Attestation;
use anyhow::Context;
use ethers::providers::{Http, Provider};
use ethers_contract::{BaseContract, Contract};
use ethers_core::{
    abi::Abi,
    types::{Address, Bytes},
};
use std::str::FromStr;
use std::sync::Arc;

const SALE_ABI: &[u8] = include_bytes!("abi/KYCProofSale.json");

/// Read-only binding to a `KYCProofSale` deployment.
#[derive(Clone)]
pub struct SaleClient {
    contract: Contract<Provider<Http>>,
}

impl SaleClient {
    /// Creates a client for the sale contract at `contract_address`.
    ///
    /// # Errors
    /// Returns error if the RPC URL or contract address is malformed, or the
    /// bundled ABI fails to parse.
    pub fn new(rpc_url: &str, contract_address: &str) -> anyhow::Result<Self> {
        let provider = Arc::new(
            Provider::<Http>::try_from(rpc_url).with_context(|| format!("invalid RPC URL {}", rpc_url))?,
        );
        let address = Address::from_str(contract_address)
            .with_context(|| format!("invalid sale contract address {}", contract_address))?;
        let abi = Abi::load(SALE_ABI).context("failed to load KYCProofSale ABI")?;

        Ok(Self {
            contract: Contract::new(address, BaseContract::from(abi), provider),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Reads `verifierSigner()` from contract state.
    pub async fn verifier_signer(&self) -> anyhow::Result<Address> {
        self.contract
            .method::<_, Address>("verifierSigner", ())?
            .call()
            .await
            .context("verifierSigner() call failed")
    }

    /// Runs `checkAttestation(...)` on-chain for an issued attestation.
    pub async fn check_attestation(&self, attestation: &Attestation) -> anyhow::Result<bool> {
        let claim = &attestation.claim;
        let params = (
            claim.subject(),
            claim.policy_id().to_string(),
            claim.eligible(),
            Bytes::from(attestation.signature.to_vec()),
        );
        self.contract
            .method::<_, bool>("checkAttestation", params)?
            .call()
            .await
            .context("checkAttestation() call failed")
    }

    /// True when the contract trusts `expected` as its verifier.
    pub async fn trusts(&self, expected: Address) -> anyhow::Result<bool> {
        Ok(self.verifier_signer().await? == expected)
    }
}
