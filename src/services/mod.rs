// src/services/mod.rs
pub mod api_server;
pub mod attestation_issuer;
pub mod audit;
pub mod sale_gate;
pub mod verifier;
