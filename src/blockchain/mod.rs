// src/blockchain/mod.rs
pub mod sale_client;
