// src/models/mod.rs
pub mod claim;
pub mod request;
