// src/policy/mod.rs
pub mod evaluator;
