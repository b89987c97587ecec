// src/settings.rs
//! Runtime configuration for the attestor service.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. legacy environment names (`VERIFIER_PRIV_KEY`, `POLICY_ID`, `COUNTRY_CODE_ALLOWED`)
//! 3. optional `attestor.toml` in the working directory
//! 4. `ATTESTOR_*` environment variables (e.g. `ATTESTOR_SIGNING_KEY`)

use crate::policy::evaluator::KYC_ELIGIBLE;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;

pub const CONFIG_FILE: &str = "attestor";
pub const ENV_PREFIX: &str = "ATTESTOR";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_COUNTRY_ALLOWED: i64 = 1;

/// Environment names used by earlier deployments, mapped to settings keys.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("VERIFIER_PRIV_KEY", "signing_key"),
    ("POLICY_ID", "default_policy_id"),
    ("COUNTRY_CODE_ALLOWED", "country_allowed"),
];

#[derive(Deserialize, Clone)]
pub struct Settings {
    /// Hex secp256k1 key of the attestor. Required to serve.
    pub signing_key: Option<String>,
    pub default_policy_id: String,
    /// Country code accepted by the plaintext evaluator.
    pub country_allowed: i64,
    pub bind_address: String,
    /// JSON-RPC endpoint used for the on-chain verifier check.
    pub rpc_url: Option<String>,
    pub sale_contract_address: Option<String>,
}

impl Settings {
    /// Loads settings from defaults, legacy env, `attestor.toml` and `ATTESTOR_*`.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = with_legacy_env(defaults()?, |name| std::env::var(name).ok())?;
        builder
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Defaults overlaid with a TOML document. No environment lookup.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field(
                "signing_key",
                &self.signing_key.as_ref().map(|_| "<redacted>"),
            )
            .field("default_policy_id", &self.default_policy_id)
            .field("country_allowed", &self.country_allowed)
            .field("bind_address", &self.bind_address)
            .field("rpc_url", &self.rpc_url)
            .field("sale_contract_address", &self.sale_contract_address)
            .finish()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("default_policy_id", KYC_ELIGIBLE)?
        .set_default("country_allowed", DEFAULT_COUNTRY_ALLOWED)?
        .set_default("bind_address", DEFAULT_BIND_ADDRESS)
}

/// Applies legacy environment names as defaults, so file and `ATTESTOR_*`
/// values still win.
fn with_legacy_env(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (legacy, key) in LEGACY_ENV_KEYS {
        if let Some(value) = lookup(legacy) {
            builder = builder.set_default(*key, value)?;
        }
    }
    Ok(builder)
}
