//! Configuration parsing module
//!
//! This module loads the validator and signer settings from TOML files and
//! turns them into ready-to-use policy objects.
//!
//! # Example
//!
//! ```rust,ignore
//! use jose_pep::config::load_config;
//!
//! let config = load_config("jose.toml")?;
//! let validator_config = config.validator_config()?;
//! let policy = validator_config.access_policy();
//! let propagation = validator_config.propagation_spec()?;
//! ```

use crate::auth::{AccessPolicy, PropagationSpec, RoleMatcher, ScopesMatcher};
use crate::{JoseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoseConfig {
    /// Token validation and authorization section
    #[serde(default)]
    pub validator: Option<ValidatorConfig>,

    /// Response signing section
    #[serde(default)]
    pub signer: Option<SignerConfig>,
}

impl JoseConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_config(path)
    }

    /// Get validator configuration
    pub fn validator_config(&self) -> Result<ValidatorConfig> {
        self.validator.clone().ok_or_else(|| {
            JoseError::Config("validator configuration not found in config file".to_string())
        })
    }

    /// Get signer configuration
    pub fn signer_config(&self) -> Result<SignerConfig> {
        self.signer.clone().ok_or_else(|| {
            JoseError::Config("signer configuration not found in config file".to_string())
        })
    }
}

/// Validator configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Signature algorithm (JOSE name, e.g. "RS256")
    pub alg: String,

    /// JWK set location
    #[serde(default)]
    pub jwk_url: Option<String>,

    /// Accepted audiences
    #[serde(default)]
    pub audience: Vec<String>,

    /// Expected issuer
    #[serde(default)]
    pub issuer: Option<String>,

    /// Claim holding the caller's roles
    #[serde(default)]
    pub roles_key: Option<String>,

    /// Treat `roles_key` as a dot-separated path
    #[serde(default)]
    pub roles_key_is_nested: bool,

    /// Roles accepted for the route (any of)
    #[serde(default)]
    pub roles: Vec<String>,

    /// Claim holding the space-separated scopes
    #[serde(default)]
    pub scopes_key: Option<String>,

    /// Scopes required for the route
    #[serde(default)]
    pub scopes: Vec<String>,

    /// "all" or "any" (default "any")
    #[serde(default)]
    pub scopes_matcher: Option<String>,

    /// Claims that must hold exactly the given string value
    #[serde(default)]
    pub custom_fields: HashMap<String, String>,

    /// `[claim, header, hash?]` entries
    #[serde(default)]
    pub propagate_claims: Vec<Vec<String>>,

    /// Cookie to read the token from when no Authorization header is sent
    #[serde(default)]
    pub cookie_key: Option<String>,

    /// Enable key caching in the claim source
    #[serde(default)]
    pub cache: bool,

    /// Key cache lifetime in seconds
    #[serde(default)]
    pub cache_duration: Option<u64>,

    /// Base64-encoded public key fingerprints to pin
    #[serde(default)]
    pub jwk_fingerprints: Vec<String>,

    /// TLS cipher suite identifiers for key fetching
    #[serde(default)]
    pub cipher_suites: Vec<u16>,

    /// Local CA certificate for key fetching
    #[serde(default)]
    pub jwk_local_ca: Option<String>,

    /// Allow insecure key fetching (not recommended for production)
    #[serde(default)]
    pub disable_jwk_security: bool,

    /// Local JWK set file
    #[serde(default)]
    pub jwk_local_path: Option<String>,

    /// Secret store URL holding an encrypted JWK set
    #[serde(default)]
    pub secret_url: Option<String>,

    /// Base64-encoded key to decrypt the JWK set
    #[serde(default)]
    pub cipher_key: Option<String>,

    /// How keys are matched to tokens (e.g. "kid", "x5t")
    #[serde(default)]
    pub key_identify_strategy: Option<String>,
}

impl ValidatorConfig {
    /// Build the access policy described by this section
    pub fn access_policy(&self) -> AccessPolicy {
        let mut policy = AccessPolicy::new();

        let roles_key = self.roles_key.clone().unwrap_or_default();
        policy = match RoleMatcher::for_key(&roles_key, self.roles_key_is_nested) {
            RoleMatcher::Nested => policy.with_nested_roles(roles_key, self.roles.clone()),
            RoleMatcher::Flat => policy.with_roles(roles_key, self.roles.clone()),
        };

        let matcher = ScopesMatcher::from_config(
            self.scopes_matcher.as_deref(),
            self.scopes_key.as_deref(),
            &self.scopes,
        );
        policy = policy.with_scopes(self.scopes_key.clone().unwrap_or_default(), self.scopes.clone(), matcher);

        policy.with_custom_fields(self.custom_fields.clone())
    }

    /// Build the propagation specification, if any claims are propagated
    pub fn propagation_spec(&self) -> Result<Option<PropagationSpec>> {
        if self.propagate_claims.is_empty() {
            return Ok(None);
        }
        PropagationSpec::from_config(&self.propagate_claims).map(Some)
    }
}

/// Response signer configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Signature algorithm (JOSE name)
    pub alg: String,

    /// Key identifier placed in the token header
    #[serde(default)]
    pub kid: Option<String>,

    /// Top-level response fields to replace with signed tokens
    #[serde(default)]
    pub keys_to_sign: Vec<String>,

    /// Sign the whole response instead of selected fields
    #[serde(default)]
    pub full: bool,
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Example
///
/// ```rust,ignore
/// let config = jose_pep::config::load_config("jose.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<JoseConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| JoseError::Config(format!("Failed to read config file: {}", e)))?;

    tracing::debug!("Loaded JOSE configuration from {}", path.display());
    parse_config(&content)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<JoseConfig> {
    toml::from_str(content).map_err(|e| JoseError::Config(format!("Failed to parse TOML config: {}", e)))
}
