//! Validator assembly around a trusted claim source
//!
//! Signature verification, key fetching and key caching belong to the
//! [`ClaimSource`]. The [`Validator`] only checks that the configuration is
//! usable, extracts the token from the request and hands it over.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use http::HeaderMap;

use super::extract::extract_token;
use super::types::{Claims, SignatureAlgorithm};
use crate::config::ValidatorConfig;
use crate::error::{JoseError, Result};

/// Default key cache lifetime when caching is enabled without a duration
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(15 * 60);

/// Parameters a claim source needs to verify tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationParams {
    pub algorithm: SignatureAlgorithm,
    pub jwk_url: Option<String>,
    pub audience: Vec<String>,
    pub issuer: Option<String>,
    pub cache_enabled: bool,
    pub cache_duration: Duration,
    /// Decoded public key fingerprints to pin
    pub fingerprints: Vec<Vec<u8>>,
    pub cipher_suites: Vec<u16>,
    pub local_ca: Option<PathBuf>,
    pub allow_insecure: bool,
    pub local_path: Option<PathBuf>,
    pub secret_url: Option<String>,
    pub cipher_key: Option<Vec<u8>>,
    pub key_identify_strategy: Option<String>,
}

/// Capability that verifies a token and returns its trusted claims
///
/// Implementations own key resolution, caching, fingerprint pinning and the
/// algorithm allow-list. Failures must be reported as
/// [`JoseError::Authentication`].
#[async_trait]
pub trait ClaimSource: Send + Sync {
    async fn verify(&self, token: &str, params: &VerificationParams) -> Result<Claims>;
}

/// Base64-decode configured key fingerprints
pub fn decode_fingerprints<S: AsRef<str>>(fingerprints: &[S]) -> Result<Vec<Vec<u8>>> {
    fingerprints
        .iter()
        .enumerate()
        .map(|(index, fp)| {
            base64::engine::general_purpose::STANDARD
                .decode(fp.as_ref())
                .map_err(|e| JoseError::InvalidFingerprint {
                    index,
                    reason: e.to_string(),
                })
        })
        .collect()
}

impl VerificationParams {
    /// Build verification parameters from the `[validator]` configuration section
    ///
    /// Rejects unknown algorithms, undecodable fingerprints and an undecodable
    /// cipher key.
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        let algorithm: SignatureAlgorithm = config.alg.parse()?;
        let fingerprints = decode_fingerprints(&config.jwk_fingerprints)?;
        let cipher_key = config
            .cipher_key
            .as_deref()
            .map(|key| {
                base64::engine::general_purpose::STANDARD
                    .decode(key)
                    .map_err(|e| JoseError::Config(format!("Invalid cipher_key: {}", e)))
            })
            .transpose()?;

        let cache_duration = config
            .cache_duration
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CACHE_DURATION);

        Ok(Self {
            algorithm,
            jwk_url: config.jwk_url.clone(),
            audience: config.audience.clone(),
            issuer: config.issuer.clone(),
            cache_enabled: config.cache,
            cache_duration,
            fingerprints,
            cipher_suites: config.cipher_suites.clone(),
            local_ca: config.jwk_local_ca.as_ref().map(PathBuf::from),
            allow_insecure: config.disable_jwk_security,
            local_path: config.jwk_local_path.as_ref().map(PathBuf::from),
            secret_url: config.secret_url.clone(),
            cipher_key,
            key_identify_strategy: config.key_identify_strategy.clone(),
        })
    }
}

/// Token validator delegating verification to a [`ClaimSource`]
pub struct Validator<S> {
    params: VerificationParams,
    cookie_key: Option<String>,
    source: S,
}

impl<S: ClaimSource> Validator<S> {
    /// Assemble a validator, failing on unusable configuration
    pub fn new(config: &ValidatorConfig, source: S) -> Result<Self> {
        let params = VerificationParams::from_config(config)?;
        tracing::info!(
            "JOSE validator ready: alg={}, issuer={:?}, audience={:?}",
            params.algorithm,
            params.issuer,
            params.audience
        );
        Ok(Self {
            params,
            cookie_key: config.cookie_key.clone(),
            source,
        })
    }

    pub fn params(&self) -> &VerificationParams {
        &self.params
    }

    /// Locate the token: Authorization bearer header first, then the configured cookie
    pub fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        extract_token(headers, self.cookie_key.as_deref())
    }

    /// Extract and verify the request token
    pub async fn validate(&self, headers: &HeaderMap) -> Result<Claims> {
        let token = self.extract_token(headers).ok_or(JoseError::MissingToken)?;
        self.source.verify(&token, &self.params).await
    }
}
