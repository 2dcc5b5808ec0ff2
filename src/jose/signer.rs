//! Response re-signing
//!
//! Selected response fragments are replaced by tokens produced by an opaque
//! [`Signer`] capability.

use jsonwebtoken::{EncodingKey, Header};
use serde_json::Value;

use super::types::{ClaimMap, SignatureAlgorithm};
use crate::config::SignerConfig;
use crate::error::{JoseError, Result};

/// Capability turning a claim mapping into a signed token string
pub trait Signer: Send + Sync {
    fn sign(&self, claims: &ClaimMap) -> anyhow::Result<String>;
}

impl<F> Signer for F
where
    F: Fn(&ClaimMap) -> anyhow::Result<String> + Send + Sync,
{
    fn sign(&self, claims: &ClaimMap) -> anyhow::Result<String> {
        self(claims)
    }
}

/// Replace each named top-level field holding a mapping with its signed token
///
/// Absent fields and fields that are not mappings are left untouched. Every
/// field is signed before any is replaced, so when the signer fails the
/// payload is returned unchanged along with the error.
pub fn sign_fields<K, S>(keys: &[K], signer: &S, payload: &mut ClaimMap) -> Result<()>
where
    K: AsRef<str>,
    S: Signer + ?Sized,
{
    let mut signed: Vec<(&str, String)> = Vec::with_capacity(keys.len());

    for key in keys {
        let key = key.as_ref();
        if signed.iter().any(|(done, _)| *done == key) {
            continue;
        }
        let Some(Value::Object(data)) = payload.get(key) else {
            continue;
        };
        let token = signer.sign(data).map_err(|source| JoseError::Signing {
            field: key.to_string(),
            source,
        })?;
        signed.push((key, token));
    }

    for (key, token) in signed {
        payload.insert(key.to_string(), Value::String(token));
    }

    Ok(())
}

/// Sign the whole payload as a single token
pub fn sign_payload<S: Signer + ?Sized>(signer: &S, payload: &ClaimMap) -> Result<String> {
    signer.sign(payload).map_err(JoseError::PayloadSigning)
}

/// [`Signer`] backed by `jsonwebtoken`
pub struct JwtSigner {
    header: Header,
    key: EncodingKey,
}

impl JwtSigner {
    /// Fails for algorithms `jsonwebtoken` cannot sign with
    pub fn new(algorithm: SignatureAlgorithm, key: EncodingKey) -> Result<Self> {
        let alg = algorithm
            .to_jsonwebtoken()
            .ok_or_else(|| JoseError::UnsupportedSigningAlgorithm(algorithm.to_string()))?;
        Ok(Self {
            header: Header::new(alg),
            key,
        })
    }

    /// Build a signer from the `[signer]` configuration section
    pub fn from_config(config: &SignerConfig, key: EncodingKey) -> Result<Self> {
        let algorithm: SignatureAlgorithm = config.alg.parse()?;
        let signer = Self::new(algorithm, key)?;
        Ok(match &config.kid {
            Some(kid) => signer.with_kid(kid.clone()),
            None => signer,
        })
    }

    /// Set the `kid` header of produced tokens
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.header.kid = Some(kid.into());
        self
    }
}

impl Signer for JwtSigner {
    fn sign(&self, claims: &ClaimMap) -> anyhow::Result<String> {
        Ok(jsonwebtoken::encode(&self.header, claims, &self.key)?)
    }
}

/// Applies the configured signing mode to response payloads
pub struct ResponseSigner<S> {
    signer: S,
    keys_to_sign: Vec<String>,
    full: bool,
}

impl<S: Signer> ResponseSigner<S> {
    pub fn new(config: &SignerConfig, signer: S) -> Self {
        tracing::info!(
            "Response signer ready: alg={}, full={}, keys_to_sign={:?}",
            config.alg,
            config.full,
            config.keys_to_sign
        );
        Self {
            signer,
            keys_to_sign: config.keys_to_sign.clone(),
            full: config.full,
        }
    }

    /// Sign a response payload
    ///
    /// In full mode the whole payload becomes a single token string; otherwise
    /// the configured fields are signed in place.
    pub fn sign_response(&self, mut payload: ClaimMap) -> Result<Value> {
        if self.full {
            return sign_payload(&self.signer, &payload).map(Value::String);
        }
        sign_fields(&self.keys_to_sign, &self.signer, &mut payload)?;
        Ok(Value::Object(payload))
    }
}
