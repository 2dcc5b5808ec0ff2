//! Common types for JOSE operations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{JoseError, Result};

/// A (possibly nested) mapping of claim names to untyped claim values
pub type ClaimMap = Map<String, Value>;

/// Verified claim set extracted from a bearer token
///
/// The set is produced by a [`ClaimSource`](super::validator::ClaimSource)
/// once the token signature has been checked. Nothing in this crate mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(ClaimMap);

impl Claims {
    /// Wrap an already-verified claim mapping
    pub fn new(claims: ClaimMap) -> Self {
        Self(claims)
    }

    /// Build a claim set from a JSON value, if it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Parse a decoded token payload
    ///
    /// Intended for [`ClaimSource`](super::validator::ClaimSource)
    /// implementations once the signature has been verified.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Get the inner claim mapping
    pub fn into_inner(self) -> ClaimMap {
        self.0
    }
}

impl Deref for Claims {
    type Target = ClaimMap;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ClaimMap> for Claims {
    fn from(claims: ClaimMap) -> Self {
        Self(claims)
    }
}

/// Signature algorithms a trusted claim source may be configured with
///
/// Names follow the JOSE (RFC 7518 / RFC 8037) identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    EdDSA,
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
    ES512,
    PS256,
    PS384,
    PS512,
}

impl SignatureAlgorithm {
    /// Every supported algorithm, in table order
    pub const ALL: [SignatureAlgorithm; 13] = [
        SignatureAlgorithm::EdDSA,
        SignatureAlgorithm::HS256,
        SignatureAlgorithm::HS384,
        SignatureAlgorithm::HS512,
        SignatureAlgorithm::RS256,
        SignatureAlgorithm::RS384,
        SignatureAlgorithm::RS512,
        SignatureAlgorithm::ES256,
        SignatureAlgorithm::ES384,
        SignatureAlgorithm::ES512,
        SignatureAlgorithm::PS256,
        SignatureAlgorithm::PS384,
        SignatureAlgorithm::PS512,
    ];

    /// JOSE identifier of the algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::EdDSA => "EdDSA",
            SignatureAlgorithm::HS256 => "HS256",
            SignatureAlgorithm::HS384 => "HS384",
            SignatureAlgorithm::HS512 => "HS512",
            SignatureAlgorithm::RS256 => "RS256",
            SignatureAlgorithm::RS384 => "RS384",
            SignatureAlgorithm::RS512 => "RS512",
            SignatureAlgorithm::ES256 => "ES256",
            SignatureAlgorithm::ES384 => "ES384",
            SignatureAlgorithm::ES512 => "ES512",
            SignatureAlgorithm::PS256 => "PS256",
            SignatureAlgorithm::PS384 => "PS384",
            SignatureAlgorithm::PS512 => "PS512",
        }
    }

    /// Map to the `jsonwebtoken` algorithm, when that crate implements it
    ///
    /// `jsonwebtoken` has no P-521 support, so `ES512` maps to `None`.
    pub fn to_jsonwebtoken(&self) -> Option<jsonwebtoken::Algorithm> {
        use jsonwebtoken::Algorithm;
        match self {
            SignatureAlgorithm::EdDSA => Some(Algorithm::EdDSA),
            SignatureAlgorithm::HS256 => Some(Algorithm::HS256),
            SignatureAlgorithm::HS384 => Some(Algorithm::HS384),
            SignatureAlgorithm::HS512 => Some(Algorithm::HS512),
            SignatureAlgorithm::RS256 => Some(Algorithm::RS256),
            SignatureAlgorithm::RS384 => Some(Algorithm::RS384),
            SignatureAlgorithm::RS512 => Some(Algorithm::RS512),
            SignatureAlgorithm::ES256 => Some(Algorithm::ES256),
            SignatureAlgorithm::ES384 => Some(Algorithm::ES384),
            SignatureAlgorithm::ES512 => None,
            SignatureAlgorithm::PS256 => Some(Algorithm::PS256),
            SignatureAlgorithm::PS384 => Some(Algorithm::PS384),
            SignatureAlgorithm::PS512 => Some(Algorithm::PS512),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = JoseError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == name)
            .ok_or_else(|| JoseError::UnknownAlgorithm(name.to_string()))
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
