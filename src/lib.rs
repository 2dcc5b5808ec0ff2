//! # jose-pep - JOSE Policy Enforcement Point
//!
//! Claims-based authorization for gateways that sit behind a JOSE token
//! validator. Once a token's signature has been verified, this crate decides
//! whether the caller may proceed, derives outbound headers from the claims
//! and re-signs selected response fragments.
//!
//! ## Features
//!
//! - `axum-integration` (default): tower middleware layers and an axum claims extractor

pub mod error;
pub use error::{JoseError, Result};

pub mod auth;
pub mod config;
pub mod jose;

#[cfg(feature = "axum-integration")]
pub mod axum_integration;

// Re-export commonly used types at crate root
pub use crate::auth::{AccessPolicy, AuthorizationError, PropagationSpec, ScopesMatcher};
pub use crate::config::{JoseConfig, SignerConfig, ValidatorConfig};
pub use crate::jose::types::{ClaimMap, Claims, SignatureAlgorithm};
pub use crate::jose::validator::{ClaimSource, Validator, VerificationParams};
pub use crate::jose::signer::{sign_fields, JwtSigner, ResponseSigner, Signer};
