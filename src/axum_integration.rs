//! Axum integration
//!
//! This module provides utilities for integrating the policy enforcement layer
//! with the Axum web framework:
//! - `FromRequestParts` extractor for verified [`Claims`]
//! - re-exports of the middleware layers and token extraction helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{routing::get, Router};
//! use jose_pep::axum_integration::{ClaimsExtractor, JoseLayer};
//!
//! async fn protected_handler(claims: ClaimsExtractor) -> String {
//!     format!("Hello, {}!", claims.get_normalized("sub").unwrap_or_default())
//! }
//!
//! let layer = JoseLayer::from_config(&config.validator_config()?, my_claim_source)?;
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(layer);
//! ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use std::ops::Deref;

use crate::jose::types::Claims;

pub use crate::auth::middleware::{JoseLayer, RequirePolicy};
pub use crate::jose::extract::{extract_bearer_token, extract_cookie_token};

/// Axum extractor for verified claims
///
/// The claims must be inserted by [`JoseLayer`] before this extractor is used.
#[derive(Debug, Clone)]
pub struct ClaimsExtractor(pub Claims);

impl Deref for ClaimsExtractor {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Claims> for ClaimsExtractor {
    fn from(claims: Claims) -> Self {
        Self(claims)
    }
}

impl ClaimsExtractor {
    /// Get the inner claims
    pub fn into_inner(self) -> Claims {
        self.0
    }
}

impl<S> FromRequestParts<S> for ClaimsExtractor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(ClaimsExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;

    fn claims() -> Claims {
        Claims::from_value(json!({"sub": "u1", "roles": ["admin"]})).unwrap()
    }

    #[test]
    fn test_claims_extractor_deref() {
        let extractor = ClaimsExtractor::from(claims());
        assert_eq!(extractor.get_normalized("roles").as_deref(), Some("admin"));
        assert_eq!(extractor.into_inner(), claims());
    }

    #[tokio::test]
    async fn test_extract_from_extensions() {
        let mut request = Request::builder().uri("/").body(()).unwrap();
        request.extensions_mut().insert(claims());
        let (mut parts, _) = request.into_parts();

        let extracted = ClaimsExtractor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.0, claims());
    }

    #[tokio::test]
    async fn test_extract_without_claims() {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();

        let rejection = ClaimsExtractor::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection, StatusCode::UNAUTHORIZED);
    }
}
