//! Claims-based authorization and propagation
//!
//! This module normalizes claim values, resolves nested claim paths, evaluates
//! role/scope/field policies and derives headers from verified claims.
//!
//! # Features
//!
//! - Canonical string form of loosely-typed claims (`normalize`)
//! - Dot-path lookup into nested claims (`resolve_nested`)
//! - Role, scope and custom-field matchers composed into an `AccessPolicy`
//! - Claim-to-header propagation with optional SHA-1 hashing
//! - `JoseLayer` / `RequirePolicy` middleware layers (`axum-integration` feature)
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use jose_pep::auth::{AccessPolicy, RequirePolicy, ScopesMatcher};
//! use tower::ServiceBuilder;
//!
//! let app = Router::new()
//!     .route("/admin", get(admin_handler))
//!     .layer(ServiceBuilder::new()
//!         .layer(RequirePolicy::new(
//!             AccessPolicy::new().with_scopes("scope", vec!["admin".to_string()], ScopesMatcher::All),
//!         ))
//!     );
//! ```

pub mod claims;
pub mod error;
pub mod matchers;
pub mod path;
pub mod policy;
pub mod propagation;

#[cfg(feature = "axum-integration")]
pub mod middleware;

pub use claims::{normalize, normalize_value};
pub use error::AuthorizationError;
pub use matchers::{
    can_access, can_access_nested, custom_fields_matcher, scopes_all_matcher, scopes_any_matcher,
    scopes_default_matcher,
};
pub use path::{is_nested_path, resolve_nested};
pub use policy::{AccessPolicy, RoleMatcher, ScopesMatcher};
pub use propagation::{calculate_headers_to_propagate, PropagationRule, PropagationSpec};

#[cfg(feature = "axum-integration")]
pub use middleware::{JoseLayer, RequirePolicy};
