//! Access matchers
//!
//! Every matcher answers "is this claim set authorized" against a set of
//! required values. An empty required set always authorizes. Matchers never
//! mutate their inputs.

use std::collections::HashMap;

use serde_json::Value;

use super::path::{resolve_claim_key, resolve_nested};
use crate::jose::types::ClaimMap;

/// Check that the claim under `role_key` holds at least one required role
///
/// The claim may be an array of strings or a single space-separated string.
pub fn can_access<S: AsRef<str>>(role_key: &str, claims: &ClaimMap, required: &[S]) -> bool {
    if required.is_empty() {
        return true;
    }

    match claims.get(role_key) {
        Some(Value::Array(roles)) => required.iter().any(|role| {
            roles
                .iter()
                .any(|r| r.as_str() == Some(role.as_ref()))
        }),
        Some(Value::String(roles)) => {
            let present: Vec<&str> = roles.split(' ').collect();
            required
                .iter()
                .any(|role| present.iter().any(|p| *p == role.as_ref()))
        }
        _ => false,
    }
}

/// Like [`can_access`], but `role_key` is a dot-separated path into nested claims
pub fn can_access_nested<S: AsRef<str>>(role_key: &str, claims: &ClaimMap, required: &[S]) -> bool {
    if required.is_empty() {
        return true;
    }

    match resolve_nested(role_key, claims) {
        Some((key, inner)) => can_access(key, inner, required),
        None => false,
    }
}

// Scope claims are a single space-separated string.
fn present_scopes<'c>(scopes_key: &str, claims: &'c ClaimMap) -> Option<Vec<&'c str>> {
    let (key, inner) = resolve_claim_key(scopes_key, claims)?;
    let scopes = inner.get(key)?.as_str()?;
    Some(scopes.split(' ').collect())
}

/// Require every scope in `required` to be present in the scope claim
pub fn scopes_all_matcher<S: AsRef<str>>(scopes_key: &str, claims: &ClaimMap, required: &[S]) -> bool {
    if required.is_empty() {
        return true;
    }

    match present_scopes(scopes_key, claims) {
        Some(present) => required
            .iter()
            .all(|scope| present.iter().any(|p| *p == scope.as_ref())),
        None => false,
    }
}

/// Require at least one scope in `required` to be present in the scope claim
pub fn scopes_any_matcher<S: AsRef<str>>(scopes_key: &str, claims: &ClaimMap, required: &[S]) -> bool {
    if required.is_empty() {
        return true;
    }

    match present_scopes(scopes_key, claims) {
        Some(present) => required
            .iter()
            .any(|scope| present.iter().any(|p| *p == scope.as_ref())),
        None => false,
    }
}

/// No-op scope policy used when scope checking is disabled
pub fn scopes_default_matcher<S: AsRef<str>>(_scopes_key: &str, _claims: &ClaimMap, _required: &[S]) -> bool {
    true
}

/// Require every wanted field to hold exactly the expected string value
pub fn custom_fields_matcher(claims: &ClaimMap, wanted: &HashMap<String, String>) -> bool {
    wanted
        .iter()
        .all(|(key, expected)| claims.get(key).and_then(Value::as_str) == Some(expected.as_str()))
}
