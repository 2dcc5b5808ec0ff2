use std::collections::HashMap;

use super::error::AuthorizationError;
use super::matchers::{
    can_access, can_access_nested, custom_fields_matcher, scopes_all_matcher, scopes_any_matcher,
    scopes_default_matcher,
};
use super::path::is_nested_path;
use crate::jose::types::ClaimMap;

/// How the role claim is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleMatcher {
    /// Direct lookup of the role key ([`can_access`])
    #[default]
    Flat,
    /// Dot-path lookup of the role key ([`can_access_nested`])
    Nested,
}

impl RoleMatcher {
    /// Pick the matcher for a configured role key
    ///
    /// Nested lookup is only used when requested and the key is a nested path.
    pub fn for_key(role_key: &str, is_nested: bool) -> Self {
        if is_nested && is_nested_path(role_key) {
            RoleMatcher::Nested
        } else {
            RoleMatcher::Flat
        }
    }

    pub fn matches<S: AsRef<str>>(&self, role_key: &str, claims: &ClaimMap, required: &[S]) -> bool {
        match self {
            RoleMatcher::Flat => can_access(role_key, claims, required),
            RoleMatcher::Nested => can_access_nested(role_key, claims, required),
        }
    }
}

/// Scope checking policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopesMatcher {
    /// Every required scope must be present
    All,
    /// At least one required scope must be present
    Any,
    /// Scope checking disabled
    #[default]
    Default,
}

impl ScopesMatcher {
    /// Pick the matcher from configuration
    ///
    /// Without a scopes key or required scopes, scope checking is disabled.
    /// Otherwise `"all"` selects [`ScopesMatcher::All`] and anything else
    /// falls back to [`ScopesMatcher::Any`].
    pub fn from_config<S: AsRef<str>>(matcher: Option<&str>, scopes_key: Option<&str>, scopes: &[S]) -> Self {
        let enabled = scopes_key.is_some_and(|key| !key.is_empty()) && !scopes.is_empty();
        match (enabled, matcher) {
            (false, _) => ScopesMatcher::Default,
            (true, Some("all")) => ScopesMatcher::All,
            (true, _) => ScopesMatcher::Any,
        }
    }

    pub fn matches<S: AsRef<str>>(&self, scopes_key: &str, claims: &ClaimMap, required: &[S]) -> bool {
        match self {
            ScopesMatcher::All => scopes_all_matcher(scopes_key, claims, required),
            ScopesMatcher::Any => scopes_any_matcher(scopes_key, claims, required),
            ScopesMatcher::Default => scopes_default_matcher(scopes_key, claims, required),
        }
    }
}

/// Composed authorization policy for a protected route
///
/// Roles are checked first, then scopes, then custom fields. Each dimension
/// with nothing configured authorizes.
///
/// # Example
///
/// ```rust
/// use jose_pep::auth::{AccessPolicy, ScopesMatcher};
/// use serde_json::json;
///
/// let policy = AccessPolicy::new()
///     .with_roles("roles", vec!["admin".to_string()])
///     .with_scopes("scope", vec!["read".to_string()], ScopesMatcher::All);
///
/// let claims = json!({"roles": ["admin"], "scope": "read write"});
/// assert!(policy.authorize(claims.as_object().unwrap()).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    roles_key: String,
    role_matcher: RoleMatcher,
    roles: Vec<String>,
    scopes_key: String,
    scopes_matcher: ScopesMatcher,
    scopes: Vec<String>,
    custom_fields: HashMap<String, String>,
}

impl AccessPolicy {
    /// Policy that authorizes every claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Require one of `roles` under the flat claim `roles_key`
    pub fn with_roles(mut self, roles_key: impl Into<String>, roles: Vec<String>) -> Self {
        self.roles_key = roles_key.into();
        self.role_matcher = RoleMatcher::Flat;
        self.roles = roles;
        self
    }

    /// Require one of `roles` under the dot-separated claim path `roles_key`
    pub fn with_nested_roles(mut self, roles_key: impl Into<String>, roles: Vec<String>) -> Self {
        let roles_key = roles_key.into();
        self.role_matcher = RoleMatcher::for_key(&roles_key, true);
        self.roles_key = roles_key;
        self.roles = roles;
        self
    }

    /// Require `scopes` under `scopes_key` using the given matcher
    pub fn with_scopes(mut self, scopes_key: impl Into<String>, scopes: Vec<String>, matcher: ScopesMatcher) -> Self {
        self.scopes_key = scopes_key.into();
        self.scopes = scopes;
        self.scopes_matcher = matcher;
        self
    }

    /// Require each custom claim to hold exactly the given string value
    pub fn with_custom_fields(mut self, fields: HashMap<String, String>) -> Self {
        self.custom_fields = fields;
        self
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn scopes_matcher(&self) -> ScopesMatcher {
        self.scopes_matcher
    }

    /// Evaluate the policy, naming the first failing dimension
    pub fn authorize(&self, claims: &ClaimMap) -> Result<(), AuthorizationError> {
        if !self.role_matcher.matches(&self.roles_key, claims, &self.roles) {
            tracing::debug!("Role check failed on key {}: required one of {:?}", self.roles_key, self.roles);
            return Err(AuthorizationError::InsufficientRole(self.roles.clone()));
        }

        if !self.scopes_matcher.matches(&self.scopes_key, claims, &self.scopes) {
            tracing::debug!(
                "Scope check ({:?}) failed on key {}: required {:?}",
                self.scopes_matcher, self.scopes_key, self.scopes
            );
            return Err(AuthorizationError::InsufficientScope(self.scopes.clone()));
        }

        if !custom_fields_matcher(claims, &self.custom_fields) {
            let mut fields: Vec<String> = self.custom_fields.keys().cloned().collect();
            fields.sort();
            tracing::debug!("Custom claims check failed: required {:?}", fields);
            return Err(AuthorizationError::CustomFieldsMismatch(fields));
        }

        Ok(())
    }

    pub fn is_authorized(&self, claims: &ClaimMap) -> bool {
        self.authorize(claims).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn map(value: Value) -> ClaimMap {
        value.as_object().cloned().unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_policy_authorizes_everything() {
        let policy = AccessPolicy::new();
        assert!(policy.is_authorized(&map(json!({}))));
        assert!(policy.is_authorized(&map(json!({"roles": 1}))));
    }

    #[test]
    fn test_role_matcher_for_key() {
        assert_eq!(RoleMatcher::for_key("realm.roles", true), RoleMatcher::Nested);
        assert_eq!(RoleMatcher::for_key("realm.roles", false), RoleMatcher::Flat);
        assert_eq!(RoleMatcher::for_key("roles", true), RoleMatcher::Flat);
        assert_eq!(RoleMatcher::for_key("http://example.com/roles", true), RoleMatcher::Flat);
    }

    #[test]
    fn test_scopes_matcher_from_config() {
        let scopes = strings(&["read"]);
        assert_eq!(ScopesMatcher::from_config(Some("all"), Some("scope"), &scopes), ScopesMatcher::All);
        assert_eq!(ScopesMatcher::from_config(Some("any"), Some("scope"), &scopes), ScopesMatcher::Any);
        assert_eq!(ScopesMatcher::from_config(None, Some("scope"), &scopes), ScopesMatcher::Any);
        assert_eq!(ScopesMatcher::from_config(Some("all"), None, &scopes), ScopesMatcher::Default);
        assert_eq!(ScopesMatcher::from_config(Some("all"), Some(""), &scopes), ScopesMatcher::Default);
        assert_eq!(
            ScopesMatcher::from_config(Some("all"), Some("scope"), &Vec::<String>::new()),
            ScopesMatcher::Default
        );
    }

    #[test]
    fn test_role_failure() {
        let policy = AccessPolicy::new().with_roles("roles", strings(&["admin"]));
        let err = policy.authorize(&map(json!({"roles": ["user"]}))).unwrap_err();
        assert_eq!(err, AuthorizationError::InsufficientRole(strings(&["admin"])));
    }

    #[test]
    fn test_nested_roles() {
        let policy = AccessPolicy::new().with_nested_roles("realm_access.roles", strings(&["admin"]));
        assert!(policy.is_authorized(&map(json!({"realm_access": {"roles": ["admin"]}}))));
        assert!(!policy.is_authorized(&map(json!({"realm_access.roles": ["admin"]}))));
    }

    #[test]
    fn test_scope_failure_after_roles_pass() {
        let policy = AccessPolicy::new()
            .with_roles("roles", strings(&["admin"]))
            .with_scopes("scope", strings(&["read", "delete"]), ScopesMatcher::All);
        let err = policy
            .authorize(&map(json!({"roles": "admin", "scope": "read write"})))
            .unwrap_err();
        assert_eq!(err, AuthorizationError::InsufficientScope(strings(&["read", "delete"])));
    }

    #[test]
    fn test_default_scopes_matcher_skips_check() {
        let policy = AccessPolicy::new().with_scopes("scope", strings(&["read"]), ScopesMatcher::Default);
        assert!(policy.is_authorized(&map(json!({}))));
    }

    #[test]
    fn test_custom_fields_failure() {
        let mut fields = HashMap::new();
        fields.insert("tenant".to_string(), "acme".to_string());
        fields.insert("env".to_string(), "prod".to_string());
        let policy = AccessPolicy::new().with_custom_fields(fields);

        assert!(policy.is_authorized(&map(json!({"tenant": "acme", "env": "prod"}))));
        let err = policy.authorize(&map(json!({"tenant": "acme"}))).unwrap_err();
        assert_eq!(err, AuthorizationError::CustomFieldsMismatch(strings(&["env", "tenant"])));
    }
}
