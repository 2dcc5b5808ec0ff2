use serde_json::{Number, Value};

use crate::jose::types::{ClaimMap, Claims};

/// Tolerance under which a floating point claim is rendered as an integer
pub const EPSILON: f64 = 1e-6;

/// Normalize the claim stored under `key` into its canonical string form
///
/// Returns `None` when the claim is absent.
pub fn normalize(claims: &ClaimMap, key: &str) -> Option<String> {
    claims.get(key).map(normalize_value)
}

/// Canonical string form of a single claim value
///
/// - strings are returned verbatim
/// - integers use their decimal representation
/// - floats within [`EPSILON`] of an integer drop the fraction, others keep six decimals
/// - arrays join the plain rendering of each element with commas
/// - anything else is serialized as JSON text
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => normalize_number(n),
        Value::Array(items) => items
            .iter()
            .map(render_element)
            .collect::<Vec<_>>()
            .join(","),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn normalize_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => {
            let rounded = f.round();
            if (f - rounded).abs() <= EPSILON {
                // Integral floats may exceed the i64 range; -0.0 renders as "0".
                format!("{:.0}", if rounded == 0.0 { 0.0 } else { rounded })
            } else {
                format!("{:.6}", f)
            }
        }
        None => n.to_string(),
    }
}

// Array elements are not normalized recursively.
fn render_element(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

impl Claims {
    /// Canonical string form of the claim under `name`, if present
    pub fn get_normalized(&self, name: &str) -> Option<String> {
        normalize(self, name)
    }

    /// Check if the claim under `role_key` grants any of the given roles
    pub fn has_any_role<S: AsRef<str>>(&self, role_key: &str, roles: &[S]) -> bool {
        super::matchers::can_access(role_key, self, roles)
    }

    /// Check if the space-separated scope claim under `scopes_key` grants all given scopes
    pub fn has_all_scopes<S: AsRef<str>>(&self, scopes_key: &str, scopes: &[S]) -> bool {
        super::matchers::scopes_all_matcher(scopes_key, self, scopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        Claims::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_key() {
        let c = claims(json!({"sub": "u1"}));
        assert_eq!(normalize(&c, "email"), None);
    }

    #[test]
    fn test_string_verbatim() {
        let c = claims(json!({"sub": "user 123"}));
        assert_eq!(c.get_normalized("sub").as_deref(), Some("user 123"));
    }

    #[test]
    fn test_integer() {
        let c = claims(json!({"n": 42, "neg": -7, "big": u64::MAX}));
        assert_eq!(c.get_normalized("n").as_deref(), Some("42"));
        assert_eq!(c.get_normalized("neg").as_deref(), Some("-7"));
        assert_eq!(c.get_normalized("big").as_deref(), Some("18446744073709551615"));
    }

    #[test]
    fn test_float_near_integer() {
        let c = claims(json!({"a": 3.0000001, "b": 1700000000.0, "c": -2.0}));
        assert_eq!(c.get_normalized("a").as_deref(), Some("3"));
        assert_eq!(c.get_normalized("b").as_deref(), Some("1700000000"));
        assert_eq!(c.get_normalized("c").as_deref(), Some("-2"));
    }

    #[test]
    fn test_float_beyond_i64_range() {
        let c = claims(json!({"big": 1e20, "neg": -1e20, "tiny": -0.0000001}));
        assert_eq!(c.get_normalized("big").as_deref(), Some("100000000000000000000"));
        assert_eq!(c.get_normalized("neg").as_deref(), Some("-100000000000000000000"));
        assert_eq!(c.get_normalized("tiny").as_deref(), Some("0"));
    }

    #[test]
    fn test_float_fractional() {
        let c = claims(json!({"a": 3.01, "b": 0.5}));
        assert_eq!(c.get_normalized("a").as_deref(), Some("3.010000"));
        assert_eq!(c.get_normalized("b").as_deref(), Some("0.500000"));
    }

    #[test]
    fn test_float_just_outside_tolerance() {
        let c = claims(json!({"a": 3.00001}));
        assert_eq!(c.get_normalized("a").as_deref(), Some("3.000010"));
    }

    #[test]
    fn test_array_join() {
        let c = claims(json!({"mixed": [1, "a", 2], "roles": ["admin", "user"]}));
        assert_eq!(c.get_normalized("mixed").as_deref(), Some("1,a,2"));
        assert_eq!(c.get_normalized("roles").as_deref(), Some("admin,user"));
    }

    #[test]
    fn test_array_elements_not_normalized() {
        let c = claims(json!({"v": [1.5, true, {"k": "v"}]}));
        assert_eq!(c.get_normalized("v").as_deref(), Some(r#"1.5,true,{"k":"v"}"#));
    }

    #[test]
    fn test_empty_array() {
        let c = claims(json!({"v": []}));
        assert_eq!(c.get_normalized("v").as_deref(), Some(""));
    }

    #[test]
    fn test_nested_map_as_json() {
        let c = claims(json!({"address": {"country": "ES"}}));
        assert_eq!(c.get_normalized("address").as_deref(), Some(r#"{"country":"ES"}"#));
    }

    #[test]
    fn test_bool_and_null_as_json() {
        let c = claims(json!({"verified": true, "nothing": null}));
        assert_eq!(c.get_normalized("verified").as_deref(), Some("true"));
        assert_eq!(c.get_normalized("nothing").as_deref(), Some("null"));
    }

    #[test]
    fn test_role_and_scope_helpers() {
        let c = claims(json!({"roles": ["admin", "user"], "scope": "read write"}));
        assert!(c.has_any_role("roles", &["editor", "user"]));
        assert!(!c.has_any_role("roles", &["editor"]));
        assert!(c.has_all_scopes("scope", &["read", "write"]));
        assert!(!c.has_all_scopes("scope", &["read", "delete"]));
    }
}
