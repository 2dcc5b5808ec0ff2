//! Header propagation from verified claims
//!
//! A propagation specification is an ordered list of rules, each naming a
//! source claim (flat key or dot path), a destination header and whether the
//! value must be replaced by its SHA-1 hex digest. Rules whose claim cannot be
//! resolved are skipped; they never abort the others.

use std::collections::HashMap;

use sha1::{Digest, Sha1};

use super::claims::normalize;
use super::path::resolve_claim_key;
use crate::error::{JoseError, Result};
use crate::jose::types::ClaimMap;

/// A single claim-to-header rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationRule {
    /// Source claim key or dot-separated path
    pub from_claim: String,
    /// Destination header name
    pub to_header: String,
    /// Replace the value with its SHA-1 hex digest
    pub hash: bool,
}

impl PropagationRule {
    pub fn new(from_claim: impl Into<String>, to_header: impl Into<String>, hash: bool) -> Self {
        Self {
            from_claim: from_claim.into(),
            to_header: to_header.into(),
            hash,
        }
    }

    /// Build a rule from a configured `[claim, header, hash?]` entry
    ///
    /// Returns `None` when the entry has fewer than two elements. A missing
    /// or unparsable hash flag means no hashing.
    pub fn from_triple<S: AsRef<str>>(triple: &[S]) -> Option<Self> {
        let (from_claim, to_header) = match triple {
            [from, to, ..] => (from.as_ref(), to.as_ref()),
            _ => return None,
        };

        let hash = match triple.get(2) {
            Some(flag) => parse_bool(flag.as_ref()).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid hash flag {:?} for claim {}, propagating without hashing",
                    flag.as_ref(),
                    from_claim
                );
                false
            }),
            None => false,
        };

        Some(Self::new(from_claim, to_header, hash))
    }

    /// Derive this rule's header value, if the claim resolves
    pub fn value_for(&self, claims: &ClaimMap) -> Option<String> {
        let (key, inner) = resolve_claim_key(&self.from_claim, claims)?;
        let value = normalize(inner, key)?;
        if self.hash {
            Some(sha1_hex(&value))
        } else {
            Some(value)
        }
    }
}

/// Boolean parsing accepting the usual textual spellings
///
/// `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn sha1_hex(value: &str) -> String {
    hex::encode(Sha1::digest(value.as_bytes()))
}

/// Ordered, non-empty list of propagation rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationSpec {
    rules: Vec<PropagationRule>,
}

impl PropagationSpec {
    /// Fails when `rules` is empty
    pub fn new(rules: Vec<PropagationRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(JoseError::NoHeadersToPropagate(0));
        }
        Ok(Self { rules })
    }

    /// Build the specification from configured `[claim, header, hash?]` entries
    ///
    /// Fails when no usable entries are configured. Entries with fewer than
    /// two elements are skipped with a warning.
    pub fn from_config<S: AsRef<str>>(config: &[Vec<S>]) -> Result<Self> {
        if config.is_empty() {
            return Err(JoseError::NoHeadersToPropagate(config.len()));
        }

        let rules = config
            .iter()
            .filter_map(|triple| {
                let rule = PropagationRule::from_triple(triple);
                if rule.is_none() {
                    tracing::warn!("Ignoring propagation entry with {} element(s)", triple.len());
                }
                rule
            })
            .collect();

        Self::new(rules)
    }

    pub fn rules(&self) -> &[PropagationRule] {
        &self.rules
    }

    /// Compute the headers to propagate for one claim set
    ///
    /// Later rules targeting the same header overwrite earlier ones.
    pub fn propagate(&self, claims: &ClaimMap) -> HashMap<String, String> {
        let mut propagated = HashMap::new();

        for rule in &self.rules {
            match rule.value_for(claims) {
                Some(value) => {
                    propagated.insert(rule.to_header.clone(), value);
                }
                None => {
                    tracing::debug!("Claim {} not found, skipping header {}", rule.from_claim, rule.to_header);
                }
            }
        }

        propagated
    }
}

/// One-shot form of [`PropagationSpec::from_config`] followed by [`PropagationSpec::propagate`]
pub fn calculate_headers_to_propagate<S: AsRef<str>>(
    config: &[Vec<S>],
    claims: &ClaimMap,
) -> Result<HashMap<String, String>> {
    Ok(PropagationSpec::from_config(config)?.propagate(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn map(value: Value) -> ClaimMap {
        value.as_object().cloned().unwrap()
    }

    fn triples(entries: &[&[&str]]) -> Vec<Vec<String>> {
        entries
            .iter()
            .map(|entry| entry.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_empty_config_is_an_error() {
        let config: Vec<Vec<String>> = Vec::new();
        let err = calculate_headers_to_propagate(&config, &map(json!({"sub": "u1"}))).unwrap_err();
        assert!(matches!(err, JoseError::NoHeadersToPropagate(0)));
        assert!(PropagationSpec::new(Vec::new()).is_err());
    }

    #[test]
    fn test_nested_claim() {
        let config = triples(&[&["user.id", "X-User-Id", "false"]]);
        let headers = calculate_headers_to_propagate(&config, &map(json!({"user": {"id": 42}}))).unwrap();
        assert_eq!(headers.get("X-User-Id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_namespaced_uri_is_flat() {
        let config = triples(&[&["http://example.com/role", "X-Role", "false"]]);
        let claims = map(json!({"http://example.com/role": "admin"}));
        let headers = calculate_headers_to_propagate(&config, &claims).unwrap();
        assert_eq!(headers.get("X-Role").map(String::as_str), Some("admin"));
    }

    #[test]
    fn test_unresolved_rule_is_omitted() {
        let config = triples(&[
            &["sub", "X-Sub"],
            &["user.id", "X-User-Id"],
            &["email", "X-Email"],
            &["profile.name.first", "X-First-Name"],
        ]);
        let claims = map(json!({"sub": "u1", "user": "flat", "profile": {"name": {}}}));
        let headers = calculate_headers_to_propagate(&config, &claims).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["X-Sub"], "u1");
    }

    #[test]
    fn test_hashing() {
        let config = triples(&[&["sub", "X-Sub-Hash", "true"], &["sub", "X-Sub", "false"]]);
        let headers = calculate_headers_to_propagate(&config, &map(json!({"sub": "1234567890"}))).unwrap();
        assert_eq!(headers["X-Sub-Hash"], "01b307acba4f54f55aafc33bb06bbbf6ca803e9a");
        assert_eq!(headers["X-Sub"], "1234567890");
    }

    #[test]
    fn test_hashing_nested_normalized_value() {
        let config = triples(&[&["user.id", "X-User", "1"]]);
        let headers = calculate_headers_to_propagate(&config, &map(json!({"user": {"id": 42.0}}))).unwrap();
        // sha1("42")
        assert_eq!(headers["X-User"], "92cfceb39d57d914ed8b14d0e37643de0797ae56");
    }

    #[test]
    fn test_malformed_hash_flag_defaults_to_plain() {
        let config = triples(&[&["sub", "X-Sub", "yes please"]]);
        let headers = calculate_headers_to_propagate(&config, &map(json!({"sub": "u1"}))).unwrap();
        assert_eq!(headers["X-Sub"], "u1");
    }

    #[test]
    fn test_later_rule_overwrites() {
        let config = triples(&[&["sub", "X-Id"], &["email", "X-Id"]]);
        let claims = map(json!({"sub": "u1", "email": "u1@example.com"}));
        let headers = calculate_headers_to_propagate(&config, &claims).unwrap();
        assert_eq!(headers["X-Id"], "u1@example.com");
    }

    #[test]
    fn test_later_missing_rule_keeps_earlier_value() {
        let config = triples(&[&["sub", "X-Id"], &["email", "X-Id"]]);
        let headers = calculate_headers_to_propagate(&config, &map(json!({"sub": "u1"}))).unwrap();
        assert_eq!(headers["X-Id"], "u1");
    }

    #[test]
    fn test_normalized_values() {
        let config = triples(&[&["roles", "X-Roles"], &["exp", "X-Exp"], &["ratio", "X-Ratio"]]);
        let claims = map(json!({"roles": ["a", "b"], "exp": 1700000000.0, "ratio": 0.25}));
        let headers = calculate_headers_to_propagate(&config, &claims).unwrap();
        assert_eq!(headers["X-Roles"], "a,b");
        assert_eq!(headers["X-Exp"], "1700000000");
        assert_eq!(headers["X-Ratio"], "0.250000");
    }

    #[test]
    fn test_short_entries_are_skipped() {
        let config = triples(&[&["sub"], &["sub", "X-Sub"]]);
        let spec = PropagationSpec::from_config(&config).unwrap();
        assert_eq!(spec.rules(), &[PropagationRule::new("sub", "X-Sub", false)]);
    }

    #[test]
    fn test_only_short_entries_is_an_error() {
        let config = triples(&[&["sub"], &[]]);
        let err = PropagationSpec::from_config(&config).unwrap_err();
        assert!(matches!(err, JoseError::NoHeadersToPropagate(0)));
    }

    #[test]
    fn test_parse_bool() {
        for value in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(value), Some(true));
        }
        for value in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(value), Some(false));
        }
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(""), None);
    }
}
