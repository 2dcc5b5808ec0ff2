use crate::jose::types::ClaimMap;

/// Resolve a dot-separated claim path to its terminal key and containing set
///
/// Every segment but the last must name a nested claim set. Returns `None`
/// when a segment is missing or is not a mapping; callers treat that as an
/// absent claim.
///
/// ```rust
/// use jose_pep::auth::resolve_nested;
/// use serde_json::json;
///
/// let claims = json!({"user": {"id": 42}});
/// let (key, inner) = resolve_nested("user.id", claims.as_object().unwrap()).unwrap();
/// assert_eq!(key, "id");
/// assert_eq!(inner["id"], 42);
/// ```
pub fn resolve_nested<'p, 'c>(path: &'p str, claims: &'c ClaimMap) -> Option<(&'p str, &'c ClaimMap)> {
    let (parents, terminal) = match path.rsplit_once('.') {
        Some((parents, terminal)) => (Some(parents), terminal),
        None => (None, path),
    };

    let mut current = claims;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        current = current.get(segment)?.as_object()?;
    }

    Some((terminal, current))
}

/// Whether a claim key should be walked as a nested path
///
/// Namespaced claim URIs (`http://example.com/role`) contain dots but name a
/// single flat key, so keys starting with `http` are never split.
pub fn is_nested_path(key: &str) -> bool {
    key.contains('.') && !key.starts_with("http")
}

/// Resolve `key` to (terminal key, containing set), applying the nested-path
/// rule only when [`is_nested_path`] holds
pub fn resolve_claim_key<'k, 'c>(key: &'k str, claims: &'c ClaimMap) -> Option<(&'k str, &'c ClaimMap)> {
    if is_nested_path(key) {
        resolve_nested(key, claims)
    } else {
        Some((key, claims))
    }
}
