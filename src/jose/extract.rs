//! Bearer token extraction from request headers

use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;

/// Extract Bearer token from Authorization header
///
/// # Example
///
/// ```rust
/// use http::HeaderMap;
/// use jose_pep::jose::extract_bearer_token;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("Authorization", "Bearer my-token".parse().unwrap());
///
/// let token = extract_bearer_token(&headers);
/// assert_eq!(token, Some("my-token".to_string()));
/// ```
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract a token stored in the cookie named `cookie_key`
pub fn extract_cookie_token(headers: &HeaderMap, cookie_key: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_key)
        .map(|(_, value)| value.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract a token from the Authorization header, falling back to a cookie
pub fn extract_token(headers: &HeaderMap, cookie_key: Option<&str>) -> Option<String> {
    extract_bearer_token(headers)
        .or_else(|| cookie_key.and_then(|key| extract_cookie_token(headers, key)))
}
