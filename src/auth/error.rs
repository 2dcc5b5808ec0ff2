/// Authorization-specific errors for role, scope and field verification
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthorizationError {
    /// No authentication token was provided
    #[error("Missing authentication token")]
    MissingToken,

    /// Token validation failed for the given reason
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Required role was not found in token claims
    #[error("Insufficient role. Required one of: {}", .0.join(", "))]
    InsufficientRole(Vec<String>),

    /// Required scope(s) were not found in token claims
    #[error("Insufficient scope. Required: {}", .0.join(", "))]
    InsufficientScope(Vec<String>),

    /// A required custom claim was missing or held another value
    #[error("Custom claims mismatch. Required: {}", .0.join(", "))]
    CustomFieldsMismatch(Vec<String>),
}

impl AuthorizationError {
    /// Whether the caller failed to authenticate, as opposed to lacking permissions
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, AuthorizationError::MissingToken | AuthorizationError::InvalidToken(_))
    }
}

#[cfg(feature = "axum-integration")]
impl axum::response::IntoResponse for AuthorizationError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = if self.is_authentication_failure() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::FORBIDDEN
        };
        (status, self.to_string()).into_response()
    }
}
