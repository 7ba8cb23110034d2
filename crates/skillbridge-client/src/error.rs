//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the SkillBridge backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No token is available; nothing was sent.
    #[error("user not authenticated")]
    NotAuthenticated,

    /// The backend rejected the token (HTTP 401/403).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The backend returned an error response.
    #[error("{message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Callable functions are not configured.
    #[error("callable function {0} is unavailable: no functions_url configured")]
    FunctionUnavailable(String),
}

impl ClientError {
    /// Build an API error from a non-success response body.
    ///
    /// Prefers the body's `error` field, then the raw body, then a generic
    /// message with the status code.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("API Error: {status}"));

        match status {
            401 | 403 => ClientError::AuthenticationFailed(message),
            _ => ClientError::ApiError { status, message },
        }
    }

    /// Returns `true` if sending the same request again cannot succeed.
    pub fn is_permanent(&self) -> bool {
        match self {
            ClientError::NotAuthenticated
            | ClientError::AuthenticationFailed(_)
            | ClientError::Decode(_)
            | ClientError::FunctionUnavailable(_) => true,
            ClientError::ApiError { status, .. } => (400..500).contains(status),
            ClientError::Timeout(_) | ClientError::NetworkError(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_error_field() {
        let err = ClientError::from_response(400, r#"{"error":"Lesson not found"}"#);
        assert_eq!(err.to_string(), "Lesson not found");
        assert!(matches!(err, ClientError::ApiError { status: 400, .. }));
    }

    #[test]
    fn message_falls_back_to_body_then_status() {
        let err = ClientError::from_response(502, "Bad Gateway");
        assert_eq!(err.to_string(), "Bad Gateway");

        let err = ClientError::from_response(500, "  ");
        assert_eq!(err.to_string(), "API Error: 500");

        let err = ClientError::from_response(500, r#"{"detail":"x"}"#);
        assert_eq!(err.to_string(), r#"{"detail":"x"}"#);
    }

    #[test]
    fn auth_statuses_are_classified() {
        let err = ClientError::from_response(401, r#"{"error":"token expired"}"#);
        assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m == "token expired"));
        assert!(matches!(
            ClientError::from_response(403, ""),
            ClientError::AuthenticationFailed(_)
        ));
    }

    #[test]
    fn permanence() {
        assert!(ClientError::NotAuthenticated.is_permanent());
        assert!(ClientError::from_response(404, "").is_permanent());
        assert!(!ClientError::from_response(503, "").is_permanent());
        assert!(!ClientError::Timeout(30).is_permanent());
    }
}
