use thiserror::Error;

/// Error code EC2 returns when a network interface id does not exist
pub const NETWORK_INTERFACE_NOT_FOUND: &str = "InvalidNetworkInterfaceID.NotFound";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{code}: {message} (HTTP {status})")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,
}

impl ApiError {
    /// The EC2 error code, when the service returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(NETWORK_INTERFACE_NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_matches_only_the_interface_code() {
        let err = ApiError::Service {
            status: 400,
            code: NETWORK_INTERFACE_NOT_FOUND.to_string(),
            message: "The networkInterface ID 'eni-1' does not exist".to_string(),
        };
        assert!(err.is_not_found());

        let err = ApiError::Service {
            status: 400,
            code: "InvalidSubnetID.NotFound".to_string(),
            message: "no such subnet".to_string(),
        };
        assert!(!err.is_not_found());
        assert!(!ApiError::ServiceUnavailable.is_not_found());
    }

    #[test]
    fn service_error_display_includes_code_and_status() {
        let err = ApiError::Service {
            status: 400,
            code: "UnauthorizedOperation".to_string(),
            message: "You are not authorized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "UnauthorizedOperation: You are not authorized (HTTP 400)"
        );
    }
}
