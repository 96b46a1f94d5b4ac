use serde::{Deserialize, Serialize};

/// Marker the backend puts in the message of a stock-limit rejection.
pub const INSUFFICIENT_STOCK_MARKER: &str = "Insufficient stock";

/// Error payload returned by the backend on non-success responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: Some(message.into()),
            details: None,
        }
    }

    /// Best-effort decode; empty or non-JSON bodies yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

pub fn is_insufficient_stock(message: &str) -> bool {
    message.contains(INSUFFICIENT_STOCK_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_error_body() {
        let body = ErrorBody::parse(
            r#"{"status":400,"message":"Insufficient stock. Available: 2, Requested: 5","details":null}"#,
        )
        .expect("error body");
        assert_eq!(body.status, Some(400));
        assert!(is_insufficient_stock(body.message().expect("message")));
    }

    #[test]
    fn blank_message_is_treated_as_missing() {
        let body = ErrorBody::parse(r#"{"status":500,"message":"  "}"#).expect("error body");
        assert_eq!(body.message(), None);
    }

    #[test]
    fn non_json_body_is_ignored() {
        assert!(ErrorBody::parse("<html>502 Bad Gateway</html>").is_none());
        assert!(ErrorBody::parse("").is_none());
    }
}
