use thiserror::Error;

/// Failure of a single API call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The server answered with `success: false` or an `error` field.
    #[error("{}", .0.as_deref().unwrap_or("request rejected by server"))]
    Rejected(Option<String>),
}

impl ApiError {
    /// Transport and decode failures are reported as "connection error".
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Decode(_))
    }

    /// Server text of a rejection.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ApiError::Rejected(reason) => reason.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        assert_eq!(
            ApiError::Rejected(Some("Question vide".to_string())).to_string(),
            "Question vide"
        );
        assert_eq!(ApiError::Rejected(None).to_string(), "request rejected by server");
    }

    #[test]
    fn test_connectivity_classification() {
        assert!(ApiError::Transport("refused".into()).is_connectivity());
        assert!(ApiError::Decode("eof".into()).is_connectivity());
        assert!(!ApiError::Rejected(None).is_connectivity());
    }
}
