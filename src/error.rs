use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("invalid response from Flickr: {0}")]
    InvalidResponse(String),
    #[error("plugin store error: {0}")]
    Store(String),
    #[error("failed to read photo image: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for network-level failures, which are worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Flickr API HTTP error: {status}")]
    Status { status: u16, body: String },
    #[error("Flickr API request timed out: {0}")]
    Timeout(String),
    #[error("Flickr API connection error: {0}")]
    Connection(String),
    #[error("Flickr API request failed: {0}")]
    Request(String),
}

/// A well-formed response in which Flickr rejected the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        ProviderError {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "Flickr API error [{}]: {}", code, self.message),
            None => write!(f, "Flickr API error: {}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Maximum published photo limit ({limit}) reached")]
    PhotoLimitReached { limit: u64 },
    #[error("Could not retrieve photo image at size '{size}'")]
    MissingImage { size: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ProviderError::with_code("5", "Filetype was not recognised").to_string(),
            "Flickr API error [5]: Filetype was not recognised"
        );
        assert_eq!(
            Error::from(PolicyError::PhotoLimitReached { limit: 3 }).to_string(),
            "Maximum published photo limit (3) reached"
        );
        assert!(Error::from(TransportError::Timeout("120s".into())).is_transport());
        assert!(!Error::from(ProviderError::new("nope")).is_transport());
    }
}
