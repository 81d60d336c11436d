use crate::error::TransportError;
use std::time::Duration;

/// Upper bound on every outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP POST.
///
/// Implementations return any response the server produced, whatever its
/// status; only failures to obtain a response are errors.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn post(&self, url: &str, content_type: &str, body: Vec<u8>)
        -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use super::{HttpResponse, Transport, DEFAULT_TIMEOUT};
    use crate::error::TransportError;
    use reqwest::blocking::Client;
    use reqwest::header::CONTENT_TYPE;
    use std::time::Duration;

    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Result<Self, TransportError> {
            Self::with_timeout(DEFAULT_TIMEOUT)
        }

        pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
            Client::builder()
                .timeout(timeout)
                .build()
                .map(|client| ReqwestTransport { client })
                .map_err(|e| TransportError::Request(e.to_string()))
        }
    }

    impl Transport for ReqwestTransport {
        fn post(
            &self,
            url: &str,
            content_type: &str,
            body: Vec<u8>,
        ) -> Result<HttpResponse, TransportError> {
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .map_err(classify)?;
            let status = response.status().as_u16();
            let body = response.text().map_err(classify)?;
            Ok(HttpResponse { status, body })
        }
    }

    fn classify(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connection(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        let ok = HttpResponse {
            status: 200,
            body: String::new(),
        };
        assert!(ok.is_success());
        let not_found = HttpResponse {
            status: 404,
            body: "Not Found".into(),
        };
        assert!(!not_found.is_success());
    }
}
