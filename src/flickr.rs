//! Flickr API client: signs requests, dispatches them and normalizes responses.

mod multipart;
mod response;
mod transport;

pub use response::{parse_rest_response, parse_upload_response};
#[cfg(test)]
pub use transport::MockTransport;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{HttpResponse, Transport, DEFAULT_TIMEOUT};

use crate::builder::ApiRequest;
use crate::error::{Error, TransportError};
use crate::oauth1::{Secrets, SignedContent, Signer};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error};

pub const REST_ENDPOINT: &str = "https://api.flickr.com/services/rest/";
pub const UPLOAD_ENDPOINT: &str = "https://up.flickr.com/services/upload/";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

/// Parsed result of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Decoded JSON of a REST method call.
    Json(Value),
    /// Id of a freshly uploaded photo.
    PhotoId(String),
}

pub struct FlickrClient<T> {
    credentials: Credentials,
    transport: T,
    rest_endpoint: url::Url,
    upload_endpoint: url::Url,
}

impl<T: Transport> FlickrClient<T> {
    pub fn new(credentials: Credentials, transport: T) -> Self {
        let rest = url::Url::parse(REST_ENDPOINT).expect("REST_ENDPOINT is a valid URL");
        let upload = url::Url::parse(UPLOAD_ENDPOINT).expect("UPLOAD_ENDPOINT is a valid URL");
        Self::with_endpoints(credentials, transport, rest, upload)
    }

    pub fn with_endpoints(
        credentials: Credentials,
        transport: T,
        rest_endpoint: url::Url,
        upload_endpoint: url::Url,
    ) -> Self {
        FlickrClient {
            credentials,
            transport,
            rest_endpoint,
            upload_endpoint,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Signs and sends `request`, routing uploads to the upload endpoint.
    pub fn call(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        if request.is_upload() {
            self.upload(request).map(ApiResponse::PhotoId)
        } else {
            self.call_method(request).map(ApiResponse::Json)
        }
    }

    /// Sends a REST method call as a form-encoded POST.
    pub(crate) fn call_method(&self, request: ApiRequest) -> Result<Value, Error> {
        debug_assert!(!request.is_upload(), "upload request sent to the REST endpoint");
        let method = request.method_name().unwrap_or_default().to_string();
        let signed = self.sign(&self.rest_endpoint, request);
        debug!(method = %method, nonce = %signed.nonce, "calling Flickr API");

        let body = signed.form_body().into_bytes();
        let response = self
            .transport
            .post(self.rest_endpoint.as_str(), FORM_CONTENT_TYPE, body)
            .map_err(|e| log_transport_error(&method, e))?;
        let body = require_success(&method, response)?;
        parse_rest_response(&body)
    }

    /// Sends an upload as `multipart/form-data` and returns the new photo id.
    pub(crate) fn upload(&self, request: ApiRequest) -> Result<String, Error> {
        debug_assert!(request.is_upload(), "REST method sent to the upload endpoint");
        let signed = self.sign(&self.upload_endpoint, request);
        let boundary = multipart::boundary();
        let body = multipart::encode(&signed, &boundary);
        debug!(nonce = %signed.nonce, bytes = body.len(), "uploading to Flickr");

        let response = self
            .transport
            .post(
                self.upload_endpoint.as_str(),
                &multipart::content_type(&boundary),
                body,
            )
            .map_err(|e| log_transport_error("upload", e))?;
        let body = require_success("upload", response)?;
        parse_upload_response(&body)
    }

    fn sign<'a>(&'a self, endpoint: &url::Url, request: ApiRequest<'a>) -> SignedContent<'a> {
        let signer = Signer::new(self.credentials.consumer_key.as_str(), endpoint, "POST")
            .token(self.credentials.access_token.as_str());
        let secrets = Secrets::new(self.credentials.consumer_secret.as_str())
            .token_secret(self.credentials.access_token_secret.as_str());
        request.sign(signer, &secrets)
    }
}

fn require_success(call: &str, response: HttpResponse) -> Result<String, Error> {
    if response.is_success() {
        return Ok(response.body);
    }
    error!(
        call,
        status = response.status,
        body = %response.body,
        "HTTP error calling Flickr API"
    );
    Err(TransportError::Status {
        status: response.status,
        body: response.body,
    }
    .into())
}

fn log_transport_error(call: &str, e: TransportError) -> TransportError {
    error!(call, error = %e, "error calling Flickr API");
    e
}
