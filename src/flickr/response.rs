use crate::error::{Error, ProviderError};
use serde_json::Value;
use tracing::error;

const STAT_FAIL: &str = "fail";

/// Parses a REST (JSON) response, failing when `stat` is `fail`.
pub fn parse_rest_response(body: &str) -> Result<Value, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, body, "failed to parse Flickr JSON response");
        Error::InvalidResponse(e.to_string())
    })?;

    if value.get("stat").and_then(Value::as_str) == Some(STAT_FAIL) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        let error = match value.get("code") {
            Some(Value::String(code)) => ProviderError::with_code(code.as_str(), message),
            Some(Value::Number(code)) => ProviderError::with_code(code.to_string(), message),
            _ => ProviderError::new(message),
        };
        return Err(error.into());
    }
    Ok(value)
}

/// Parses an upload (XML) response into the new photo id.
pub fn parse_upload_response(body: &str) -> Result<String, Error> {
    let doc = roxmltree::Document::parse(body).map_err(|e| {
        error!(error = %e, body, "failed to parse Flickr upload response XML");
        Error::InvalidResponse(e.to_string())
    })?;
    let root = doc.root_element();

    if root.attribute("stat") == Some(STAT_FAIL) {
        let err = root.children().find(|n| n.has_tag_name("err"));
        let code = err.and_then(|e| e.attribute("code")).unwrap_or("unknown");
        let message = err
            .and_then(|e| e.attribute("msg"))
            .unwrap_or("Unknown error");
        return Err(ProviderError::with_code(code, message).into());
    }

    root.children()
        .find(|n| n.has_tag_name("photoid"))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| ProviderError::new("missing photo id").into())
}
