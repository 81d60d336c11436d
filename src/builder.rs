use crate::oauth1::OAuthSigner;
use crate::parameters::OAuthParameter;
use std::borrow::Cow;

/// A Flickr API request before signing.
///
/// A request with a method name goes to the REST endpoint; a request without
/// one is an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest<'a> {
    method: Option<Cow<'a, str>>,
    parameters: Vec<(Cow<'a, str>, OAuthParameter<'a>)>,
}

impl<'a> ApiRequest<'a> {
    pub fn method<T: Into<Cow<'a, str>>>(method: T) -> Self {
        ApiRequest {
            method: Some(method.into()),
            parameters: Vec::new(),
        }
    }

    pub fn upload() -> Self {
        ApiRequest {
            method: None,
            parameters: Vec::new(),
        }
    }

    pub fn param<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<Cow<'a, str>>,
        V: Into<OAuthParameter<'a>>,
    {
        self.parameters.push((key.into(), value.into()));
        self
    }

    pub fn param_bytes<TKey, TName, TBytes>(mut self, key: TKey, name: TName, bytes: TBytes) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TName: Into<Cow<'a, str>>,
        TBytes: Into<Cow<'a, [u8]>>,
    {
        self.parameters
            .push((key.into(), OAuthParameter::from_bytes(name, bytes)));
        self
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn is_upload(&self) -> bool {
        self.method.is_none()
    }

    pub fn parameters(&self) -> &[(Cow<'a, str>, OAuthParameter<'a>)] {
        &self.parameters
    }

    /// Merges the REST call parameters and hands everything to `signer`.
    pub fn sign<TSigner, TSecret, TSigned>(self, signer: TSigner, secrets: &TSecret) -> TSigned
    where
        TSigner: OAuthSigner<'a, TSecret, TSigned>,
    {
        let mut parameters = self.parameters;
        if let Some(method) = self.method {
            parameters.push((Cow::Borrowed("method"), OAuthParameter::StringValue(method)));
            parameters.push((Cow::Borrowed("format"), OAuthParameter::from("json")));
            parameters.push((Cow::Borrowed("nojsoncallback"), OAuthParameter::from("1")));
        }
        signer.sign(parameters, secrets)
    }
}
