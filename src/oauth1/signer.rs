use crate::parameters::OAuthParameter;
use crate::util::{self, percent_encode, percent_encode_cow};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::borrow::Cow;
use uuid::Uuid;

type HmacSha1 = Hmac<Sha1>;

pub const OAUTH_VALUE_VERSION: &str = "1.0";
pub const OAUTH_VALUE_SIGMETHOD_HMACSHA1: &str = "HMAC-SHA1";

pub const OAUTH_PARAM_KEY_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_PARAM_KEY_NONCE: &str = "oauth_nonce";
pub const OAUTH_PARAM_KEY_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_PARAM_KEY_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_PARAM_KEY_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_PARAM_KEY_TOKEN: &str = "oauth_token";
pub const OAUTH_PARAM_KEY_VERSION: &str = "oauth_version";

// excluded from the signature base string (RFC 5849 3.4.1.3.1)
const OAUTH_PARAM_KEY_REALM: &str = "realm";

pub trait OAuthSigner<'a, TSecret, TSigned> {
    fn sign(self, param: Vec<(Cow<'a, str>, OAuthParameter<'a>)>, secret: &TSecret) -> TSigned;
}

/// A binary part carried next to the signed parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Attachment<'a> {
    pub field: Cow<'a, str>,
    pub filename: Cow<'a, str>,
    pub bytes: Cow<'a, [u8]>,
}

/// Contents signed with OAuth 1.0a.
///
/// `payload` holds every parameter to send, unencoded and sorted by key,
/// including the `oauth_*` parameters and `oauth_signature`.
#[derive(Debug)]
pub struct SignedContent<'a> {
    pub signature: String,
    pub nonce: Cow<'a, str>,
    pub timestamp: i64,
    pub payload: Vec<(Cow<'a, str>, Cow<'a, str>)>,
    pub attachments: Vec<Attachment<'a>>,
}

impl<'a> SignedContent<'a> {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_ref())
    }

    /// The payload as an `application/x-www-form-urlencoded` body.
    pub fn form_body(&self) -> String {
        util::encode_form(self.payload.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
    }
}

pub struct Signer<'a, T> {
    token: T,
    consumer_key: Cow<'a, str>,
    endpoint: url::Url,
    http_method: Cow<'a, str>,
    nonce: Option<Cow<'a, str>>,
    timestamp: Option<i64>,
    version: Option<Cow<'a, str>>,
}

impl<'a> Signer<'a, ()> {
    pub fn new<TConsumerKey, THttpMethod>(
        consumer_key: TConsumerKey,
        endpoint: &url::Url,
        http_method: THttpMethod,
    ) -> Self
    where
        TConsumerKey: Into<Cow<'a, str>>,
        THttpMethod: Into<Cow<'a, str>>,
    {
        Signer {
            token: (),
            consumer_key: consumer_key.into(),
            endpoint: endpoint.clone(),
            http_method: http_method.into(),
            nonce: None,
            timestamp: None,
            version: Some(Cow::Borrowed(OAUTH_VALUE_VERSION)),
        }
    }

    pub fn token<TToken: Into<Cow<'a, str>>>(self, token: TToken) -> Signer<'a, Cow<'a, str>> {
        Signer {
            token: token.into(),
            consumer_key: self.consumer_key,
            endpoint: self.endpoint,
            http_method: self.http_method,
            nonce: self.nonce,
            timestamp: self.timestamp,
            version: self.version,
        }
    }
}

impl<'a, T> Signer<'a, T> {
    /// Pins the nonce; a fresh UUID is generated otherwise.
    pub fn nonce<TNonce: Into<Cow<'a, str>>>(mut self, nonce: TNonce) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Pins the timestamp; the current time is used otherwise.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn version<TVersion: Into<Cow<'a, str>>>(mut self, version: Option<TVersion>) -> Self {
        self.version = version.map(|v| v.into());
        self
    }
}

pub struct Secrets<'a, T> {
    token_secret: T,
    consumer_secret: Cow<'a, str>,
}

impl<'a> Secrets<'a, ()> {
    pub fn new<T>(consumer_secret: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        Secrets {
            token_secret: (),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn token_secret<T>(self, token_secret: T) -> Secrets<'a, Cow<'a, str>>
    where
        T: Into<Cow<'a, str>>,
    {
        Secrets {
            token_secret: token_secret.into(),
            consumer_secret: self.consumer_secret,
        }
    }
}

impl<'a> OAuthSigner<'a, Secrets<'a, ()>, SignedContent<'a>> for Signer<'a, ()> {
    fn sign(
        self,
        param: Vec<(Cow<'a, str>, OAuthParameter<'a>)>,
        secrets: &Secrets<'a, ()>,
    ) -> SignedContent<'a> {
        sign_oauthv1(
            &self.endpoint,
            &self.http_method,
            (self.consumer_key, &secrets.consumer_secret),
            None,
            self.nonce,
            self.version,
            self.timestamp,
            param,
        )
    }
}

impl<'a> OAuthSigner<'a, Secrets<'a, Cow<'a, str>>, SignedContent<'a>>
    for Signer<'a, Cow<'a, str>>
{
    fn sign(
        self,
        param: Vec<(Cow<'a, str>, OAuthParameter<'a>)>,
        secrets: &Secrets<'a, Cow<'a, str>>,
    ) -> SignedContent<'a> {
        sign_oauthv1(
            &self.endpoint,
            &self.http_method,
            (self.consumer_key, &secrets.consumer_secret),
            Some((self.token, &secrets.token_secret)),
            self.nonce,
            self.version,
            self.timestamp,
            param,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn sign_oauthv1<'a>(
    endpoint: &url::Url,
    http_method: &str,
    consumer_key_and_secret: (Cow<'a, str>, &str),
    token_and_secret: Option<(Cow<'a, str>, &str)>,
    nonce: Option<Cow<'a, str>>,
    version: Option<Cow<'a, str>>,
    timestamp: Option<i64>,
    parameters: Vec<(Cow<'a, str>, OAuthParameter<'a>)>,
) -> SignedContent<'a> {
    // destructure & setup variables
    let (c_key, c_secret) = consumer_key_and_secret;
    let (token, token_secret) = token_and_secret
        .map(|(t, s)| (Some(t), s))
        .unwrap_or((None, ""));
    let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp());
    // generate nonce when it is not specified
    let nonce = nonce.unwrap_or_else(|| Cow::from(format!("{}", Uuid::new_v4())));

    let (base_uri, query_params) = util::url_to_endpoint_and_queries(endpoint);

    // split binary parts off, they are never signed
    let mut attachments = Vec::new();
    let mut user_params = Vec::with_capacity(parameters.len());
    for (k, v) in parameters {
        match v {
            OAuthParameter::NamedByteValue(filename, bytes) => attachments.push(Attachment {
                field: k,
                filename,
                bytes,
            }),
            other => {
                if let Some(value) = other.to_signable() {
                    user_params.push((k, value));
                }
            }
        }
    }

    let mut payload = build_basic_params(c_key, token, nonce.clone(), timestamp, version);
    payload.extend(
        query_params
            .into_iter()
            .map(|(k, v)| (Cow::Owned(k), Cow::Owned(v))),
    );
    payload.extend(user_params);
    payload.sort();

    let signature = sign(http_method, &base_uri, &payload, c_secret, token_secret);
    payload.push((
        Cow::Borrowed(OAUTH_PARAM_KEY_SIGNATURE),
        Cow::Owned(signature.clone()),
    ));
    payload.sort();

    SignedContent {
        signature,
        nonce,
        timestamp,
        payload,
        attachments,
    }
}

fn build_basic_params<'a>(
    consumer_key: Cow<'a, str>,
    token: Option<Cow<'a, str>>,
    nonce: Cow<'a, str>,
    timestamp: i64,
    version: Option<Cow<'a, str>>,
) -> Vec<(Cow<'a, str>, Cow<'a, str>)> {
    let params = vec![
        (
            OAUTH_PARAM_KEY_TIMESTAMP,
            Some(Cow::Owned(format!("{}", timestamp))),
        ),
        (OAUTH_PARAM_KEY_CONSUMER_KEY, Some(consumer_key)),
        (
            OAUTH_PARAM_KEY_SIGNATURE_METHOD,
            Some(Cow::Borrowed(OAUTH_VALUE_SIGMETHOD_HMACSHA1)),
        ),
        (OAUTH_PARAM_KEY_NONCE, Some(nonce)),
        // noneable parameters
        (OAUTH_PARAM_KEY_VERSION, version),
        (OAUTH_PARAM_KEY_TOKEN, token),
    ];

    params
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (Cow::from(k), v)))
        .collect()
}

/// Computes the HMAC-SHA1 signature of a request.
///
/// `params` are the unencoded parameters to send, excluding
/// `oauth_signature`; `endpoint` must not carry a query string.
pub fn sign<K, V>(
    http_method: &str,
    endpoint: &str,
    params: &[(K, V)],
    consumer_secret: &str,
    token_secret: &str,
) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    // prepare contents to sign -----------------------------------------------
    let mut encoded_params = params
        .iter()
        .filter(|(k, _)| k.as_ref() != OAUTH_PARAM_KEY_REALM)
        .map(|(k, v)| (percent_encode_cow(k.as_ref()), percent_encode_cow(v.as_ref())))
        .collect::<Vec<(Cow<str>, Cow<str>)>>();
    encoded_params.sort();
    let param_str = encoded_params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<String>>()
        .join("&");
    // parameters end up encoded twice
    let http_method = http_method.to_ascii_uppercase();
    let base_str = format!(
        "{}&{}&{}",
        percent_encode(&http_method),
        percent_encode(endpoint),
        percent_encode(&param_str)
    );

    // prepare sign key -------------------------------------------------------
    let sign_key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    // generate signature -----------------------------------------------------
    let mut mac = HmacSha1::new_from_slice(sign_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(base_str.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
