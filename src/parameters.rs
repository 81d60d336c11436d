use std::borrow::Cow;

/// A value sent alongside an API call.
///
/// Scalars are coerced to their string form before signing; named bytes are
/// sent as a file part of a multipart body and never signed.
#[derive(Clone, Debug, PartialEq)]
pub enum OAuthParameter<'a> {
    StringValue(Cow<'a, str>),
    IntValue(i64),
    FloatValue(f64),
    BoolValue(bool),
    NamedByteValue(Cow<'a, str>, Cow<'a, [u8]>),
}

impl<'a> From<&'a str> for OAuthParameter<'a> {
    fn from(s: &'a str) -> Self {
        OAuthParameter::StringValue(s.into())
    }
}

impl From<String> for OAuthParameter<'_> {
    fn from(s: String) -> Self {
        OAuthParameter::StringValue(s.into())
    }
}

impl<'a> From<Cow<'a, str>> for OAuthParameter<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        OAuthParameter::StringValue(s)
    }
}

impl From<i64> for OAuthParameter<'_> {
    fn from(n: i64) -> Self {
        OAuthParameter::IntValue(n)
    }
}

impl From<f64> for OAuthParameter<'_> {
    fn from(n: f64) -> Self {
        OAuthParameter::FloatValue(n)
    }
}

impl From<bool> for OAuthParameter<'_> {
    fn from(b: bool) -> Self {
        OAuthParameter::BoolValue(b)
    }
}

impl<'a> OAuthParameter<'a> {
    pub fn from_bytes<TName: Into<Cow<'a, str>>, TValue: Into<Cow<'a, [u8]>>>(
        name: TName,
        bytes: TValue,
    ) -> Self {
        OAuthParameter::NamedByteValue(name.into(), bytes.into())
    }

    pub fn is_payload(&self) -> bool {
        matches!(self, OAuthParameter::NamedByteValue(_, _))
    }

    /// String form used for signing and form bodies. `None` for payloads.
    pub fn to_signable(&self) -> Option<Cow<'a, str>> {
        match self {
            OAuthParameter::StringValue(s) => Some(s.clone()),
            OAuthParameter::IntValue(n) => Some(Cow::Owned(n.to_string())),
            OAuthParameter::FloatValue(n) => Some(Cow::Owned(n.to_string())),
            OAuthParameter::BoolValue(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            OAuthParameter::NamedByteValue(_, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion() {
        assert_eq!(OAuthParameter::from("x").to_signable().unwrap(), "x");
        assert_eq!(OAuthParameter::from(42i64).to_signable().unwrap(), "42");
        assert_eq!(OAuthParameter::from(1.5f64).to_signable().unwrap(), "1.5");
        assert_eq!(OAuthParameter::from(true).to_signable().unwrap(), "true");
        let payload = OAuthParameter::from_bytes("photo.jpg", vec![0xff, 0xd8]);
        assert!(payload.is_payload());
        assert!(payload.to_signable().is_none());
    }
}
