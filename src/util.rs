use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode};
use std::borrow::Cow;

// https://tools.ietf.org/html/rfc5849#section-3.6
// * ALPHA, DIGIT, '-', '.', '_', '~' MUST NOT be encoded.
// * All other characters MUST be encoded.
// * The two hexadecimal characters used to represent encoded
//   characters MUST be uppercase.
const TARGETS_FOR_PARAMS: &AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(input: &str) -> PercentEncode<'_> {
    utf8_percent_encode(input, TARGETS_FOR_PARAMS)
}

pub fn percent_encode_cow<'a, T: Into<Cow<'a, str>>>(input: T) -> Cow<'a, str> {
    match input.into() {
        Cow::Borrowed(r) => Cow::from(percent_encode(r)),
        Cow::Owned(v) => Cow::from(percent_encode(&v).to_string()),
    }
}

/// Splits a URL into the signature base URI and its decoded query pairs.
///
/// The base URI keeps scheme, host, port and path; query and fragment are
/// dropped as required for the signature base string.
pub fn url_to_endpoint_and_queries(url: &url::Url) -> (String, Vec<(String, String)>) {
    let queries = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut endpoint = url.clone();
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    (endpoint.to_string(), queries)
}

/// Encodes pairs as an `application/x-www-form-urlencoded` body.
///
/// Uses the same RFC 3986 set as signing so the server decodes exactly the
/// values that were signed.
pub fn encode_form<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<String>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_to_endpoint_and_queries() {
        let s = "https://api.flickr.com/services/rest/?method=flickr.test.echo&name=a%20b#frag";
        let u = url::Url::parse(s).unwrap();
        let (core, queries) = url_to_endpoint_and_queries(&u);
        assert_eq!(core, "https://api.flickr.com/services/rest/");
        assert_eq!(
            queries,
            vec![
                ("method".to_string(), "flickr.test.echo".to_string()),
                ("name".to_string(), "a b".to_string()),
            ]
        );

        let n = "https://up.flickr.com/services/upload/";
        let nu = url::Url::parse(n).unwrap();
        let (core, queries) = url_to_endpoint_and_queries(&nu);
        assert_eq!(core, n);
        assert!(queries.is_empty());
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("a b&c=d").to_string(), "a%20b%26c%3Dd");
        assert_eq!(percent_encode("-._~").to_string(), "-._~");
        assert_eq!(percent_encode("*+/").to_string(), "%2A%2B%2F");
        assert_eq!(percent_encode("パラ").to_string(), "%E3%83%91%E3%83%A9");
        assert_eq!(percent_encode_cow(String::from("x y")), "x%20y");
    }

    #[test]
    fn test_encode_form() {
        let body = encode_form(vec![("photo_id", "123"), ("title", "Sunset & sea")]);
        assert_eq!(body, "photo_id=123&title=Sunset%20%26%20sea");
        assert_eq!(encode_form(Vec::new()), "");
    }
}
