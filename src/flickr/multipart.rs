use crate::oauth1::SignedContent;
use uuid::Uuid;

pub const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// A fresh boundary token; the UUID keeps it from colliding with image bytes.
pub fn boundary() -> String {
    format!("----PhotoservFormBoundary{}", Uuid::new_v4().simple())
}

pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

/// Encodes signed parameters as text fields followed by the attachments.
pub fn encode(signed: &SignedContent, boundary: &str) -> Vec<u8> {
    let mut body = Vec::new();
    for (key, value) in &signed.payload {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", key).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for attachment in &signed.attachments {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                attachment.field, attachment.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", PHOTO_CONTENT_TYPE).as_bytes());
        body.extend_from_slice(&attachment.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth1::Attachment;
    use std::borrow::Cow;

    #[test]
    fn test_boundary_is_unique() {
        let a = boundary();
        let b = boundary();
        assert_ne!(a, b);
        assert!(a.starts_with("----PhotoservFormBoundary"));
        assert_eq!(content_type("xyz"), "multipart/form-data; boundary=xyz");
    }

    #[test]
    fn test_encode_layout() {
        let signed = SignedContent {
            signature: "sig".into(),
            nonce: Cow::Borrowed("n"),
            timestamp: 1,
            payload: vec![
                (Cow::Borrowed("oauth_signature"), Cow::Borrowed("sig=")),
                (Cow::Borrowed("title"), Cow::Borrowed("Sunset & sea")),
            ],
            attachments: vec![Attachment {
                field: Cow::Borrowed("photo"),
                filename: Cow::Borrowed("photo.jpg"),
                bytes: Cow::Owned(vec![0xff, 0xd8, 0x00]),
            }],
        };
        let body = encode(&signed, "BOUND");

        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"--BOUND\r\nContent-Disposition: form-data; name=\"oauth_signature\"\r\n\r\nsig=\r\n",
        );
        expected.extend_from_slice(
            b"--BOUND\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nSunset & sea\r\n",
        );
        expected.extend_from_slice(
            b"--BOUND\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
        );
        expected.extend_from_slice(&[0xff, 0xd8, 0x00]);
        expected.extend_from_slice(b"\r\n--BOUND--\r\n");
        assert_eq!(body, expected);
    }
}
