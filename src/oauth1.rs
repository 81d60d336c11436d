//! OAuth 1.0a request signing (RFC 5849), HMAC-SHA1 only.

mod signer;

pub use signer::*;
