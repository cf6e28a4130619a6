/* 📖 # Why address CSP domains by a base64url reference?

Domain identifiers may contain characters that are unsafe in a path segment, so the
vendor API never puts the raw domain in a URL. Every domain-scoped CSP route carries
`base64url(domain)` without padding instead, and the server decodes it on each
request. The reference is the only link between the external handle and the store
key, so encoding and decoding must round-trip exactly.
*/

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Why a domain reference could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainRefError {
    /// Not valid unpadded base64url.
    InvalidEncoding(String),
    /// Decoded bytes are not UTF-8.
    InvalidUtf8,
}

impl std::fmt::Display for DomainRefError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEncoding(message) => write!(f, "invalid domain reference: {}", message),
            Self::InvalidUtf8 => write!(f, "invalid domain reference: not UTF-8"),
        }
    }
}

impl std::error::Error for DomainRefError {}

/// Encode a domain name as its reference ID.
pub fn encode_domain_ref(domain: &str) -> String {
    URL_SAFE_NO_PAD.encode(domain.as_bytes())
}

/// Decode a reference ID back into the domain name.
pub fn decode_domain_ref(reference: &str) -> Result<String, DomainRefError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(reference)
        .map_err(|e| DomainRefError::InvalidEncoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| DomainRefError::InvalidUtf8)
}
