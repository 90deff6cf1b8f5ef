//! Candidate key extraction from requests

use http::{HeaderMap, Uri};
use std::fmt;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Header carrying the caller's key
pub const FUNCTIONS_KEY_HEADER: &str = "x-functions-key";

/// Query parameter carrying the caller's key when the header is absent
pub const CODE_QUERY_PARAM: &str = "code";

/// Where a candidate key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySource {
    Header,
    Query,
    /// Passed directly, not read from a request
    Explicit,
    /// No key was presented
    Absent,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Header => "header",
            KeySource::Query => "query",
            KeySource::Explicit => "explicit",
            KeySource::Absent => "none",
        }
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key presented by a caller
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CandidateKey {
    value: String,
    #[zeroize(skip)]
    source: KeySource,
}

impl CandidateKey {
    pub fn new(value: impl Into<String>, source: KeySource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Debug for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateKey")
            .field("value", &format_args!("[REDACTED {} bytes]", self.value.len()))
            .field("source", &self.source)
            .finish()
    }
}

/// Find the caller's key in request headers or query string
///
/// A present header always wins, even when its value is empty or not valid
/// UTF-8; the query string is then not consulted. Only the first value of
/// either source is used. Query values are URL-decoded.
pub fn extract_candidate(headers: &HeaderMap, uri: &Uri) -> Option<CandidateKey> {
    if let Some(value) = headers.get(FUNCTIONS_KEY_HEADER) {
        let value = value.to_str().unwrap_or_else(|_| {
            debug!("Ignoring {} header value that is not valid UTF-8", FUNCTIONS_KEY_HEADER);
            ""
        });
        return Some(CandidateKey::new(value, KeySource::Header));
    }

    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name.eq_ignore_ascii_case(CODE_QUERY_PARAM))
        .map(|(_, value)| CandidateKey::new(value.into_owned(), KeySource::Query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(FUNCTIONS_KEY_HEADER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_header_takes_precedence() {
        let uri: Uri = "/api/echo?code=from-query".parse().unwrap();
        let candidate = extract_candidate(&headers("from-header"), &uri).unwrap();

        assert_eq!(candidate.value(), "from-header");
        assert_eq!(candidate.source(), KeySource::Header);
    }

    #[test]
    fn test_empty_header_blocks_query_fallback() {
        let uri: Uri = "/api/echo?code=from-query".parse().unwrap();
        let candidate = extract_candidate(&headers(""), &uri).unwrap();

        assert!(candidate.is_empty());
        assert_eq!(candidate.source(), KeySource::Header);
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-Functions-Key").unwrap(),
            HeaderValue::from_static("abc"),
        );
        let uri: Uri = "/".parse().unwrap();

        assert_eq!(extract_candidate(&headers, &uri).unwrap().value(), "abc");
    }

    #[test]
    fn test_first_header_value_is_used() {
        let mut headers = HeaderMap::new();
        headers.append(FUNCTIONS_KEY_HEADER, HeaderValue::from_static("first"));
        headers.append(FUNCTIONS_KEY_HEADER, HeaderValue::from_static("second"));
        let uri: Uri = "/".parse().unwrap();

        assert_eq!(extract_candidate(&headers, &uri).unwrap().value(), "first");
    }

    #[test]
    fn test_query_value_is_decoded() {
        let uri: Uri = "/api/echo?name=x&code=a%2Bb%3D%3D&code=second".parse().unwrap();
        let candidate = extract_candidate(&HeaderMap::new(), &uri).unwrap();

        assert_eq!(candidate.value(), "a+b==");
        assert_eq!(candidate.source(), KeySource::Query);
    }

    #[test]
    fn test_no_key_present() {
        let uri: Uri = "/api/echo?name=x".parse().unwrap();
        assert!(extract_candidate(&HeaderMap::new(), &uri).is_none());

        let uri: Uri = "/api/echo".parse().unwrap();
        assert!(extract_candidate(&HeaderMap::new(), &uri).is_none());
    }

    #[test]
    fn test_debug_redacts_value() {
        let candidate = CandidateKey::new("very-secret", KeySource::Query);
        let debug_str = format!("{:?}", candidate);

        assert!(debug_str.contains("REDACTED 11 bytes"));
        assert!(!debug_str.contains("very-secret"));
    }
}
