//! Bearer token extraction from login responses.
//!
//! The login endpoint is inconsistent about where it puts the token, so
//! the lookup walks a fixed priority chain: body fields first, then
//! response headers. When neither yields a token the caller falls back to
//! a locally generated placeholder.

use chrono::Utc;
use rand::Rng;
use reqwest::header::HeaderMap;
use serde_json::Value;

/// Body fields checked for a token, in priority order.
const BODY_TOKEN_FIELDS: [&str; 3] = ["bearer", "token", "access_token"];

/// Response headers checked for a token, in priority order.
const HEADER_TOKEN_NAMES: [&str; 3] = ["authorization", "x-auth-token", "access-token"];

const BEARER_SCHEME: &str = "Bearer";

/// Prefix of synthesized tokens. The service never issues these.
pub const PLACEHOLDER_PREFIX: &str = "local-";

/// Find the bearer token in a login response.
pub fn extract_token(body: &Value, headers: &HeaderMap) -> Option<String> {
    token_from_body(body).or_else(|| token_from_headers(headers))
}

fn token_from_body(body: &Value) -> Option<String> {
    BODY_TOKEN_FIELDS.iter().find_map(|field| {
        body.get(field)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    HEADER_TOKEN_NAMES.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(strip_bearer)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// Drop a leading `Bearer` scheme. A scheme with nothing after it leaves
/// an empty string, which callers treat as no token.
fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.get(..BEARER_SCHEME.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            let rest = &value[BEARER_SCHEME.len()..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim()
            } else {
                value
            }
        }
        _ => value,
    }
}

/// Generate a locally unique token for degraded/demo sessions.
pub fn placeholder_token() -> String {
    let nonce: u64 = rand::thread_rng().gen();
    format!(
        "{}{}-{:016x}",
        PLACEHOLDER_PREFIX,
        Utc::now().timestamp_millis(),
        nonce
    )
}

pub fn is_placeholder(token: &str) -> bool {
    token.starts_with(PLACEHOLDER_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_body_fields_in_priority_order() {
        let body = json!({"access_token": "c", "token": "b", "bearer": "a"});
        assert_eq!(extract_token(&body, &HeaderMap::new()).as_deref(), Some("a"));

        let body = json!({"access_token": "c", "token": "b"});
        assert_eq!(extract_token(&body, &HeaderMap::new()).as_deref(), Some("b"));

        let body = json!({"access_token": "c"});
        assert_eq!(extract_token(&body, &HeaderMap::new()).as_deref(), Some("c"));
    }

    #[test]
    fn test_body_beats_headers() {
        let body = json!({"token": "from-body"});
        let h = headers(&[("authorization", "Bearer from-header")]);
        assert_eq!(extract_token(&body, &h).as_deref(), Some("from-body"));
    }

    #[test]
    fn test_non_string_and_empty_fields_are_skipped() {
        let body = json!({"bearer": "", "token": 42, "access_token": "real"});
        assert_eq!(extract_token(&body, &HeaderMap::new()).as_deref(), Some("real"));
    }

    #[test]
    fn test_header_fallback() {
        let h = headers(&[("authorization", "Bearer abc123")]);
        assert_eq!(extract_token(&json!({}), &h).as_deref(), Some("abc123"));

        let h = headers(&[("x-auth-token", "raw-token")]);
        assert_eq!(extract_token(&Value::Null, &h).as_deref(), Some("raw-token"));

        let h = headers(&[("access-token", "Bearer  spaced "), ("x-auth-token", "second")]);
        assert_eq!(extract_token(&json!([]), &h).as_deref(), Some("second"));

        let h = headers(&[("access-token", "Bearer third")]);
        assert_eq!(extract_token(&json!({"user": {}}), &h).as_deref(), Some("third"));
    }

    #[test]
    fn test_nothing_found() {
        let h = headers(&[("authorization", "Bearer ")]);
        assert_eq!(extract_token(&json!({"user": {"id": 1}}), &h), None);

        let h = headers(&[("authorization", "Bearer")]);
        assert_eq!(extract_token(&json!({}), &h), None);
    }

    #[test]
    fn test_empty_scheme_falls_through_to_next_header() {
        let h = headers(&[("authorization", "Bearer "), ("x-auth-token", "next")]);
        assert_eq!(extract_token(&json!({}), &h).as_deref(), Some("next"));
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc"), "abc");
        assert_eq!(strip_bearer("bearer abc"), "abc");
        assert_eq!(strip_bearer("  Bearer\tabc "), "abc");
        assert_eq!(strip_bearer("Bearer "), "");
        assert_eq!(strip_bearer("Bearertoken"), "Bearertoken");
        assert_eq!(strip_bearer("abc"), "abc");
    }

    #[test]
    fn test_placeholder_tokens_are_unique() {
        let a = placeholder_token();
        let b = placeholder_token();
        assert!(is_placeholder(&a));
        assert!(is_placeholder(&b));
        assert_ne!(a, b);
        assert!(!is_placeholder("eyJhbGciOi"));
    }
}
