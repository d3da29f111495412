//! Request cookies plus the `Set-Cookie` values queued for the response.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
};
use std::collections::BTreeMap;
use thiserror::Error;

use super::policy::CookieAttributes;

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("cookie {0} has a value outside the cookie-octet set")]
    InvalidValue(String),
    #[error(transparent)]
    Header(#[from] InvalidHeaderValue),
}

/// RFC 6265 `cookie-octet`: visible ASCII except `"`, `,`, `;` and `\`.
#[must_use]
pub fn is_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

/// A single queued cookie write.
#[derive(Clone, Debug)]
pub struct CookieWrite {
    pub name: String,
    pub value: String,
    pub attributes: CookieAttributes,
}

impl CookieWrite {
    /// Render the `Set-Cookie` header value.
    ///
    /// # Errors
    /// Returns an error if the value contains bytes not allowed in a header.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let attributes = &self.attributes;
        let mut cookie = format!(
            "{}={}; Path={}; SameSite={}; Max-Age={}",
            self.name, self.value, attributes.path, attributes.same_site, attributes.max_age
        );
        if attributes.http_only {
            cookie.push_str("; HttpOnly");
        }
        if attributes.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Cookie view for one request/response exchange.
///
/// Reads see the incoming cookies overlaid with any writes made on this jar,
/// so a value set earlier in the same exchange is visible to later reads.
#[derive(Clone, Debug, Default)]
pub struct CookieJar {
    values: BTreeMap<String, String>,
    writes: Vec<CookieWrite>,
}

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every `Cookie` header on the request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = BTreeMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            for (name, value) in parse_cookie_header(raw) {
                values.insert(name, value);
            }
        }
        Self {
            values,
            writes: Vec::new(),
        }
    }

    /// Current value of a cookie; empty values read as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Queue a batch of writes. Every value is checked and rendered first, so
    /// an invalid entry leaves the jar untouched.
    ///
    /// # Errors
    /// `InvalidValue` for a value outside the cookie-octet set, otherwise the
    /// first header rendering error.
    pub fn write_all(&mut self, writes: Vec<CookieWrite>) -> Result<(), CookieError> {
        for write in &writes {
            if !is_cookie_value(&write.value) {
                return Err(CookieError::InvalidValue(write.name.clone()));
            }
            write.to_header_value()?;
        }
        for write in writes {
            if write.attributes.max_age <= 0 {
                self.values.remove(&write.name);
            } else {
                self.values.insert(write.name.clone(), write.value.clone());
            }
            self.writes.push(write);
        }
        Ok(())
    }

    /// Writes queued so far, in order.
    #[must_use]
    pub fn writes(&self) -> &[CookieWrite] {
        &self.writes
    }

    /// `Cookie` header carrying the jar's current values, for forwarding a
    /// request downstream after the jar was modified.
    #[must_use]
    pub fn cookie_header(&self) -> Option<HeaderValue> {
        if self.values.is_empty() {
            return None;
        }
        let joined = self
            .values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }

    /// Append the queued `Set-Cookie` headers to a response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for write in &self.writes {
            // Values were validated when queued.
            if let Ok(value) = write.to_header_value() {
                headers.append(SET_COOKIE, value);
            }
        }
    }

    /// Put the queued `Set-Cookie` headers ahead of the ones already on the
    /// response, so the response's own writes win for the same cookie.
    pub fn apply_before(&self, headers: &mut HeaderMap) {
        let existing: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
        headers.remove(SET_COOKIE);
        self.apply(headers);
        for value in existing {
            headers.append(SET_COOKIE, value);
        }
    }
}

fn parse_cookie_header(raw: &str) -> impl Iterator<Item = (String, String)> + '_ {
    raw.split(';').filter_map(|pair| {
        let mut parts = pair.trim().splitn(2, '=');
        let name = parts.next()?.trim();
        let value = parts.next()?.trim().trim_matches('"');
        if name.is_empty() {
            None
        } else {
            Some((name.to_string(), value.to_string()))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::policy::SessionPolicy;

    fn headers_with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn from_headers_parses_pairs() {
        let jar = CookieJar::from_headers(&headers_with_cookie(
            "accessToken=abc; refreshToken=\"def\"; theme=dark",
        ));
        assert_eq!(jar.get("accessToken"), Some("abc"));
        assert_eq!(jar.get("refreshToken"), Some("def"));
        assert_eq!(jar.get("theme"), Some("dark"));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn empty_values_read_as_absent() {
        let jar = CookieJar::from_headers(&headers_with_cookie("accessToken=; userId=7"));
        assert_eq!(jar.get("accessToken"), None);
        assert_eq!(jar.get("userId"), Some("7"));
    }

    #[test]
    fn malformed_pairs_are_skipped() {
        let jar = CookieJar::from_headers(&headers_with_cookie("garbage; =x; ok=1"));
        assert_eq!(jar.get("ok"), Some("1"));
        assert_eq!(jar.get("garbage"), None);
    }

    #[test]
    fn header_value_renders_attributes() -> Result<(), InvalidHeaderValue> {
        let write = CookieWrite {
            name: "accessToken".to_string(),
            value: "abc".to_string(),
            attributes: SessionPolicy::default().attributes(300, None),
        };
        let value = write.to_header_value()?;
        assert_eq!(
            value.to_str().ok(),
            Some("accessToken=abc; Path=/; SameSite=Lax; Max-Age=300; HttpOnly")
        );
        Ok(())
    }

    #[test]
    fn invalid_write_leaves_jar_untouched() {
        let policy = SessionPolicy::default();
        let mut jar = CookieJar::new();
        let result = jar.write_all(vec![
            CookieWrite {
                name: "a".to_string(),
                value: "ok".to_string(),
                attributes: policy.attributes(60, None),
            },
            CookieWrite {
                name: "b".to_string(),
                value: "bad\nvalue".to_string(),
                attributes: policy.attributes(60, None),
            },
        ]);
        assert!(result.is_err());
        assert!(jar.writes().is_empty());
        assert_eq!(jar.get("a"), None);
    }

    #[test]
    fn expired_write_removes_value_and_is_applied() -> Result<(), CookieError> {
        let policy = SessionPolicy::default();
        let mut jar = CookieJar::from_headers(&headers_with_cookie("a=1; b=2"));
        jar.write_all(vec![CookieWrite {
            name: "a".to_string(),
            value: String::new(),
            attributes: policy.expired_attributes(),
        }])?;
        assert_eq!(jar.get("a"), None);
        assert_eq!(
            jar.cookie_header()
                .and_then(|value| value.to_str().ok().map(str::to_string)),
            Some("b=2".to_string())
        );

        let mut headers = HeaderMap::new();
        jar.apply(&mut headers);
        assert_eq!(headers.get_all(SET_COOKIE).iter().count(), 1);
        Ok(())
    }

    #[test]
    fn cookie_value_rejects_separators() {
        assert!(is_cookie_value("eyJhbGciOi.J9-_~"));
        assert!(is_cookie_value(""));
        for bad in ["x; Domain=evil", "a b", "a,b", "\"a\"", "a\\b", "caf\u{e9}"] {
            assert!(!is_cookie_value(bad), "{bad} accepted");
        }
    }

    #[test]
    fn attribute_injection_is_rejected() {
        let mut jar = CookieJar::new();
        let result = jar.write_all(vec![CookieWrite {
            name: "accessToken".to_string(),
            value: "x; Domain=evil.example; Max-Age=99999999".to_string(),
            attributes: SessionPolicy::default().attributes(60, None),
        }]);
        assert!(matches!(result, Err(CookieError::InvalidValue(ref name)) if name == "accessToken"));
        assert!(jar.writes().is_empty());
    }

    #[test]
    fn apply_before_keeps_response_writes_last() -> Result<(), CookieError> {
        let policy = SessionPolicy::default();
        let mut jar = CookieJar::new();
        jar.write_all(vec![CookieWrite {
            name: "accessToken".to_string(),
            value: "fresh".to_string(),
            attributes: policy.attributes(60, None),
        }])?;

        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("accessToken=; Max-Age=0"));
        jar.apply_before(&mut headers);

        let values: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[0].starts_with("accessToken=fresh;"));
        assert_eq!(values[1], "accessToken=; Max-Age=0");
        Ok(())
    }
}
