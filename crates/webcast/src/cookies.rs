//! Parser for the sign server's `X-Set-TT-Cookie` header.
//!
//! The header carries ordinary cookie pairs (`name=value; Path=/; other=v2`).
//! Attribute keys such as `Path` or `Expires` belong to the preceding cookie
//! and are skipped. Every cookie is stored under [`COOKIE_DOMAIN`], whatever
//! the header says.
//!
//! A malformed header yields no cookies rather than a partial set.

use crate::{CookieName, CookieRecord, COOKIE_DOMAIN};

/// Cookie attribute names, compared case-insensitively.
const ATTRIBUTES: &[&str] = &[
    "expires",
    "path",
    "comment",
    "domain",
    "max-age",
    "secure",
    "httponly",
    "version",
    "samesite",
    "partitioned",
];

/// Attributes that may appear without a value.
const FLAG_ATTRIBUTES: &[&str] = &["secure", "httponly", "partitioned"];

/// Parses a cookie-pair header into one record per cookie name.
///
/// Later pairs with the same name replace earlier ones; records are returned
/// in the order names were first seen.
pub fn parse_cookie_header(header: &str) -> Vec<CookieRecord> {
    let mut cookies: Vec<CookieRecord> = Vec::new();

    for part in header.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (key, value) = match part.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (part, None),
        };

        if is_attribute(key) {
            if value.is_none() && !is_flag(key) {
                tracing::debug!(attribute = key, "cookie attribute without value");
                return Vec::new();
            }
            continue;
        }

        let (Some(value), Some(name)) = (value, valid_name(key)) else {
            tracing::debug!(pair = part, "malformed cookie pair, ignoring header");
            return Vec::new();
        };

        let record = CookieRecord {
            name,
            value: unquote(value).to_owned(),
            domain: COOKIE_DOMAIN.to_owned(),
        };
        match cookies.iter_mut().find(|c| c.name == record.name) {
            Some(existing) => *existing = record,
            None => cookies.push(record),
        }
    }

    cookies
}

fn is_attribute(key: &str) -> bool {
    ATTRIBUTES.iter().any(|a| a.eq_ignore_ascii_case(key))
}

fn is_flag(key: &str) -> bool {
    FLAG_ATTRIBUTES.iter().any(|a| a.eq_ignore_ascii_case(key))
}

/// Cookie names are RFC 6265 tokens: visible ASCII minus separators.
fn valid_name(key: &str) -> Option<CookieName> {
    let is_token = key.bytes().all(|b| {
        b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
    });
    if is_token {
        CookieName::new(key)
    } else {
        None
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(records: &[CookieRecord]) -> Vec<(&str, &str)> {
        records
            .iter()
            .map(|r| (r.name.as_str(), r.value.as_str()))
            .collect()
    }

    #[test]
    fn parses_plain_pairs() {
        let records = parse_cookie_header("ttwid=abc123; tt_csrf_token=xyz");
        assert_eq!(pairs(&records), vec![("ttwid", "abc123"), ("tt_csrf_token", "xyz")]);
        assert!(records.iter().all(|r| r.domain == COOKIE_DOMAIN));
    }

    #[test]
    fn skips_attributes() {
        let records = parse_cookie_header(
            "ttwid=abc; Path=/; Domain=.example.com; Expires=Wed, 09 Jun 2031 10:18:14 GMT; Secure; HttpOnly; msToken=q",
        );
        assert_eq!(pairs(&records), vec![("ttwid", "abc"), ("msToken", "q")]);
        assert_eq!(records[0].domain, COOKIE_DOMAIN);
    }

    #[test]
    fn last_write_wins() {
        let records = parse_cookie_header("a=1; b=2; a=3");
        assert_eq!(pairs(&records), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn unquotes_values_and_keeps_equals() {
        let records = parse_cookie_header(r#"a="quoted value"; b=x=y"#);
        assert_eq!(pairs(&records), vec![("a", "quoted value"), ("b", "x=y")]);
    }

    #[test]
    fn empty_header_yields_nothing() {
        assert!(parse_cookie_header("").is_empty());
        assert!(parse_cookie_header(" ; ; ").is_empty());
    }

    #[test]
    fn malformed_header_yields_nothing() {
        assert!(parse_cookie_header("a=1; garbage; b=2").is_empty());
        assert!(parse_cookie_header("=novalue").is_empty());
        assert!(parse_cookie_header("bad name=1").is_empty());
        assert!(parse_cookie_header("a=1; Path").is_empty());
    }

    #[test]
    fn empty_value_is_allowed() {
        let records = parse_cookie_header("a=");
        assert_eq!(pairs(&records), vec![("a", "")]);
    }
}
