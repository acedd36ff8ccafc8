//! Parsing of raw `document.cookie` strings captured from the login window.

use std::collections::HashMap;

use crate::config::Credential;

/// Cookie holding the HoYoLAB account id.
pub const LTUID_COOKIE: &str = "ltuid_v2";

/// Cookie holding the HoYoLAB session token.
pub const LTOKEN_COOKIE: &str = "ltoken_v2";

/// A parsed cookie header, keyed by cookie name.
///
/// Pairs are separated by `;` and split on the first `=`, so values may
/// themselves contain `=`. Whitespace around names and values is trimmed and
/// segments without a name are skipped. When a name repeats, the first
/// occurrence wins, matching how a browser orders the more specific cookie
/// first in `document.cookie`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    values: HashMap<String, String>,
}

impl CookieJar {
    pub fn parse(raw: &str) -> Self {
        let mut values = HashMap::new();

        for segment in raw.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let (name, value) = match segment.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (segment, ""),
            };
            if name.is_empty() {
                continue;
            }

            values
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }

        CookieJar { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the value for `name`, or an empty string when absent.
    pub fn value_or_empty(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builds the credential pair from the session cookies.
    ///
    /// Returns `None` unless both cookies are present with non-empty values.
    pub fn credential(&self) -> Option<Credential> {
        let credential = Credential::new(
            self.value_or_empty(LTUID_COOKIE),
            self.value_or_empty(LTOKEN_COOKIE),
        );
        credential.is_logged_in().then_some(credential)
    }
}

/// Extracts a single named cookie value; empty when the name is absent.
pub fn extract(raw: &str, name: &str) -> String {
    CookieJar::parse(raw).value_or_empty(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_cookies() {
        let jar = CookieJar::parse("foo=1; ltuid_v2=abc123; ltoken_v2=xyz789;");
        assert_eq!(jar.get("foo"), Some("1"));
        assert_eq!(jar.get(LTUID_COOKIE), Some("abc123"));
        assert_eq!(jar.get(LTOKEN_COOKIE), Some("xyz789"));
        assert_eq!(jar.len(), 3);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let jar = CookieJar::parse("   ltoken_v2 =  xyz789 ;ltuid_v2=abc123   ");
        assert_eq!(jar.get(LTOKEN_COOKIE), Some("xyz789"));
        assert_eq!(jar.get(LTUID_COOKIE), Some("abc123"));
    }

    #[test]
    fn test_value_keeps_embedded_equals() {
        let jar = CookieJar::parse("ltoken_v2=v2_abc==; other=x");
        assert_eq!(jar.get(LTOKEN_COOKIE), Some("v2_abc=="));
    }

    #[test]
    fn test_similar_names_do_not_match() {
        // "ltuid" is a prefix of "ltuid_v2" and must not be confused with it
        let jar = CookieJar::parse("ltuid=legacy; account_ltuid_v2=nope");
        assert_eq!(jar.get(LTUID_COOKIE), None);
        assert_eq!(jar.value_or_empty(LTUID_COOKIE), "");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let jar = CookieJar::parse("ltuid_v2=first; ltuid_v2=second");
        assert_eq!(jar.get(LTUID_COOKIE), Some("first"));
    }

    #[test]
    fn test_empty_and_malformed_segments() {
        assert!(CookieJar::parse("").is_empty());
        assert!(CookieJar::parse(" ; ;; ").is_empty());

        let jar = CookieJar::parse("=orphan; flag; a=");
        assert_eq!(jar.get(""), None);
        assert_eq!(jar.get("flag"), Some(""));
        assert_eq!(jar.get("a"), Some(""));
    }

    #[test]
    fn test_credential_requires_both_cookies() {
        let both = CookieJar::parse("ltoken_v2=xyz789; ltuid_v2=abc123");
        let credential = both.credential().unwrap();
        assert_eq!(credential.ltuid, "abc123");
        assert_eq!(credential.ltoken, "xyz789");

        assert!(CookieJar::parse("ltuid_v2=abc123").credential().is_none());
        assert!(CookieJar::parse("ltuid_v2=; ltoken_v2=xyz").credential().is_none());
    }

    #[test]
    fn test_extract() {
        let raw = "foo=1; ltuid_v2=abc123; ltoken_v2=xyz789;";
        assert_eq!(extract(raw, LTUID_COOKIE), "abc123");
        assert_eq!(extract(raw, LTOKEN_COOKIE), "xyz789");
        assert_eq!(extract(raw, "missing"), "");
    }
}
