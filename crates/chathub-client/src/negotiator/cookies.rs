//! Shared cookie store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Cookies sent with negotiation and socket requests.
///
/// Clones share the same store, so cookies refreshed by a challenge
/// resolver are seen by the next negotiation.
#[derive(Clone, Default)]
pub struct CookieJar {
    inner: Arc<RwLock<BTreeMap<String, String>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a jar from a `name=value; name2=value2` header string.
    pub fn from_header(header: &str) -> Self {
        let jar = Self::new();
        jar.replace_from_header(header);
        jar
    }

    /// Replace every cookie with the ones in `header`.
    pub fn replace_from_header(&self, header: &str) {
        let parsed = parse_cookie_string(header);
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = parsed;
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render as a `Cookie` header value.
    pub fn header_value(&self) -> String {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("count", &self.len())
            .finish()
    }
}

fn parse_cookie_string(header: &str) -> BTreeMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_sorted() {
        let jar = CookieJar::from_header("_U=abc; MUID=xyz ;  ;broken; SRCHHPGUSR=a=b");
        assert_eq!(jar.len(), 3);
        assert_eq!(jar.get("_U").as_deref(), Some("abc"));
        assert_eq!(jar.get("SRCHHPGUSR").as_deref(), Some("a=b"));
        assert_eq!(jar.header_value(), "MUID=xyz; SRCHHPGUSR=a=b; _U=abc");
    }

    #[test]
    fn clones_share_the_store() {
        let jar = CookieJar::from_header("a=1");
        let other = jar.clone();
        other.replace_from_header("b=2");
        assert_eq!(jar.get("a"), None);
        assert_eq!(jar.header_value(), "b=2");
    }

    #[test]
    fn debug_hides_values() {
        let jar = CookieJar::from_header("_U=secret");
        let out = format!("{jar:?}");
        assert!(!out.contains("secret"));
        assert!(out.contains("count: 1"));
    }

    #[test]
    fn empty_header_gives_empty_jar() {
        assert!(CookieJar::from_header("").is_empty());
    }
}
