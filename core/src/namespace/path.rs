//! Namespace identifiers and their on-disk file stems.
//!
//! A namespace is an opaque key chosen by the caller (a server id, a team
//! name, anything). It is never interpreted; it only has to map to a
//! filename that cannot collide with another namespace's files.

use std::fmt;

use serde::{Deserialize, Serialize};


/// Isolation boundary for one record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(id: impl Into<String>) -> Self {
        Namespace(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe stem for this namespace.
    ///
    /// ASCII letters, digits, `_` and `-` pass through; every other byte
    /// becomes `%XX`. The mapping is injective, and the result never
    /// contains `.`, so `<stem>.json` and `<stem>.backup.json` of distinct
    /// namespaces cannot collide. An empty key maps to `%`.
    pub fn file_stem(&self) -> String {
        if self.0.is_empty() {
            return "%".to_string();
        }
        let mut out = String::with_capacity(self.0.len());
        for b in self.0.bytes() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                out.push(b as char);
            } else {
                out.push_str(&format!("%{:02X}", b));
            }
        }
        out
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Namespace(s.to_string())
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Namespace(s)
    }
}

impl From<u64> for Namespace {
    fn from(id: u64) -> Self {
        Namespace(id.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ids_pass_through() {
        assert_eq!(Namespace::from("guild_42-a").file_stem(), "guild_42-a");
        assert_eq!(Namespace::from(1234567890u64).file_stem(), "1234567890");
    }

    #[test]
    fn special_bytes_are_escaped() {
        assert_eq!(Namespace::from("My Server").file_stem(), "My%20Server");
        assert_eq!(Namespace::from("../etc").file_stem(), "%2E%2E%2Fetc");
        assert_eq!(Namespace::from("a.backup").file_stem(), "a%2Ebackup");
    }

    #[test]
    fn escaping_is_injective_for_percent() {
        let a = Namespace::from("%20").file_stem();
        let b = Namespace::from(" ").file_stem();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_namespace_has_a_stem() {
        assert_eq!(Namespace::from("").file_stem(), "%");
    }

    #[test]
    fn serde_is_transparent() {
        let ns: Namespace = serde_json::from_str("\"g1\"").unwrap();
        assert_eq!(ns.as_str(), "g1");
        assert_eq!(serde_json::to_string(&ns).unwrap(), "\"g1\"");
    }
}
