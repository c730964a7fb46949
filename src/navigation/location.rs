use serde::Serialize;
use std::fmt;

/// A navigation target split into path, query and hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Location {
    /// The location every session starts from.
    #[must_use]
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            query: None,
            hash: None,
        }
    }

    /// Parse `path?query#hash`. A missing path is `/` and a missing leading
    /// slash is added.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (rest, hash) = match raw.split_once('#') {
            Some((rest, hash)) => (rest, non_empty(hash)),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, non_empty(query)),
            None => (rest, None),
        };

        let path = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self { path, query, hash }
    }

    #[must_use]
    pub fn full_path(&self) -> String {
        let mut full = self.path.clone();
        if let Some(query) = &self.query {
            full.push('?');
            full.push_str(query);
        }
        if let Some(hash) = &self.hash {
            full.push('#');
            full.push_str(hash);
        }
        full
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

impl From<&str> for Location {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_path() {
        let location = Location::parse("/conversations/42");
        assert_eq!(location.path, "/conversations/42");
        assert_eq!(location.query, None);
        assert_eq!(location.hash, None);
    }

    #[test]
    fn parse_query_and_hash() {
        let location = Location::parse("/login?next=%2Fconversations%2F42#form");
        assert_eq!(location.path, "/login");
        assert_eq!(location.query.as_deref(), Some("next=%2Fconversations%2F42"));
        assert_eq!(location.hash.as_deref(), Some("form"));
        assert_eq!(
            location.to_string(),
            "/login?next=%2Fconversations%2F42#form"
        );
    }

    #[test]
    fn question_mark_inside_hash_is_not_a_query() {
        let location = Location::parse("/#section?x=1");
        assert_eq!(location.path, "/");
        assert_eq!(location.query, None);
        assert_eq!(location.hash.as_deref(), Some("section?x=1"));
    }

    #[test]
    fn empty_and_relative_paths_are_normalized() {
        assert_eq!(Location::parse("").path, "/");
        assert_eq!(Location::parse("?a=1").path, "/");
        assert_eq!(Location::parse("login").path, "/login");
        assert_eq!(Location::parse("/?").query, None);
    }
}
