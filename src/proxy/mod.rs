//! Development forwarding rules.
//!
//! Requests whose path-and-query starts with one of the API prefixes go to the
//! backend untouched. The prefixes are listed one by one so the development
//! server never forwards its own assets.

use thiserror::Error;
use tracing::instrument;
use url::Url;

pub const DEFAULT_BACKEND: &str = "http://localhost:3000";
pub const API_PREFIXES: [&str; 3] = ["/session", "/users", "/conversations"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProxyError {
    #[error("invalid backend URL {url:?}: {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported backend scheme {0}, expected http or https")]
    Scheme(String),
    #[error("proxy prefix must start with '/': {0:?}")]
    Prefix(String),
    #[error("{requested:?} cannot be forwarded unchanged, it would reach the backend as {forwarded:?}")]
    Rewritten { requested: String, forwarded: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRule {
    prefix: String,
    target: Url,
}

impl ProxyRule {
    /// # Errors
    /// Returns an error if the prefix is not absolute or the target is not an
    /// http(s) URL.
    pub fn new(prefix: &str, target: &str) -> Result<Self, ProxyError> {
        if !prefix.starts_with('/') {
            return Err(ProxyError::Prefix(prefix.to_string()));
        }

        let target = Url::parse(target).map_err(|source| ProxyError::Url {
            url: target.to_string(),
            source,
        })?;
        match target.scheme() {
            "http" | "https" => {}
            scheme => return Err(ProxyError::Scheme(scheme.to_string())),
        }

        Ok(Self {
            prefix: prefix.to_string(),
            target,
        })
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub const fn target(&self) -> &Url {
        &self.target
    }

    /// Plain prefix test, so `/users` also covers `/users/me/name` and
    /// `/users?q=a`.
    #[must_use]
    pub fn matches(&self, path_and_query: &str) -> bool {
        path_and_query.starts_with(&self.prefix)
    }

    /// Backend URL for a request: the target origin (plus any target path)
    /// followed by the original path and query.
    ///
    /// # Errors
    /// Returns an error if the joined URL does not parse, or if parsing would
    /// change the path or query (dot segments, re-encoded characters).
    pub fn forward_url(&self, path_and_query: &str) -> Result<Url, ProxyError> {
        let expected = format!("{}{path_and_query}", self.target.path().trim_end_matches('/'));
        let joined = format!("{}{expected}", self.target.origin().ascii_serialization());
        let url = Url::parse(&joined).map_err(|source| ProxyError::Url {
            url: joined,
            source,
        })?;

        let forwarded = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        if forwarded != expected {
            return Err(ProxyError::Rewritten {
                requested: path_and_query.to_string(),
                forwarded,
            });
        }

        Ok(url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyTable {
    rules: Vec<ProxyRule>,
}

impl ProxyTable {
    #[must_use]
    pub const fn new(rules: Vec<ProxyRule>) -> Self {
        Self { rules }
    }

    /// The WASAText API prefixes, all forwarded to `backend`.
    ///
    /// # Errors
    /// Returns an error if `backend` is not an http(s) URL.
    pub fn wasatext(backend: &str) -> Result<Self, ProxyError> {
        let rules = API_PREFIXES
            .iter()
            .map(|prefix| ProxyRule::new(prefix, backend))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    #[must_use]
    pub fn rules(&self) -> &[ProxyRule] {
        &self.rules
    }

    /// First rule whose prefix matches.
    #[must_use]
    #[instrument(skip(self), level = "trace")]
    pub fn find(&self, path_and_query: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| rule.matches(path_and_query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn wasatext_table_has_the_api_prefixes() -> Result<()> {
        let table = ProxyTable::wasatext(DEFAULT_BACKEND)?;
        let prefixes: Vec<&str> = table.rules().iter().map(ProxyRule::prefix).collect();
        assert_eq!(prefixes, vec!["/session", "/users", "/conversations"]);
        for rule in table.rules() {
            assert_eq!(rule.target().as_str(), "http://localhost:3000/");
        }
        Ok(())
    }

    #[test]
    fn api_paths_are_forwarded() -> Result<()> {
        let table = ProxyTable::wasatext(DEFAULT_BACKEND)?;
        for path in [
            "/session",
            "/users",
            "/users/me/conversations",
            "/users?name=maria",
            "/conversations/42/messages",
            "/conversations/42/messages/7/reactions/1",
        ] {
            assert!(table.find(path).is_some(), "{path} should be forwarded");
        }
        Ok(())
    }

    #[test]
    fn app_paths_are_not_forwarded() -> Result<()> {
        let table = ProxyTable::wasatext(DEFAULT_BACKEND)?;
        for path in ["/", "/login", "/index.html", "/assets/app.js", "/health"] {
            assert!(table.find(path).is_none(), "{path} should not be forwarded");
        }
        Ok(())
    }

    #[test]
    fn forward_url_is_verbatim() -> Result<()> {
        let table = ProxyTable::wasatext(DEFAULT_BACKEND)?;
        let rule = table
            .find("/conversations/42?limit=50")
            .context("rule expected")?;
        assert_eq!(
            rule.forward_url("/conversations/42?limit=50")?.as_str(),
            "http://localhost:3000/conversations/42?limit=50"
        );
        Ok(())
    }

    #[test]
    fn forward_url_keeps_target_path() -> Result<()> {
        let rule = ProxyRule::new("/users", "https://api.example.com:8443/v1/")?;
        assert_eq!(
            rule.forward_url("/users/me/name")?.as_str(),
            "https://api.example.com:8443/v1/users/me/name"
        );
        Ok(())
    }

    #[test]
    fn forward_url_keeps_percent_encoding() -> Result<()> {
        let rule = ProxyRule::new("/users", DEFAULT_BACKEND)?;
        assert_eq!(
            rule.forward_url("/users/Maria%20Rossi?q=a%2Fb&x=")?.as_str(),
            "http://localhost:3000/users/Maria%20Rossi?q=a%2Fb&x="
        );
        Ok(())
    }

    #[test]
    fn forward_url_refuses_rewritten_targets() -> Result<()> {
        let rule = ProxyRule::new("/conversations", DEFAULT_BACKEND)?;
        for path in [
            "/conversations/../admin",
            "/conversations/%2e%2e/session",
            "/conversations/./42",
            "/conversations/%2E/42",
        ] {
            assert!(
                matches!(rule.forward_url(path), Err(ProxyError::Rewritten { .. })),
                "{path} should be refused"
            );
        }

        let rule = ProxyRule::new("/users", DEFAULT_BACKEND)?;
        assert_eq!(
            rule.forward_url("/users?name=O'Brien").err(),
            Some(ProxyError::Rewritten {
                requested: "/users?name=O'Brien".to_string(),
                forwarded: "/users?name=O%27Brien".to_string(),
            })
        );
        Ok(())
    }

    #[test]
    fn invalid_rules_are_rejected() {
        assert_eq!(
            ProxyRule::new("users", DEFAULT_BACKEND).err(),
            Some(ProxyError::Prefix("users".to_string()))
        );
        assert_eq!(
            ProxyRule::new("/users", "ftp://localhost").err(),
            Some(ProxyError::Scheme("ftp".to_string()))
        );
        assert!(matches!(
            ProxyTable::wasatext("not a url"),
            Err(ProxyError::Url { .. })
        ));
    }
}
