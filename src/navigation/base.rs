use super::Location;

/// Root URL prefix the application is served under (`BASE_URL` at build time).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasePath {
    // Normalized to `/prefix` without trailing slash; empty for `/`.
    prefix: String,
}

impl BasePath {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self {
                prefix: format!("/{trimmed}"),
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        if self.prefix.is_empty() {
            "/"
        } else {
            &self.prefix
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Turn a browser path into a route path, `None` if it lies outside the base.
    #[must_use]
    pub fn strip(&self, url_path: &str) -> Option<String> {
        if self.prefix.is_empty() {
            return Some(url_path.to_string());
        }

        let rest = url_path.strip_prefix(&self.prefix)?;
        if rest.is_empty() {
            Some("/".to_string())
        } else if rest.starts_with('/') {
            Some(rest.to_string())
        } else {
            None
        }
    }

    /// Browser URL for a route location.
    #[must_use]
    pub fn href(&self, location: &Location) -> String {
        format!("{}{}", self.prefix, location.full_path())
    }
}
