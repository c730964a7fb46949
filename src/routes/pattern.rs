use super::RouteError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{borrow::Cow, collections::BTreeMap, fmt};

static PARAM_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
}

/// A parsed route path such as `/conversations/:id`.
///
/// Parameters are written `:name`; `{name}` is accepted as the same thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    absolute: bool,
    segments: Vec<Segment>,
}

fn valid_param_name(name: &str) -> bool {
    PARAM_NAME.as_ref().is_some_and(|re| re.is_match(name))
}

impl PathPattern {
    /// Parse a pattern.
    ///
    /// # Errors
    /// Returns an error if a parameter segment has an empty or invalid name, or
    /// the same parameter appears twice.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let mut segments = Vec::new();

        for part in raw.split('/').filter(|s| !s.is_empty()) {
            let name = part
                .strip_prefix(':')
                .or_else(|| part.strip_prefix('{').and_then(|p| p.strip_suffix('}')));

            let Some(name) = name else {
                segments.push(Segment::Static(part.to_string()));
                continue;
            };

            if name.is_empty() {
                return Err(RouteError::EmptyParam {
                    pattern: raw.to_string(),
                });
            }
            if !valid_param_name(name) {
                return Err(RouteError::InvalidParam {
                    pattern: raw.to_string(),
                    name: name.to_string(),
                });
            }
            segments.push(Segment::Param(name.to_string()));
        }

        let pattern = Self {
            absolute: raw.starts_with('/'),
            segments,
        };
        pattern.check_params()?;
        Ok(pattern)
    }

    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.absolute
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Nest `child` under `self`. An absolute child replaces the parent path.
    ///
    /// # Errors
    /// Returns an error if the joined pattern repeats a parameter name.
    pub fn join(&self, child: &Self) -> Result<Self, RouteError> {
        if child.absolute {
            return Ok(child.clone());
        }

        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        let joined = Self {
            absolute: true,
            segments,
        };
        joined.check_params()?;
        Ok(joined)
    }

    /// Match a route path, returning the decoded parameters on success.
    ///
    /// Static segments compare case-insensitively and a single trailing
    /// slash is ignored. A parameter consumes exactly one non-empty segment;
    /// any other empty segment (`//`) fails the match.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let trimmed = path
            .strip_suffix('/')
            .filter(|rest| !rest.is_empty())
            .unwrap_or(path);
        let rest = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) => {
                    if !expected.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    let value = urlencoding::decode(part).unwrap_or(Cow::Borrowed(part));
                    params.insert(name.clone(), value.into_owned());
                }
            }
        }

        Some(params)
    }

    fn check_params(&self) -> Result<(), RouteError> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if let Segment::Param(name) = segment {
                if seen.contains(&name) {
                    return Err(RouteError::DuplicateParam {
                        pattern: self.to_string(),
                        name: name.clone(),
                    });
                }
                seen.push(name);
            }
        }
        Ok(())
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str(if self.absolute { "/" } else { "" });
        }

        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 || self.absolute {
                f.write_str("/")?;
            }
            match segment {
                Segment::Static(value) => f.write_str(value)?,
                Segment::Param(name) => write!(f, ":{name}")?,
            }
        }
        Ok(())
    }
}
