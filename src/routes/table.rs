use super::{PathPattern, RouteError};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Login,
    Home,
    Chat,
}

impl View {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Home => "home",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A route declaration. Children are relative to the parent path unless they
/// start with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub view: View,
    pub children: Vec<Route>,
}

impl Route {
    pub fn new(path: impl Into<String>, view: View) -> Self {
        Self {
            path: path.into(),
            view,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }
}

/// Result of resolving a path: the views to compose, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub path: String,
    pub pattern: String,
    pub views: Vec<View>,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    /// The innermost view, the one the match was made for.
    #[must_use]
    pub fn view(&self) -> Option<View> {
        self.views.last().copied()
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

// Flattened route with its full pattern and the chain of views leading to it.
#[derive(Debug, Clone)]
struct Record {
    pattern: PathPattern,
    views: Vec<View>,
    depth: usize,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    records: Vec<Record>,
}

impl RouteTable {
    /// Build a table from route declarations.
    ///
    /// # Errors
    /// Returns an error if a pattern is malformed or two routes on the same
    /// nesting level share a path.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteError> {
        let mut records = Vec::new();
        let root = PathPattern::parse("/")?;
        flatten(&routes, &root, &[], 0, &mut records)?;

        // Deeper routes win over their layout shells; `sort_by` is stable so
        // declaration order is kept between siblings.
        records.sort_by(|a, b| b.depth.cmp(&a.depth));

        Ok(Self { routes, records })
    }

    /// The WASAText web UI routes.
    ///
    /// # Errors
    /// Returns an error only if the built-in declarations are malformed.
    pub fn wasatext() -> Result<Self, RouteError> {
        Self::new(vec![
            Route::new("/login", View::Login),
            Route::new("/", View::Home)
                .with_children(vec![Route::new("conversations/:id", View::Chat)]),
        ])
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve a route path (no query or hash) to the views it renders.
    #[must_use]
    #[instrument(skip(self))]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let found = self.records.iter().find_map(|record| {
            record.pattern.matches(path).map(|params| RouteMatch {
                path: path.to_string(),
                pattern: record.pattern.to_string(),
                views: record.views.clone(),
                params,
            })
        });

        if found.is_none() {
            debug!("no route matches {path}");
        }

        found
    }
}

fn flatten(
    routes: &[Route],
    parent: &PathPattern,
    views: &[View],
    depth: usize,
    records: &mut Vec<Record>,
) -> Result<(), RouteError> {
    let mut siblings: Vec<String> = Vec::new();

    for route in routes {
        let pattern = parent.join(&PathPattern::parse(&route.path)?)?;

        let key = pattern.to_string().to_ascii_lowercase();
        if siblings.contains(&key) {
            return Err(RouteError::DuplicatePath {
                path: pattern.to_string(),
            });
        }
        siblings.push(key);

        let mut chain = views.to_vec();
        chain.push(route.view);

        flatten(&route.children, &pattern, &chain, depth + 1, records)?;

        records.push(Record {
            pattern,
            views: chain,
            depth,
        });
    }

    Ok(())
}
