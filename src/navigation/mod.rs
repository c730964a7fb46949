//! Client-side navigation: locations, the application base path, and the
//! navigator that runs the guard before resolving the route.

mod base;
mod location;

pub use self::base::BasePath;
pub use self::location::Location;

use crate::{
    guard::{Decision, NavigationGuard, NavigationRequest},
    routes::{RouteMatch, RouteTable},
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Redirects followed for a single `push` before giving up.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation to {target} exceeded {limit} redirects")]
    RedirectLoop { target: String, limit: usize },
}

/// Outcome of a completed navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub from: Location,
    pub to: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<Location>,
    pub route: Option<RouteMatch>,
}

impl Navigation {
    #[must_use]
    pub const fn is_redirect(&self) -> bool {
        self.redirected_from.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    routes: Arc<RouteTable>,
    guard: NavigationGuard,
    current: Location,
}

impl Navigator {
    #[must_use]
    pub fn new(routes: Arc<RouteTable>, guard: NavigationGuard) -> Self {
        Self {
            routes,
            guard,
            current: Location::root(),
        }
    }

    /// Start from `location` instead of `/`.
    #[must_use]
    pub fn starting_at(mut self, location: Location) -> Self {
        self.current = location;
        self
    }

    #[must_use]
    pub const fn current(&self) -> &Location {
        &self.current
    }

    /// Navigate to `target`.
    ///
    /// A redirect from the guard starts a new navigation to the redirect
    /// target, which is guarded again.
    ///
    /// # Errors
    /// Returns an error if redirects keep coming back for more than
    /// [`MAX_REDIRECTS`] hops.
    #[instrument(skip(self), fields(from = %self.current))]
    pub fn push(&mut self, target: &str) -> Result<Navigation, NavigationError> {
        let from = self.current.clone();
        let requested = Location::parse(target);
        let mut to = requested.clone();

        for hop in 0..=MAX_REDIRECTS {
            let request = NavigationRequest {
                to,
                from: from.clone(),
            };

            match self.guard.check(&request) {
                Decision::Proceed { to } => {
                    let route = self.routes.resolve(&to.path);
                    info!(
                        "navigated to {to} (view: {})",
                        route
                            .as_ref()
                            .and_then(RouteMatch::view)
                            .map_or("none", |view| view.name())
                    );

                    self.current = to.clone();
                    return Ok(Navigation {
                        from,
                        to,
                        redirected_from: (hop > 0).then_some(requested),
                        route,
                    });
                }
                Decision::Redirect { to: next } => {
                    debug!("redirect #{} from {} to {next}", hop + 1, request.to);
                    to = next;
                }
            }
        }

        Err(NavigationError::RedirectLoop {
            target: requested.to_string(),
            limit: MAX_REDIRECTS,
        })
    }
}
