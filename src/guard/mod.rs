//! Navigation guard.
//!
//! Runs before every navigation. A target whose path is in the public set
//! always proceeds. Any other target needs the [`AuthStatus`] provider to
//! answer `true`, otherwise the navigation is redirected and the original
//! target is dropped. The guard only reads the provider; it never signs
//! anybody in or out.

use crate::navigation::Location;
use serde::Serialize;
use std::{collections::BTreeSet, fmt, sync::Arc};
use tracing::{debug, instrument};

pub const LOGIN_PATH: &str = "/login";

/// Answers whether the visitor currently holds a credential.
///
/// Implementations are queried on each navigation and must not cache.
pub trait AuthStatus: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

impl<F> AuthStatus for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_authenticated(&self) -> bool {
        self()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub public_paths: BTreeSet<String>,
    pub redirect_to: String,
}

impl GuardConfig {
    pub fn new<I, S>(public_paths: I, redirect_to: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_paths: public_paths.into_iter().map(Into::into).collect(),
            redirect_to: redirect_to.into(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new([LOGIN_PATH], LOGIN_PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub to: Location,
    pub from: Location,
}

impl NavigationRequest {
    pub fn new(to: impl Into<Location>, from: impl Into<Location>) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Decision {
    Proceed { to: Location },
    Redirect { to: Location },
}

impl Decision {
    #[must_use]
    pub const fn target(&self) -> &Location {
        match self {
            Self::Proceed { to } | Self::Redirect { to } => to,
        }
    }

    #[must_use]
    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

#[derive(Clone)]
pub struct NavigationGuard {
    config: GuardConfig,
    auth: Arc<dyn AuthStatus>,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(config: GuardConfig, auth: Arc<dyn AuthStatus>) -> Self {
        Self { config, auth }
    }

    #[must_use]
    pub const fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Exact membership on the path; query and hash play no part.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.config.public_paths.contains(path)
    }

    #[instrument(skip(self, request), fields(to = %request.to, from = %request.from))]
    pub fn check(&self, request: &NavigationRequest) -> Decision {
        if self.is_public(&request.to.path) || self.auth.is_authenticated() {
            return Decision::Proceed {
                to: request.to.clone(),
            };
        }

        debug!(
            "{} requires authentication, redirecting to {}",
            request.to.path, self.config.redirect_to
        );

        Decision::Redirect {
            to: Location::parse(&self.config.redirect_to),
        }
    }
}

impl fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Flag(AtomicBool);

    impl AuthStatus for Flag {
        fn is_authenticated(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn guard(authenticated: bool) -> NavigationGuard {
        NavigationGuard::new(
            GuardConfig::default(),
            Arc::new(move || authenticated),
        )
    }

    fn proceed(to: &str) -> Decision {
        Decision::Proceed {
            to: Location::parse(to),
        }
    }

    fn redirect(to: &str) -> Decision {
        Decision::Redirect {
            to: Location::parse(to),
        }
    }

    #[test]
    fn unauthenticated_conversation_redirects_to_login() {
        let decision = guard(false).check(&NavigationRequest::new("/conversations/42", "/"));
        assert_eq!(decision, redirect("/login"));
    }

    #[test]
    fn authenticated_conversation_proceeds() {
        let decision = guard(true).check(&NavigationRequest::new("/conversations/42", "/"));
        assert_eq!(decision, proceed("/conversations/42"));
    }

    #[test]
    fn login_always_proceeds() {
        for authenticated in [false, true] {
            let decision = guard(authenticated).check(&NavigationRequest::new("/login", "/"));
            assert_eq!(decision, proceed("/login"));
        }
    }

    #[test]
    fn authenticated_home_proceeds() {
        let decision = guard(true).check(&NavigationRequest::new("/", "/login"));
        assert_eq!(decision, proceed("/"));
    }

    #[test]
    fn every_protected_path_redirects_when_unauthenticated() {
        let guard = guard(false);
        for path in ["/", "/conversations/42", "/unknown", "/login/", "/LOGIN", "/users"] {
            let decision = guard.check(&NavigationRequest::new(path, "/"));
            assert_eq!(decision, redirect("/login"), "path {path}");
        }
    }

    #[test]
    fn every_path_proceeds_unmodified_when_authenticated() {
        let guard = guard(true);
        for path in ["/", "/login", "/conversations/42?tab=media#m-9", "/unknown"] {
            let decision = guard.check(&NavigationRequest::new(path, "/"));
            assert_eq!(decision, proceed(path), "path {path}");
        }
    }

    #[test]
    fn query_does_not_change_classification() {
        let decision = guard(false).check(&NavigationRequest::new("/login?next=%2F", "/"));
        assert_eq!(decision, proceed("/login?next=%2F"));
    }

    #[test]
    fn credential_is_read_on_every_check() {
        let flag = Arc::new(Flag(AtomicBool::new(false)));
        let guard = NavigationGuard::new(GuardConfig::default(), flag.clone());
        let request = NavigationRequest::new("/conversations/7", "/login");

        assert!(guard.check(&request).is_redirect());
        flag.0.store(true, Ordering::SeqCst);
        assert!(!guard.check(&request).is_redirect());
        flag.0.store(false, Ordering::SeqCst);
        assert!(guard.check(&request).is_redirect());
    }

    #[test]
    fn public_paths_skip_the_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let guard = NavigationGuard::new(
            GuardConfig::default(),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }),
        );

        guard.check(&NavigationRequest::new("/login", "/"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        guard.check(&NavigationRequest::new("/", "/"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn custom_public_set_and_redirect_target() {
        let config = GuardConfig::new(["/signin", "/about"], "/signin?reason=auth");
        let guard = NavigationGuard::new(config, Arc::new(|| false));

        assert_eq!(
            guard.check(&NavigationRequest::new("/about", "/")),
            proceed("/about")
        );
        assert_eq!(
            guard.check(&NavigationRequest::new("/login", "/")),
            redirect("/signin?reason=auth")
        );
    }

    #[test]
    fn decision_serializes_with_action_tag() -> anyhow::Result<()> {
        let json = serde_json::to_value(redirect("/login"))?;
        assert_eq!(json["action"], "redirect");
        assert_eq!(json["to"]["path"], "/login");
        Ok(())
    }
}
