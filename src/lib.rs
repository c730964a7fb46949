//! # WASAText web (client routing & development server)
//!
//! `wasatext-web` holds the routing core of the WASAText single page application
//! and the development server that fronts it during local work.
//!
//! ## Routing
//!
//! The route table is declared once at startup and never changes afterwards:
//!
//! - `/login` renders the login view.
//! - `/` renders the home view, a layout shell for its children.
//! - `/conversations/:id` renders the chat view inside the home shell.
//!
//! ## Navigation Guard
//!
//! Every navigation passes through a guard before a view is mounted. Paths in
//! the public set (by default only `/login`) always proceed; any other path
//! requires a credential, otherwise the visitor is sent to `/login`. The
//! credential check is an injected [`guard::AuthStatus`] provider, the default
//! one looks for a non-empty `token` entry in client-local storage and reads it
//! again on every navigation.
//!
//! ## Development Server
//!
//! `wasatext-web serve` serves the built application and forwards the API
//! prefixes (`/session`, `/users`, `/conversations`) verbatim to the backend.

pub mod cli;
pub mod guard;
pub mod navigation;
pub mod proxy;
pub mod routes;
pub mod storage;
pub mod webui;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
