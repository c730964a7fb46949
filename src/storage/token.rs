use super::{KeyValueStore, StorageError};
use crate::guard::AuthStatus;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";

/// Credential presence check backed by a [`KeyValueStore`].
///
/// A non-empty value under the token key means "authenticated". The value is
/// not validated, decoded or checked for expiry.
#[derive(Debug, Clone)]
pub struct TokenAuth<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> TokenAuth<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: TOKEN_KEY.to_string(),
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Store the identifier returned by the login endpoint.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn sign_in(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store.set_item(&self.key, token.expose_secret())
    }

    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.store.remove_item(&self.key)
    }
}

impl<S: KeyValueStore> AuthStatus for TokenAuth<S> {
    fn is_authenticated(&self) -> bool {
        match self.store.get_item(&self.key) {
            Ok(Some(value)) => !value.is_empty(),
            Ok(None) => {
                debug!("no {} entry in storage", self.key);
                false
            }
            Err(e) => {
                warn!("Could not read {} from storage: {e}", self.key);
                false
            }
        }
    }
}
