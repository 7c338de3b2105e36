//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::services::AdminAuthenticator;
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store and authenticator are trait
/// objects so tests can swap in the in-memory store and a stub verifier.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: Arc<dyn DocumentStore>,
    authenticator: AdminAuthenticator,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: SiteConfig,
        store: Arc<dyn DocumentStore>,
        authenticator: AdminAuthenticator,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                authenticator,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the admin authenticator.
    #[must_use]
    pub fn authenticator(&self) -> &AdminAuthenticator {
        &self.inner.authenticator
    }
}
