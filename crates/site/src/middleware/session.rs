//! Session middleware configuration.
//!
//! Sessions live server-side; the browser only holds a signed ID cookie.
//! Storage is `PostgreSQL` when `SITE_SESSION_DATABASE_URL` is set and an
//! in-process map otherwise (sessions then do not survive restarts).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "patron_session";

/// Inactivity window before a session expires (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// How often expired `PostgreSQL` sessions are purged.
const EXPIRED_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Session storage chosen at startup.
#[derive(Debug, Clone)]
pub enum SiteSessionStore {
    Memory(MemoryStore),
    Postgres(PostgresStore),
}

impl SiteSessionStore {
    /// An in-process store.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::default())
    }

    /// A `PostgreSQL` store using the `tower_sessions.session` table.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::Postgres(PostgresStore::new(pool))
    }

    /// Spawn a background task that periodically deletes expired sessions.
    ///
    /// The in-process store drops expired records on load, so this only
    /// does anything for `PostgreSQL`.
    pub fn spawn_expired_sweeper(&self) {
        let Self::Postgres(store) = self else {
            return;
        };
        let store = store.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(EXPIRED_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                if let Err(e) = store.delete_expired().await {
                    tracing::warn!(error = %e, "Failed to delete expired sessions");
                }
            }
        });
    }
}

#[async_trait]
impl SessionStore for SiteSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.create(record).await,
            Self::Postgres(store) => store.create(record).await,
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.save(record).await,
            Self::Postgres(store) => store.save(record).await,
        }
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self {
            Self::Memory(store) => store.load(session_id).await,
            Self::Postgres(store) => store.load(session_id).await,
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.delete(session_id).await,
            Self::Postgres(store) => store.delete(session_id).await,
        }
    }
}

/// Derive the cookie signing key from the configured secret.
///
/// The secret is hashed to the 64 bytes `Key` requires, so any validated
/// secret length works.
fn signing_key(config: &SiteConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer.
///
/// Admin sessions use `SameSite=Strict`; the sign-in popup posts back from
/// our own origin, so nothing cross-site needs the cookie.
#[must_use]
pub fn create_session_layer(
    store: SiteSessionStore,
    config: &SiteConfig,
) -> SessionManagerLayer<SiteSessionStore, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config))
}
