//! Session middleware configuration.
//!
//! Sessions are carried in a signed cookie named `session`. The record
//! behind it lives in `PostgreSQL` (tower-sessions-sqlx-store) or, when no
//! database is configured, in process memory.

use std::time::Duration;

use secrecy::ExposeSecret;
use tokio::task::JoinHandle;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::{ApiConfig, ConfigError};
use crate::models::session::SESSION_TTL_HOURS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "session";

/// How often expired session records are purged from a persistent store.
pub const EXPIRED_SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Derive the cookie signing key from the configured secret.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the secret is shorter than a
/// full cookie key (64 bytes).
pub fn signing_key(config: &ApiConfig) -> Result<Key, ConfigError> {
    Key::try_from(config.session_secret.expose_secret().as_bytes()).map_err(|e| {
        ConfigError::InsecureSecret("BIONICLE_SESSION_SECRET".to_string(), e.to_string())
    })
}

/// Create the session layer over `store`.
///
/// The cookie is only re-issued when the session is written (login), so the
/// 24-hour window runs from issuance rather than sliding with activity. The
/// identity gate enforces the same window from the stored `issued_at`.
#[must_use]
pub fn create_session_layer<S>(
    store: S,
    key: Key,
    secure: bool,
) -> SessionManagerLayer<S, SignedCookie>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::hours(SESSION_TTL_HOURS),
        ))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

/// Spawn a background task that deletes expired session records.
///
/// Runs one sweep immediately and then one per `period`. The task ends only
/// if a sweep fails; the caller aborts it on shutdown.
pub fn spawn_expired_session_cleanup<S>(store: S, period: Duration) -> JoinHandle<()>
where
    S: ExpiredDeletion + Clone,
{
    tracing::info!(period_secs = period.as_secs(), "Spawning expired session cleanup task");
    tokio::spawn(async move {
        if let Err(e) = store.continuously_delete_expired(period).await {
            tracing::error!(error = %e, "Expired session cleanup stopped");
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use secrecy::SecretString;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::session_store;

    use super::*;

    /// Store that only counts expiry sweeps.
    #[derive(Debug, Clone, Default)]
    struct SweepCounter {
        sweeps: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl SessionStore for SweepCounter {
        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Ok(())
        }

        async fn load(&self, _id: &Id) -> session_store::Result<Option<Record>> {
            Ok(None)
        }

        async fn delete(&self, _id: &Id) -> session_store::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ExpiredDeletion for SweepCounter {
        async fn delete_expired(&self) -> session_store::Result<()> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(session_store::Error::Backend("db down".to_string()));
            }
            Ok(())
        }
    }

    fn config_with_secret(secret: &str) -> ApiConfig {
        ApiConfig {
            database_url: None,
            host: "127.0.0.1".parse().unwrap(),
            port: 3003,
            session_secret: SecretString::from(secret),
            secure_cookies: false,
            upload_dir: PathBuf::from("./images"),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_signing_key_requires_64_bytes() {
        assert!(signing_key(&config_with_secret(&"k".repeat(63))).is_err());
        assert!(signing_key(&config_with_secret(&"k".repeat(64))).is_ok());
    }

    #[tokio::test]
    async fn test_cleanup_task_sweeps_repeatedly() {
        let store = SweepCounter::default();
        let handle = spawn_expired_session_cleanup(store.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.sweeps.load(Ordering::SeqCst) >= 2);
        assert!(!handle.is_finished());

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_after_failed_sweep() {
        let store = SweepCounter {
            fail: true,
            ..SweepCounter::default()
        };
        let handle = spawn_expired_session_cleanup(store.clone(), Duration::from_millis(10));

        handle.await.unwrap();
        assert_eq!(store.sweeps.load(Ordering::SeqCst), 1);
    }
}
