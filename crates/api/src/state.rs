//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{ApiConfig, JwtConfig};
use crate::sms::SmsNotifier;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Everything in here is read-only after
/// startup: the pool manages its own interior state, and the notifier is
/// configured exactly once.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    notifier: SmsNotifier,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let notifier = SmsNotifier::from_config(&config.sms);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                notifier,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the JWT configuration.
    #[must_use]
    pub fn jwt(&self) -> &JwtConfig {
        &self.inner.config.jwt
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the process-wide SMS notifier.
    #[must_use]
    pub fn notifier(&self) -> &SmsNotifier {
        &self.inner.notifier
    }
}
