//! Application state

use crgate_core::{
    AuthGateway, AuthMode, Catalog, FixtureSet, LdapDirectory, Result, ServerConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Application state shared across handlers.
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Change request catalog
    pub catalog: Arc<Catalog>,

    /// Login backend
    pub auth: Arc<AuthGateway>,

    /// Directory served for non-API paths
    pub static_dir: Arc<PathBuf>,

    /// Largest accepted request body
    pub max_body_bytes: usize,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(catalog: Catalog, auth: AuthGateway) -> Self {
        let defaults = ServerConfig::default();
        Self {
            catalog: Arc::new(catalog),
            auth: Arc::new(auth),
            static_dir: Arc::new(defaults.static_dir),
            max_body_bytes: defaults.max_body_bytes,
            start_time: Instant::now(),
        }
    }

    /// Serve static files from `dir`
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Arc::new(dir.into());
        self
    }

    /// Build state from configuration: fixtures, catalog and login backend
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let fixtures = match &config.fixtures {
            Some(path) => FixtureSet::load(path)?,
            None => FixtureSet::builtin(),
        };
        let catalog = fixtures.catalog()?;

        let auth = match config.auth.mode {
            AuthMode::Mock => {
                let accounts = fixtures.account_table();
                if accounts.is_empty() {
                    warn!("Mock authentication has no accounts; every login will be rejected");
                }
                AuthGateway::mock(accounts)
            }
            AuthMode::Directory => {
                info!(
                    url = %config.auth.ldap.url,
                    base = %config.auth.ldap.search_base,
                    "Using directory authentication"
                );
                AuthGateway::directory(
                    Arc::new(LdapDirectory::new(config.auth.ldap.clone())),
                    config.auth.mail_domain.clone(),
                )
            }
        };

        let mut state = Self::new(catalog, auth).with_static_dir(config.static_dir.clone());
        state.max_body_bytes = config.max_body_bytes;
        Ok(state)
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
