//! LDAP-backed directory

use super::{Directory, DirectoryEntry, SEARCH_ATTRIBUTES};
use crate::config::LdapSettings;
use crate::error::DirectoryError;
use async_trait::async_trait;
use ldap3::{ldap_escape, Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Bind result codes that mean the server refused these credentials:
/// inappropriateAuthentication, invalidCredentials, insufficientAccessRights
/// and unwillingToPerform. Anything else non-zero is a server-side failure.
const CREDENTIAL_REJECTIONS: [u32; 4] = [48, 49, 50, 53];

/// Directory client speaking LDAP through `ldap3`.
///
/// Every call opens its own connection; nothing is pooled between requests.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    settings: LdapSettings,
}

fn transport(err: impl std::fmt::Display) -> DirectoryError {
    DirectoryError::Transport(err.to_string())
}

impl LdapDirectory {
    /// Create a client for the configured server
    pub fn new(settings: LdapSettings) -> Self {
        Self { settings }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_secs)
    }

    /// Search filter for `username`, escaped for RFC 4515
    pub fn search_filter(&self, username: &str) -> String {
        format!("({}={})", self.settings.uid_attribute, ldap_escape(username))
    }

    async fn connect(&self) -> Result<Ldap, DirectoryError> {
        let conn_settings = LdapConnSettings::new().set_conn_timeout(self.timeout());
        let (conn, ldap) = LdapConnAsync::with_settings(conn_settings, &self.settings.url)
            .await
            .map_err(transport)?;
        ldap3::drive!(conn);
        Ok(ldap)
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, DirectoryError>
    where
        F: Future<Output = Result<T, DirectoryError>>,
    {
        tokio::time::timeout(self.timeout(), fut)
            .await
            .map_err(|_| {
                DirectoryError::Transport(format!(
                    "{} timed out after {}s",
                    op, self.settings.timeout_secs
                ))
            })?
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    async fn lookup(&self, username: &str) -> Result<DirectoryEntry, DirectoryError> {
        self.bounded("directory search", async {
            let mut ldap = self.connect().await?;

            ldap.simple_bind(&self.settings.bind_dn, &self.settings.bind_password)
                .await
                .map_err(transport)?
                .success()
                .map_err(|e| DirectoryError::Transport(format!("service bind failed: {}", e)))?;

            let filter = self.search_filter(username);
            debug!(base = %self.settings.search_base, %filter, "Searching directory");

            let (entries, _) = ldap
                .search(
                    &self.settings.search_base,
                    Scope::Subtree,
                    &filter,
                    SEARCH_ATTRIBUTES.to_vec(),
                )
                .await
                .map_err(transport)?
                .success()
                .map_err(transport)?;

            if let Err(e) = ldap.unbind().await {
                warn!("Service unbind failed: {}", e);
            }

            let entry = entries
                .into_iter()
                .next()
                .ok_or_else(|| DirectoryError::NotFound(username.to_string()))?;
            let entry = SearchEntry::construct(entry);

            Ok::<_, DirectoryError>(DirectoryEntry {
                dn: entry.dn,
                attributes: entry.attrs,
            })
        })
        .await
    }

    async fn verify(&self, entry: &DirectoryEntry, password: &str) -> Result<(), DirectoryError> {
        self.bounded("user bind", async {
            let mut ldap = self.connect().await?;

            let result = ldap
                .simple_bind(&entry.dn, password)
                .await
                .map_err(transport)?;

            if let Err(e) = ldap.unbind().await {
                warn!("User unbind failed: {}", e);
            }

            bind_outcome(result.rc, &result.text)
        })
        .await
    }
}

fn bind_outcome(rc: u32, text: &str) -> Result<(), DirectoryError> {
    match rc {
        0 => Ok(()),
        rc if CREDENTIAL_REJECTIONS.contains(&rc) => {
            Err(DirectoryError::BindRejected(format!("rc={} {}", rc, text)))
        }
        rc => Err(DirectoryError::Transport(format!(
            "user bind failed: rc={} {}",
            rc, text
        ))),
    }
}
