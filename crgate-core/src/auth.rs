//! Login handling for mock and directory modes

use crate::accounts::AccountTable;
use crate::config::AuthMode;
use crate::directory::{Directory, DirectoryEntry};
use crate::error::AuthFailure;
use crate::types::{AuthToken, Role, UserIdentity};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSuccess {
    /// Informational token
    pub token: AuthToken,
    /// Resolved identity
    pub user: UserIdentity,
}

enum Backend {
    Mock(AccountTable),
    Directory {
        client: Arc<dyn Directory>,
        mail_domain: String,
    },
}

/// Credential check front door.
///
/// The backend is chosen once at construction. Both backends share the
/// same input validation and token issuance.
pub struct AuthGateway {
    backend: Backend,
}

impl AuthGateway {
    /// Gateway checking against a static account table
    pub fn mock(accounts: AccountTable) -> Self {
        Self {
            backend: Backend::Mock(accounts),
        }
    }

    /// Gateway delegating to a directory service
    pub fn directory(client: Arc<dyn Directory>, mail_domain: impl Into<String>) -> Self {
        Self {
            backend: Backend::Directory {
                client,
                mail_domain: mail_domain.into(),
            },
        }
    }

    /// Which backend this gateway uses
    pub fn mode(&self) -> AuthMode {
        match self.backend {
            Backend::Mock(_) => AuthMode::Mock,
            Backend::Directory { .. } => AuthMode::Directory,
        }
    }

    /// Check a username/password pair.
    ///
    /// Missing or empty fields fail with [`AuthFailure::MissingCredentials`]
    /// before any backend is consulted.
    pub async fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<AuthSuccess, AuthFailure> {
        let (username, password) = match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => return Err(AuthFailure::MissingCredentials),
        };

        debug!(
            username,
            password_len = password.len(),
            mode = self.mode().as_str(),
            "Authentication attempt"
        );

        let user = match &self.backend {
            Backend::Mock(accounts) => accounts
                .verify(username, password)
                .ok_or(AuthFailure::InvalidCredentials),
            Backend::Directory {
                client,
                mail_domain,
            } => directory_login(client.as_ref(), mail_domain, username, password).await,
        };

        match user {
            Ok(user) => {
                info!(username, role = %user.role, "Authentication succeeded");
                Ok(AuthSuccess {
                    token: AuthToken::issue(username, Utc::now()),
                    user,
                })
            }
            Err(failure) => {
                warn!(username, reason = %failure, "Authentication failed");
                Err(failure)
            }
        }
    }
}

async fn directory_login(
    client: &dyn Directory,
    mail_domain: &str,
    username: &str,
    password: &str,
) -> Result<UserIdentity, AuthFailure> {
    let entry = client.lookup(username).await?;
    client.verify(&entry, password).await?;
    Ok(identity_from_entry(&entry, username, mail_domain))
}

/// Build an identity from a verified directory entry.
///
/// Display name prefers `displayName`, then `cn`, then the username; email
/// falls back to `<username>@<mail_domain>`.
pub fn identity_from_entry(entry: &DirectoryEntry, username: &str, mail_domain: &str) -> UserIdentity {
    let name = entry
        .first("displayName")
        .or_else(|| entry.first("cn"))
        .unwrap_or(username)
        .to_string();
    let email = entry
        .first("mail")
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}@{}", username, mail_domain));

    UserIdentity {
        name,
        email,
        role: Role::from_groups(entry.groups()),
        username: username.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::fixtures::FixtureSet;
    use proptest::prelude::*;

    fn mock_gateway() -> AuthGateway {
        AuthGateway::mock(FixtureSet::builtin().account_table())
    }

    fn directory_gateway() -> AuthGateway {
        let dir = InMemoryDirectory::new()
            .with_user(
                "jdoe",
                DirectoryEntry::new("uid=jdoe,ou=users,dc=company,dc=com")
                    .with_attribute("displayName", ["Jane Doe"])
                    .with_attribute("cn", ["jdoe"])
                    .with_attribute("mail", ["jane.doe@company.com"])
                    .with_attribute("memberOf", ["CN=CR_Admins,OU=Groups,DC=company,DC=com"]),
                "pa55",
            )
            .with_user(
                "plain",
                DirectoryEntry::new("uid=plain,ou=users,dc=company,dc=com"),
                "pw",
            );
        AuthGateway::directory(Arc::new(dir), "company.com")
    }

    #[tokio::test]
    async fn test_mock_login_roles() {
        let gw = mock_gateway();
        for (user, role) in [
            ("admin", Role::Admin),
            ("boss", Role::Approver),
            ("kevin", Role::Requester),
        ] {
            let ok = gw.authenticate(Some(user), Some("admin")).await.unwrap();
            assert_eq!(ok.user.role, role);
            assert_eq!(ok.user.username, user);
            assert!(ok.token.as_str().starts_with(&format!("ldap-token-{}-", user)));
        }
    }

    #[tokio::test]
    async fn test_mock_wrong_password() {
        let err = mock_gateway()
            .authenticate(Some("admin"), Some("nope"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthFailure::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let gw = mock_gateway();
        for (u, p) in [
            (None, None),
            (Some("admin"), None),
            (None, Some("admin")),
            (Some(""), Some("admin")),
            (Some("admin"), Some("")),
        ] {
            assert_eq!(
                gw.authenticate(u, p).await.unwrap_err(),
                AuthFailure::MissingCredentials
            );
        }
    }

    #[tokio::test]
    async fn test_missing_fields_never_reach_directory() {
        let gw = AuthGateway::directory(
            Arc::new(InMemoryDirectory::unreachable("should not be called")),
            "company.com",
        );
        assert_eq!(
            gw.authenticate(Some("jdoe"), None).await.unwrap_err(),
            AuthFailure::MissingCredentials
        );
    }

    #[tokio::test]
    async fn test_directory_login() {
        let ok = directory_gateway()
            .authenticate(Some("jdoe"), Some("pa55"))
            .await
            .unwrap();
        assert_eq!(ok.user.name, "Jane Doe");
        assert_eq!(ok.user.email, "jane.doe@company.com");
        assert_eq!(ok.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_directory_fallbacks() {
        let ok = directory_gateway()
            .authenticate(Some("plain"), Some("pw"))
            .await
            .unwrap();
        assert_eq!(ok.user.name, "plain");
        assert_eq!(ok.user.email, "plain@company.com");
        assert_eq!(ok.user.role, Role::Requester);
    }

    #[tokio::test]
    async fn test_directory_failures() {
        let gw = directory_gateway();
        assert_eq!(
            gw.authenticate(Some("ghost"), Some("pw")).await.unwrap_err(),
            AuthFailure::UserNotFound
        );
        assert_eq!(
            gw.authenticate(Some("jdoe"), Some("wrong")).await.unwrap_err(),
            AuthFailure::BindRejected
        );

        let down = AuthGateway::directory(
            Arc::new(InMemoryDirectory::unreachable("connection refused")),
            "company.com",
        );
        assert_eq!(
            down.authenticate(Some("jdoe"), Some("pa55")).await.unwrap_err(),
            AuthFailure::Directory("connection refused".into())
        );
    }

    #[test]
    fn test_identity_prefers_cn_without_display_name() {
        let entry = DirectoryEntry::new("uid=x").with_attribute("cn", ["Common Name"]);
        let user = identity_from_entry(&entry, "x", "corp.example");
        assert_eq!(user.name, "Common Name");
        assert_eq!(user.email, "x@corp.example");
    }

    #[test]
    fn test_mode() {
        assert_eq!(mock_gateway().mode(), AuthMode::Mock);
        assert_eq!(directory_gateway().mode(), AuthMode::Directory);
    }

    proptest! {
        #[test]
        fn prop_unknown_users_rejected(username in "[a-z]{1,12}", password in "[ -~]{1,16}") {
            prop_assume!(!matches!(username.as_str(), "admin" | "boss" | "kevin"));
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = rt.block_on(mock_gateway().authenticate(Some(&username), Some(&password)));
            prop_assert_eq!(result.unwrap_err(), AuthFailure::InvalidCredentials);
        }
    }
}
