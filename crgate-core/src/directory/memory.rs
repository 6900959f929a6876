//! In-process directory for local development and tests

use super::{Directory, DirectoryEntry};
use crate::error::DirectoryError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Directory backed by a map of username to entry and password.
///
/// `unreachable` makes every call fail with a transport error, which stands
/// in for a server that refuses connections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, (DirectoryEntry, String)>,
    unreachable: Option<String>,
}

impl InMemoryDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user entry with its password
    pub fn with_user(mut self, username: &str, entry: DirectoryEntry, password: &str) -> Self {
        self.users
            .insert(username.to_string(), (entry, password.to_string()));
        self
    }

    /// Fail every call with `reason`
    pub fn unreachable(reason: &str) -> Self {
        Self {
            users: HashMap::new(),
            unreachable: Some(reason.to_string()),
        }
    }

    fn check_reachable(&self) -> Result<(), DirectoryError> {
        match &self.unreachable {
            Some(reason) => Err(DirectoryError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn lookup(&self, username: &str) -> Result<DirectoryEntry, DirectoryError> {
        self.check_reachable()?;
        self.users
            .get(username)
            .map(|(entry, _)| entry.clone())
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))
    }

    async fn verify(&self, entry: &DirectoryEntry, password: &str) -> Result<(), DirectoryError> {
        self.check_reachable()?;
        let matches = self
            .users
            .values()
            .any(|(e, p)| e.dn == entry.dn && p == password);
        if matches {
            Ok(())
        } else {
            Err(DirectoryError::BindRejected(format!(
                "invalid credentials for {}",
                entry.dn
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new().with_user(
            "kevin",
            DirectoryEntry::new("uid=kevin,ou=users,dc=company,dc=com"),
            "hunter2",
        )
    }

    #[tokio::test]
    async fn test_lookup_and_verify() {
        let dir = directory();
        let entry = dir.lookup("kevin").await.unwrap();
        assert!(dir.verify(&entry, "hunter2").await.is_ok());
        assert!(matches!(
            dir.verify(&entry, "wrong").await,
            Err(DirectoryError::BindRejected(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_unknown_user() {
        assert_eq!(
            directory().lookup("ghost").await,
            Err(DirectoryError::NotFound("ghost".into()))
        );
    }

    #[tokio::test]
    async fn test_unreachable() {
        let dir = InMemoryDirectory::unreachable("connection refused");
        assert_eq!(
            dir.lookup("kevin").await,
            Err(DirectoryError::Transport("connection refused".into()))
        );
    }
}
