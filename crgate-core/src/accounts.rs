//! Mock-mode account table

use crate::types::{Role, UserIdentity};
use serde::Deserialize;

/// Account entry used when no directory is configured
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MockAccount {
    /// Login name, matched case-sensitively
    pub username: String,
    /// Plain-text password
    pub password: String,
    /// Display name
    pub name: String,
    /// Application role
    pub role: Role,
    /// Email address
    pub email: String,
}

impl MockAccount {
    fn identity(&self) -> UserIdentity {
        UserIdentity {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            username: self.username.clone(),
        }
    }
}

/// Static credential table
#[derive(Debug, Clone, Default)]
pub struct AccountTable {
    accounts: Vec<MockAccount>,
}

impl AccountTable {
    /// Create a table from account entries
    pub fn new(accounts: Vec<MockAccount>) -> Self {
        Self { accounts }
    }

    /// Identity for an exact username/password match
    pub fn verify(&self, username: &str, password: &str) -> Option<UserIdentity> {
        self.accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .map(MockAccount::identity)
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when no accounts are configured
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
