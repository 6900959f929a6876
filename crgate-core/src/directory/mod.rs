//! Directory service access
//!
//! Authentication against a directory is a two-step protocol:
//!
//! 1. [`Directory::lookup`] binds with the service account and searches for
//!    the entry whose identifier attribute equals the submitted username.
//! 2. [`Directory::verify`] re-binds as that entry's DN with the submitted
//!    password. A successful bind is the credential check.
//!
//! Each step reports a distinct [`DirectoryError`] so callers can tell an
//! unknown user from a wrong password from an unreachable server.

pub mod ldap;
pub mod memory;

pub use ldap::LdapDirectory;
pub use memory::InMemoryDirectory;

use crate::error::DirectoryError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Attributes requested from the directory for each user entry
pub const SEARCH_ATTRIBUTES: &[&str] = &["cn", "mail", "givenName", "sn", "memberOf", "displayName"];

/// User entry returned by a directory search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Distinguished name, used for the verification bind
    pub dn: String,
    /// Multi-valued attributes as returned by the server
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// Create an entry with no attributes
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    /// All values of an attribute. Attribute names compare case-insensitively,
    /// as they do on the wire.
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// First non-empty value of an attribute
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name)
            .iter()
            .map(String::as_str)
            .find(|v| !v.is_empty())
    }

    /// Group DNs from `memberOf`
    pub fn groups(&self) -> &[String] {
        self.values("memberOf")
    }
}

/// Bind/search access to a directory service
#[async_trait]
pub trait Directory: Send + Sync {
    /// Service bind plus search for `username`.
    ///
    /// Returns [`DirectoryError::NotFound`] when the search matches nothing and
    /// [`DirectoryError::Transport`] for any connectivity or protocol failure,
    /// including a rejected service bind.
    async fn lookup(&self, username: &str) -> Result<DirectoryEntry, DirectoryError>;

    /// Bind as `entry` with `password`.
    ///
    /// Returns [`DirectoryError::BindRejected`] when the server refuses the
    /// credentials.
    async fn verify(&self, entry: &DirectoryEntry, password: &str) -> Result<(), DirectoryError>;
}
