//! crgate core - change request approval domain
//!
//! This crate holds everything the HTTP layer serves: the read-only change
//! request catalog, batch acknowledgements, and login against a mock account
//! table or an LDAP directory.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accounts;
pub mod auth;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod fixtures;
pub mod types;

pub use accounts::{AccountTable, MockAccount};
pub use auth::{AuthGateway, AuthSuccess};
pub use batch::{BatchAcknowledgement, BatchAction};
pub use catalog::Catalog;
pub use config::{AuthMode, LdapSettings, ServerConfig};
pub use directory::{Directory, DirectoryEntry, InMemoryDirectory, LdapDirectory};
pub use error::{AuthFailure, CrgateError, DirectoryError, Result};
pub use fixtures::FixtureSet;
pub use types::{
    AuthToken, ChangeRequest, CheckStatus, CrId, CrStatus, MetricCheckResult, Role, UserIdentity,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
