//! Server configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `CRGATE_*` environment variables. The binary applies its command-line
//! flags last.

use crate::error::{CrgateError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How logins are checked. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Static account table
    #[default]
    Mock,
    /// LDAP bind/search/re-bind
    Directory,
}

impl AuthMode {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Mock => "mock",
            AuthMode::Directory => "directory",
        }
    }
}

impl FromStr for AuthMode {
    type Err = CrgateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(AuthMode::Mock),
            "directory" | "ldap" => Ok(AuthMode::Directory),
            other => Err(CrgateError::ConfigError(format!(
                "unknown auth mode {:?} (expected mock or directory)",
                other
            ))),
        }
    }
}

/// Directory server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdapSettings {
    /// Server URL, e.g. `ldap://ldap.company.com:389`
    pub url: String,
    /// Service account DN
    pub bind_dn: String,
    /// Service account password
    #[serde(skip_serializing)]
    pub bind_password: String,
    /// Subtree searched for user entries
    pub search_base: String,
    /// Attribute compared with the submitted username
    pub uid_attribute: String,
    /// Bound on connect and on each bind/search step
    pub timeout_secs: u64,
}

impl Default for LdapSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            bind_dn: String::new(),
            bind_password: String::new(),
            search_base: String::new(),
            uid_attribute: "uid".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Authentication settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Mock or directory
    pub mode: AuthMode,
    /// Domain used to synthesize an email when the directory has none
    pub mail_domain: String,
    /// Directory settings, required in directory mode
    pub ldap: LdapSettings,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Mock,
            mail_domain: "company.com".to_string(),
            ldap: LdapSettings::default(),
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_address: String,
    /// Directory served for non-API paths
    pub static_dir: PathBuf,
    /// Fixture file replacing the built-in data tables
    pub fixtures: Option<PathBuf>,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Authentication
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            static_dir: PathBuf::from("."),
            fixtures: None,
            max_body_bytes: 1024 * 1024,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Apply `CRGATE_*` variables from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `CRGATE_*` variables from `lookup`
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CRGATE_BIND_ADDRESS") {
            self.bind_address = v;
        }
        if let Some(v) = lookup("CRGATE_STATIC_DIR") {
            self.static_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("CRGATE_FIXTURES") {
            self.fixtures = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("CRGATE_AUTH_MODE") {
            self.auth.mode = v.parse()?;
        }
        if let Some(v) = lookup("CRGATE_LDAP_URL") {
            self.auth.ldap.url = v;
        }
        if let Some(v) = lookup("CRGATE_LDAP_BIND_DN") {
            self.auth.ldap.bind_dn = v;
        }
        if let Some(v) = lookup("CRGATE_LDAP_BIND_PASSWORD") {
            self.auth.ldap.bind_password = v;
        }
        if let Some(v) = lookup("CRGATE_LDAP_SEARCH_BASE") {
            self.auth.ldap.search_base = v;
        }
        Ok(())
    }

    /// Check that the selected auth mode has what it needs
    pub fn validate(&self) -> Result<()> {
        if self.max_body_bytes == 0 {
            return Err(CrgateError::ConfigError(
                "max_body_bytes must be greater than zero".into(),
            ));
        }

        if self.auth.mode == AuthMode::Directory {
            let ldap = &self.auth.ldap;
            for (name, value) in [
                ("auth.ldap.url", &ldap.url),
                ("auth.ldap.bind_dn", &ldap.bind_dn),
                ("auth.ldap.search_base", &ldap.search_base),
                ("auth.ldap.uid_attribute", &ldap.uid_attribute),
            ] {
                if value.trim().is_empty() {
                    return Err(CrgateError::ConfigError(format!(
                        "{} is required in directory mode",
                        name
                    )));
                }
            }
            if ldap.timeout_secs == 0 {
                return Err(CrgateError::ConfigError(
                    "auth.ldap.timeout_secs must be greater than zero".into(),
                ));
            }
        }
        Ok(())
    }
}
