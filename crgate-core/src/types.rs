//! Domain types for change requests, metric checks and identities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Change request identifier
///
/// Identifiers are opaque. Two shapes occur in practice: a bare integer
/// (`1001`) and a tagged string (`"CHG1001"`). Both serialize back to the
/// JSON shape they were read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrId {
    /// Integer identifier
    Numeric(u64),
    /// String identifier, usually `CHG` followed by digits
    Tagged(String),
}

impl CrId {
    /// The identifier as it appears in a URL path segment
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrId::Numeric(n) => write!(f, "{}", n),
            CrId::Tagged(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CrId {
    fn from(s: &str) -> Self {
        CrId::Tagged(s.to_string())
    }
}

impl From<u64> for CrId {
    fn from(n: u64) -> Self {
        CrId::Numeric(n)
    }
}

/// Review state of a change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrStatus {
    /// Awaiting a decision
    Pending,
    /// Approved
    Approved,
    /// Rejected
    Rejected,
}

/// Change request record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    /// Identifier
    pub id: CrId,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Name of the requester
    pub requester: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Review state
    pub status: CrStatus,
    /// Priority label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Category label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Outcome of a single metric check, encoded on the wire as "0", "1" or "2"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Check failed
    #[serde(rename = "0")]
    Failed,
    /// Check passed
    #[serde(rename = "1")]
    Passed,
    /// Check passed with a warning
    #[serde(rename = "2")]
    Warning,
}

fn not_applicable() -> String {
    "N/A".to_string()
}

/// One pass/fail/warning item in a change request's validation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCheckResult {
    /// Group label, e.g. "Security"
    pub group: String,
    /// Check outcome
    pub status: CheckStatus,
    /// Check title
    pub title: String,
    /// What the check verifies
    pub description: String,
    /// Result label shown to reviewers
    pub result: String,
    /// What to do when the check fails
    pub remediation: String,
    /// Remediation link, "N/A" when there is none
    #[serde(default = "not_applicable")]
    pub link: String,
}

/// Application role derived from an account or directory groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// May approve or reject change requests
    Approver,
    /// May submit change requests
    Requester,
}

impl Role {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Approver => "approver",
            Role::Requester => "requester",
        }
    }

    /// Map directory group memberships to a role.
    ///
    /// Checks run in privilege order over the whole list, so a user in both
    /// an approver group and an admin group is an admin. Unrecognised or empty
    /// membership falls back to the lowest privilege.
    pub fn from_groups<S: AsRef<str>>(groups: &[S]) -> Role {
        let any = |needles: &[&str]| {
            groups
                .iter()
                .any(|g| needles.iter().any(|n| g.as_ref().contains(n)))
        };

        if any(&["Admins", "Administrators"]) {
            Role::Admin
        } else if any(&["Approvers"]) {
            Role::Approver
        } else {
            Role::Requester
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Application role
    pub role: Role,
    /// Login name
    pub username: String,
}

/// Opaque login token.
///
/// Carries no claim and is never checked on later requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Issue a token for `username` at `at`: `ldap-token-<username>-<epoch seconds>`
    pub fn issue(username: &str, at: DateTime<Utc>) -> Self {
        AuthToken(format!(
            "ldap-token-{}-{}.{:06}",
            username,
            at.timestamp(),
            at.timestamp_subsec_micros()
        ))
    }

    /// Token text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
