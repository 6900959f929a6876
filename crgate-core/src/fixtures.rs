//! Fixture data: change requests, metric reports and mock accounts
//!
//! The built-in set mirrors the demo data the approval UI ships with. A TOML
//! file with the same shape replaces it wholesale:
//!
//! ```toml
//! [[change_requests]]
//! id = "CHG2001"
//! title = "Rotate TLS certificates"
//! description = "Renew edge certificates before expiry"
//! requester = "Kevin"
//! createdAt = "2024-01-10T00:00:00Z"
//! status = "pending"
//!
//! [[metrics.CHG2001]]
//! group = "Security"
//! status = "1"
//! title = "Certificate chain"
//! description = "Chain validates against the internal root"
//! result = "Pass"
//! remediation = "None"
//!
//! [[accounts]]
//! username = "alice"
//! password = "secret"
//! name = "Alice"
//! role = "approver"
//! email = "alice@company.com"
//! ```

use crate::accounts::{AccountTable, MockAccount};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::types::{ChangeRequest, CheckStatus, CrStatus, MetricCheckResult, Role};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Complete set of injected data tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureSet {
    /// Change requests in display order
    #[serde(default)]
    pub change_requests: Vec<ChangeRequest>,
    /// Metric reports keyed by change request id
    #[serde(default)]
    pub metrics: BTreeMap<String, Vec<MetricCheckResult>>,
    /// Mock-mode accounts
    #[serde(default)]
    pub accounts: Vec<MockAccount>,
}

impl FixtureSet {
    /// Parse a fixture document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a fixture file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let set = Self::from_toml_str(&source)?;
        info!(
            path = %path.display(),
            change_requests = set.change_requests.len(),
            metric_reports = set.metrics.len(),
            accounts = set.accounts.len(),
            "Loaded fixtures"
        );
        Ok(set)
    }

    /// Validated catalog built from these fixtures
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::new(self.change_requests.clone(), self.metrics.clone())
    }

    /// Account table built from these fixtures
    pub fn account_table(&self) -> AccountTable {
        AccountTable::new(self.accounts.clone())
    }

    /// Demo data compiled into the binary
    pub fn builtin() -> Self {
        Self {
            change_requests: builtin_change_requests(),
            metrics: builtin_metrics(),
            accounts: builtin_accounts(),
        }
    }
}

fn builtin_change_requests() -> Vec<ChangeRequest> {
    let day = |d: u32| {
        Utc.with_ymd_and_hms(2023, 6, d, 0, 0, 0)
            .single()
            .expect("fixture dates are valid")
    };
    let entry = |id: &str, title: &str, description: &str, d: u32, status: CrStatus, priority: &str, category: &str| {
        ChangeRequest {
            id: id.into(),
            title: title.to_string(),
            description: description.to_string(),
            requester: "Kevin".to_string(),
            created_at: day(d),
            status,
            priority: Some(priority.to_string()),
            category: Some(category.to_string()),
        }
    };

    vec![
        entry(
            "CHG1001",
            "User Login Function Optimization",
            "Improve user login process to enhance user experience",
            15,
            CrStatus::Pending,
            "high",
            "Authentication",
        ),
        entry(
            "CHG1002",
            "Database Index Optimization",
            "Optimize database indexes related to user queries",
            18,
            CrStatus::Approved,
            "medium",
            "Database",
        ),
        entry(
            "CHG1003",
            "Payment Interface Upgrade",
            "Upgrade payment interface from V1 to V2 version",
            20,
            CrStatus::Pending,
            "high",
            "Payments",
        ),
        entry(
            "CHG1004",
            "Frontend Framework Migration",
            "Migrate frontend framework from Vue2 to Vue3",
            22,
            CrStatus::Rejected,
            "low",
            "Frontend",
        ),
        entry(
            "CHG1005",
            "Add Data Export Function",
            "Add Excel data export function for users",
            25,
            CrStatus::Pending,
            "medium",
            "Reporting",
        ),
    ]
}

fn check(
    group: &str,
    status: CheckStatus,
    title: &str,
    description: &str,
    result: &str,
    remediation: &str,
    link: &str,
) -> MetricCheckResult {
    MetricCheckResult {
        group: group.to_string(),
        status,
        title: title.to_string(),
        description: description.to_string(),
        result: result.to_string(),
        remediation: remediation.to_string(),
        link: link.to_string(),
    }
}

fn builtin_metrics() -> BTreeMap<String, Vec<MetricCheckResult>> {
    let mut metrics = BTreeMap::new();

    metrics.insert(
        "CHG1001".to_string(),
        vec![
            check(
                "Security",
                CheckStatus::Passed,
                "Password hashing",
                "Credentials are stored with a salted adaptive hash",
                "Pass",
                "None",
                "N/A",
            ),
            check(
                "Testing",
                CheckStatus::Warning,
                "Unit test coverage",
                "Line coverage of the changed modules",
                "72%",
                "Raise coverage of the session module above 80%",
                "https://wiki.company.com/testing/coverage",
            ),
            check(
                "Rollback",
                CheckStatus::Passed,
                "Rollback plan",
                "A documented rollback procedure is attached",
                "Pass",
                "None",
                "N/A",
            ),
        ],
    );

    metrics.insert(
        "CHG1002".to_string(),
        vec![
            check(
                "Performance",
                CheckStatus::Passed,
                "Query plan regression",
                "Explain plans of the top queries after the index change",
                "No regression",
                "None",
                "N/A",
            ),
            check(
                "Operations",
                CheckStatus::Failed,
                "Maintenance window",
                "Index build is scheduled inside an approved window",
                "Not scheduled",
                "Book a maintenance window before execution",
                "https://wiki.company.com/ops/maintenance-windows",
            ),
        ],
    );

    metrics.insert(
        "CHG1003".to_string(),
        vec![
            check(
                "Security",
                CheckStatus::Failed,
                "PCI scope review",
                "Payment flow changes reviewed by the compliance team",
                "Missing",
                "Request a PCI review from compliance",
                "https://wiki.company.com/compliance/pci",
            ),
            check(
                "Testing",
                CheckStatus::Passed,
                "Sandbox integration",
                "End-to-end payments against the provider sandbox",
                "Pass",
                "None",
                "N/A",
            ),
            check(
                "Dependencies",
                CheckStatus::Warning,
                "Client library version",
                "Provider SDK is on a supported release",
                "Deprecated minor",
                "Upgrade the SDK to the current minor release",
                "N/A",
            ),
        ],
    );

    metrics
}

fn builtin_accounts() -> Vec<MockAccount> {
    let account = |username: &str, name: &str, role| MockAccount {
        username: username.to_string(),
        password: "admin".to_string(),
        name: name.to_string(),
        role,
        email: format!("{}@company.com", username),
    };

    vec![
        account("admin", "System Administrator", Role::Admin),
        account("boss", "Boss", Role::Approver),
        account("kevin", "Kevin", Role::Requester),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CrId;
    use std::io::Write;

    const SAMPLE: &str = r#"
[[change_requests]]
id = "CHG2001"
title = "Rotate TLS certificates"
description = "Renew edge certificates before expiry"
requester = "Kevin"
createdAt = "2024-01-10T00:00:00Z"
status = "pending"
priority = "high"

[[change_requests]]
id = 2002
title = "Bump base image"
description = "Move services to the new base image"
requester = "Boss"
createdAt = "2024-01-11T00:00:00Z"
status = "approved"

[[metrics.CHG2001]]
group = "Security"
status = "1"
title = "Certificate chain"
description = "Chain validates against the internal root"
result = "Pass"
remediation = "None"

[[accounts]]
username = "alice"
password = "secret"
name = "Alice"
role = "approver"
email = "alice@company.com"
"#;

    #[test]
    fn test_builtin_accounts_match_demo_logins() {
        let accounts = builtin_accounts();
        let names: Vec<(&str, Role)> = accounts
            .iter()
            .map(|a| (a.username.as_str(), a.role))
            .collect();
        assert_eq!(
            names,
            vec![
                ("admin", Role::Admin),
                ("boss", Role::Approver),
                ("kevin", Role::Requester)
            ]
        );
    }

    #[test]
    fn test_parse_fixture_document() {
        let set = FixtureSet::from_toml_str(SAMPLE).unwrap();
        assert_eq!(set.change_requests.len(), 2);
        assert_eq!(set.change_requests[0].id, CrId::Tagged("CHG2001".into()));
        assert_eq!(set.change_requests[1].id, CrId::Numeric(2002));
        assert_eq!(set.metrics["CHG2001"][0].link, "N/A");
        assert_eq!(set.accounts[0].role, Role::Approver);

        let catalog = set.catalog().unwrap();
        assert_eq!(catalog.metrics_for("CHG2001").len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let set = FixtureSet::load(file.path()).unwrap();
        assert_eq!(set.account_table().len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = FixtureSet::load("/nonexistent/crgate-fixtures.toml");
        assert!(matches!(err, Err(crate::CrgateError::IoError(_))));
    }

    #[test]
    fn test_invalid_document() {
        let err = FixtureSet::from_toml_str("change_requests = 3");
        assert!(matches!(err, Err(crate::CrgateError::ParseError(_))));
    }
}
