//! Read-only change request catalog

use crate::error::{CrgateError, Result};
use crate::types::{ChangeRequest, MetricCheckResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static METRICS_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^CHG[0-9]+$").expect("valid regex"));

/// True when `segment` has the `CHG<digits>` shape used for metrics lookup
pub fn is_metrics_key(segment: &str) -> bool {
    METRICS_KEY.is_match(segment)
}

/// Fixed, ordered set of change requests plus their metric reports.
///
/// Nothing mutates a catalog after construction; handlers share it behind an
/// `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    requests: Vec<ChangeRequest>,
    metrics: HashMap<String, Vec<MetricCheckResult>>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate identifiers and malformed metric keys
    pub fn new(
        requests: Vec<ChangeRequest>,
        metrics: impl IntoIterator<Item = (String, Vec<MetricCheckResult>)>,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(requests.len());
        for cr in &requests {
            if !seen.insert(cr.id.as_key()) {
                return Err(CrgateError::FixtureError(format!(
                    "duplicate change request id {}",
                    cr.id
                )));
            }
        }

        let metrics: HashMap<_, _> = metrics.into_iter().collect();
        if let Some(bad) = metrics.keys().find(|k| !is_metrics_key(k)) {
            return Err(CrgateError::FixtureError(format!(
                "metrics key {:?} is not of the form CHG<digits>",
                bad
            )));
        }

        Ok(Self { requests, metrics })
    }

    /// All change requests in declaration order
    pub fn list(&self) -> &[ChangeRequest] {
        &self.requests
    }

    /// Metric results for `id`, exact and case-sensitive. Unknown ids yield an
    /// empty slice.
    pub fn metrics_for(&self, id: &str) -> &[MetricCheckResult] {
        self.metrics.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of change requests
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// True when the catalog holds no change requests
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
