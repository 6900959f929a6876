//! Batch approve/reject acknowledgements
//!
//! Batch actions echo what was asked for. They do not touch the catalog and
//! do not check that the ids exist.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Decision applied to a batch of change requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchAction {
    /// Approve
    Approve,
    /// Reject
    Reject,
}

impl BatchAction {
    /// Past-tense verb used in messages
    pub fn verb(&self) -> &'static str {
        match self {
            BatchAction::Approve => "approved",
            BatchAction::Reject => "rejected",
        }
    }

    /// Request/response field naming the actor
    pub fn actor_field(&self) -> &'static str {
        match self {
            BatchAction::Approve => "approvedBy",
            BatchAction::Reject => "rejectedBy",
        }
    }

    /// Response field carrying the action time
    pub fn timestamp_field(&self) -> &'static str {
        match self {
            BatchAction::Approve => "approvedAt",
            BatchAction::Reject => "rejectedAt",
        }
    }

    /// Acknowledge `count` ids acted on by `actor` at `at`
    pub fn acknowledge(self, count: usize, actor: impl Into<String>, at: DateTime<Utc>) -> BatchAcknowledgement {
        BatchAcknowledgement {
            action: self,
            count,
            actor: actor.into(),
            at,
        }
    }
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchAction::Approve => f.write_str("approve"),
            BatchAction::Reject => f.write_str("reject"),
        }
    }
}

/// Actor name used when the request does not supply one
pub const UNKNOWN_ACTOR: &str = "Unknown";

/// Acknowledgement of a batch action.
///
/// Serializes as `{success, message, approvedBy|rejectedBy, approvedAt|rejectedAt}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAcknowledgement {
    /// Action taken
    pub action: BatchAction,
    /// Number of ids in the request
    pub count: usize,
    /// Who acted
    pub actor: String,
    /// When
    pub at: DateTime<Utc>,
}

impl BatchAcknowledgement {
    /// Human-readable summary
    pub fn message(&self) -> String {
        format!(
            "Successfully {} {} change requests",
            self.action.verb(),
            self.count
        )
    }
}

impl Serialize for BatchAcknowledgement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry("message", &self.message())?;
        map.serialize_entry(self.action.actor_field(), &self.actor)?;
        map.serialize_entry(
            self.action.timestamp_field(),
            &self.at.to_rfc3339_opts(SecondsFormat::Micros, true),
        )?;
        map.end()
    }
}
