//! Normalized slot records.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lifecycle state of a release slot.
///
/// `Unknown` is the fallback for any tag the contract reports that is not one
/// of the three recognized names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    Proposed,
    Approved,
    Rejected,
    Unknown,
}

impl StatusKind {
    /// Map a reported status tag. Matching is case-sensitive and total.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(Self::Unknown)
    }
}

/// One release proposal as reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub version: String,
    pub hash: String,
    pub url: String,
    pub status: StatusKind,
    #[serde(default)]
    pub status_fields: Vec<String>,
    #[serde(default)]
    pub approvals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl SlotRecord {
    /// A record with the given version and status and every other field empty.
    pub fn new(version: impl Into<String>, status: StatusKind) -> Self {
        Self {
            version: version.into(),
            hash: String::new(),
            url: String::new(),
            status,
            status_fields: Vec::new(),
            approvals: Vec::new(),
            creator: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == StatusKind::Approved
    }
}
