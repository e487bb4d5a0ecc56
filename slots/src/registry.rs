//! Per-fetch snapshot of release slots.
//!
//! A registry is built from one query result and never updated; the next
//! fetch builds a new one.

use serde::Serialize;

use crate::error::{Result, SlotsError};
use crate::model::{SlotRecord, StatusKind};
use crate::normalize::normalize_slots;
use crate::raw::RawSlotItem;
use crate::version::compare_versions;

/// Number of slots per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub proposed: usize,
    pub approved: usize,
    pub rejected: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.proposed + self.approved + self.rejected + self.unknown
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseSlotRegistry {
    slots: Vec<SlotRecord>,
}

impl ReleaseSlotRegistry {
    /// Normalize a raw query result into a snapshot.
    pub fn from_raw<I>(items: I) -> Self
    where
        I: IntoIterator<Item = RawSlotItem>,
    {
        Self {
            slots: normalize_slots(items),
        }
    }

    pub fn from_records(slots: Vec<SlotRecord>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[SlotRecord] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<SlotRecord> {
        self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn with_status(&self, status: StatusKind) -> impl Iterator<Item = &SlotRecord> {
        self.slots.iter().filter(move |slot| slot.status == status)
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.slots
            .iter()
            .fold(StatusCounts::default(), |mut counts, slot| {
                match slot.status {
                    StatusKind::Proposed => counts.proposed += 1,
                    StatusKind::Approved => counts.approved += 1,
                    StatusKind::Rejected => counts.rejected += 1,
                    StatusKind::Unknown => counts.unknown += 1,
                }
                counts
            })
    }

    /// First slot whose version label matches exactly.
    pub fn find_version(&self, version: &str) -> Option<&SlotRecord> {
        self.slots.iter().find(|slot| slot.version == version)
    }

    /// Newest approved release; see [`select_latest_approved`].
    pub fn latest_approved(&self) -> Result<&SlotRecord> {
        select_latest_approved(&self.slots)
    }
}

/// Pick the approved slot with the highest version.
///
/// Among approved slots with equal versions the one that appears first in
/// `slots` wins. With no approved slot at all the result is
/// [`SlotsError::NoApprovedRelease`].
pub fn select_latest_approved(slots: &[SlotRecord]) -> Result<&SlotRecord> {
    // `compare_versions` is descending, so the minimum is the newest release
    // and `min_by` keeps the first of equal elements.
    slots
        .iter()
        .filter(|slot| slot.is_approved())
        .min_by(|a, b| compare_versions(&a.version, &b.version))
        .ok_or(SlotsError::NoApprovedRelease)
}
