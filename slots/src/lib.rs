//! Release-slot state model for the device release registry.
//!
//! The release contract keeps one "slot" per proposed release. A slot moves
//! from `PROPOSED` to either `APPROVED` or `REJECTED` as approvers vote. This
//! crate owns everything about those slots that does not need I/O:
//!
//! - the typed raw-response schema a query layer hands over ([`raw`]),
//! - the total normalization into [`SlotRecord`]s ([`normalize`]),
//! - dotted-version ordering ([`version`]),
//! - the per-fetch snapshot and latest-release selection ([`registry`]),
//! - call payloads for proposing, approving and rejecting ([`calls`]).
//!
//! Everything here is pure and synchronous; callers fetch data however they
//! like and pass resolved values in.

pub mod address;
pub mod calls;
pub mod error;
pub mod model;
pub mod normalize;
pub mod raw;
pub mod registry;
pub mod version;

pub use address::{Address, AddressError};
pub use calls::{ContractCall, PreparedCall, ReleaseAction, TxMessages};
pub use error::{Result, SlotsError};
pub use model::{SlotRecord, StatusKind};
pub use normalize::{normalize_item, normalize_slots};
pub use raw::{RawSlot, RawSlotItem, RawStatus, RawValue};
pub use registry::{ReleaseSlotRegistry, StatusCounts, select_latest_approved};
pub use version::{VersionKey, compare_versions};

/// Name of the read-only contract endpoint that lists every slot.
pub const GET_SLOTS_ENDPOINT: &str = "getSlots";
