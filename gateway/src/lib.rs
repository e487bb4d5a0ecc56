//! Query access to the release registry contract.
//!
//! [`GatewayQueryExecutor`] runs read-only contract functions through a
//! gateway's `vm-values/query` route. [`ContractSlotSource`] uses it to fetch
//! `getSlots`, decodes the result with the contract ABI and reshapes every
//! entry into the raw slot schema that `device_release_slots` normalizes.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod error;
pub mod executor;
pub mod source;

pub use error::{QueryError, Result};
pub use executor::{ContractQueryExecutor, GatewayQueryExecutor};
pub use source::{ContractSlotSource, SlotSource, slot_item};
