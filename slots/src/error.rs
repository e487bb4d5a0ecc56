//! Error types for slot operations.
//!
//! Normalization never fails, so nothing here describes malformed input.
//! `NoApprovedRelease` is a business outcome rather than a fault; callers map
//! it to "not found" and must not log it as an error.

use thiserror::Error;

use crate::address::AddressError;

/// Result alias for slot operations.
pub type Result<T> = std::result::Result<T, SlotsError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotsError {
    #[error("no approved release found")]
    NoApprovedRelease,

    #[error("invalid {function} call: {reason}")]
    InvalidCall {
        function: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Address(#[from] AddressError),
}
