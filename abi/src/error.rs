//! ABI loading and decoding errors.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AbiError>;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("Failed to read ABI file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse ABI JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid type expression {expr:?}: {reason}")]
    InvalidTypeExpr { expr: String, reason: String },

    #[error("type {name} is not defined in the ABI")]
    UnknownType { name: String },

    #[error("type {name} uses an ABI definition kind this decoder does not support")]
    UnsupportedType { name: String },

    #[error("endpoint {name} is not defined in the ABI")]
    UnknownEndpoint { name: String },

    #[error("endpoint {name} is read-only and cannot be called in a transaction")]
    ReadOnlyEndpoint { name: String },

    /// `expected` reads "3" or "at least 1".
    #[error("endpoint {endpoint} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        endpoint: String,
        expected: String,
        actual: usize,
    },

    #[error("return data has no value at index {index}")]
    MissingReturnValue { index: usize },

    #[error("{extra} return value(s) left over after decoding all outputs")]
    UnexpectedReturnData { extra: usize },

    #[error("{ty} is multi-valued and cannot be decoded from a single value")]
    NotSingleValue { ty: String },

    #[error("truncated {ty}: needed {needed} byte(s), {remaining} left")]
    Truncated {
        ty: String,
        needed: usize,
        remaining: usize,
    },

    #[error("{count} trailing byte(s) after {ty}")]
    TrailingBytes { ty: String, count: usize },

    #[error("{ty} must be {expected} byte(s), got {actual}")]
    InvalidLength {
        ty: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid {ty}: {reason}")]
    InvalidValue { ty: String, reason: String },

    #[error("enum {enum_name} has no variant with discriminant {discriminant}")]
    UnknownVariant { enum_name: String, discriminant: u8 },
}
