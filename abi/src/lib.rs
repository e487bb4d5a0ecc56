//! Contract ABI support for the device release registry.
//!
//! Loads the JSON ABI the contract build emits, checks that every type it
//! mentions can be resolved, and decodes raw query return data into
//! [`AbiValue`] trees using the ABI's type definitions.
//!
//! Only decoding is needed by the service: call arguments for release
//! endpoints are plain buffers, whose top-level encoding is the bytes
//! themselves.

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod codec;
pub mod error;
pub mod schema;
pub mod types;
pub mod value;

pub use error::{AbiError, Result};
pub use schema::{Abi, Endpoint, FieldDef, Input, Output, TypeDef, VariantDef};
pub use types::TypeExpr;
pub use value::AbiValue;
