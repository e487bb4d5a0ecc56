//! Contract calls that change release slots.
//!
//! Proposing, approving and rejecting a release are the same operation with
//! different endpoints and arguments: build a `ContractCall`, attach the
//! receiver, gas limit and display messages, and hand the result to whatever
//! signs and broadcasts transactions.

use serde::Serialize;

use crate::address::Address;
use crate::error::{Result, SlotsError};

pub const PROPOSE_RELEASE_ENDPOINT: &str = "proposeRelease";
pub const APPROVE_RELEASE_ENDPOINT: &str = "approveRelease";
pub const REJECT_RELEASE_ENDPOINT: &str = "rejectRelease";

pub const PROPOSE_GAS_LIMIT: u64 = 10_000_000;
pub const VOTE_GAS_LIMIT: u64 = 8_000_000;

/// Messages a wallet shows while a transaction is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxMessages {
    pub processing_message: String,
    pub error_message: String,
    pub success_message: String,
}

impl TxMessages {
    pub fn for_function(function: &str) -> Self {
        Self {
            processing_message: format!("Processing {function} transaction"),
            error_message: format!("An error has occurred during {function}"),
            success_message: format!("{function} transaction successful"),
        }
    }
}

/// An endpoint name plus its top-level encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub function: String,
    pub args: Vec<Vec<u8>>,
}

impl ContractCall {
    pub fn new(function: impl Into<String>, args: Vec<Vec<u8>>) -> Self {
        Self {
            function: function.into(),
            args,
        }
    }

    /// Transaction data field: `function@hex(arg)@hex(arg)...`.
    pub fn data_payload(&self) -> String {
        let mut payload = self.function.clone();
        for arg in &self.args {
            payload.push('@');
            payload.push_str(&hex::encode(arg));
        }
        payload
    }
}

/// A release-slot state change requested by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseAction {
    Propose {
        version: String,
        hash: String,
        url: String,
    },
    Approve {
        version: String,
    },
    Reject {
        version: String,
    },
}

impl ReleaseAction {
    pub fn function(&self) -> &'static str {
        match self {
            Self::Propose { .. } => PROPOSE_RELEASE_ENDPOINT,
            Self::Approve { .. } => APPROVE_RELEASE_ENDPOINT,
            Self::Reject { .. } => REJECT_RELEASE_ENDPOINT,
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::Propose { .. } => PROPOSE_GAS_LIMIT,
            Self::Approve { .. } | Self::Reject { .. } => VOTE_GAS_LIMIT,
        }
    }

    /// Encode the arguments. Every argument must be non-blank.
    pub fn to_call(&self) -> Result<ContractCall> {
        let function = self.function();
        let fields: Vec<(&str, &str)> = match self {
            Self::Propose { version, hash, url } => {
                vec![
                    ("version", version.as_str()),
                    ("hash", hash.as_str()),
                    ("url", url.as_str()),
                ]
            }
            Self::Approve { version } | Self::Reject { version } => {
                vec![("version", version.as_str())]
            }
        };

        let mut args = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(SlotsError::InvalidCall {
                    function,
                    reason: format!("{name} must not be empty"),
                });
            }
            args.push(value.as_bytes().to_vec());
        }
        Ok(ContractCall::new(function, args))
    }

    /// Everything an external signer needs to build the transaction.
    pub fn prepare(&self, receiver: Address) -> Result<PreparedCall> {
        let call = self.to_call()?;
        Ok(PreparedCall {
            data: call.data_payload(),
            function: call.function,
            receiver,
            gas_limit: self.gas_limit(),
            value: 0,
            messages: TxMessages::for_function(self.function()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedCall {
    pub function: String,
    pub receiver: Address,
    pub data: String,
    pub gas_limit: u64,
    pub value: u64,
    pub messages: TxMessages,
}
