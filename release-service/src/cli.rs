//! Command-line surface of `device-release-service`.

use clap::{Parser, Subcommand};
use device_release_slots::ReleaseAction;

use crate::config::ServiceConfig;

#[derive(Debug, Parser)]
#[command(name = "device-release-service", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: ServiceConfig,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service (default).
    Serve,
    /// Print every slot in the registry as JSON.
    Slots,
    /// Print the latest approved release as JSON; exits with 2 when there is none.
    Latest,
    /// Check a release transaction against the ABI and print it for signing.
    EncodeCall {
        #[command(subcommand)]
        call: CallCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum CallCommand {
    /// Propose a new release.
    Propose {
        version: String,
        hash: String,
        url: String,
    },
    /// Approve a proposed release.
    Approve { version: String },
    /// Reject a proposed release.
    Reject { version: String },
}

impl From<CallCommand> for ReleaseAction {
    fn from(call: CallCommand) -> Self {
        match call {
            CallCommand::Propose { version, hash, url } => Self::Propose { version, hash, url },
            CallCommand::Approve { version } => Self::Approve { version },
            CallCommand::Reject { version } => Self::Reject { version },
        }
    }
}
