use device_release_abi::AbiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

/// Any failure between asking the gateway for slots and holding decoded
/// values. All of these surface to API clients as the same upstream failure.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid gateway URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("gateway request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("gateway returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed gateway response: {reason}")]
    InvalidResponse { reason: String },

    #[error("contract query {function} failed with return code {code}: {message}")]
    ReturnCode {
        function: String,
        code: String,
        message: String,
    },

    #[error("return data entry {index} is not valid base64: {reason}")]
    InvalidReturnData { index: usize, reason: String },

    #[error("failed to decode contract response: {0}")]
    Decode(#[from] AbiError),
}
