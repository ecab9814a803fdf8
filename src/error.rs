//! Error types for dns-groups
//!
//! Every stage of the groups pipeline reports its first failure through
//! [`Error`]. Each variant maps to the [`Stage`] that produced it so the
//! command line can tell the operator where the run stopped.

use std::fmt;
use thiserror::Error;

/// Result type alias for dns-groups operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dns-groups
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or transport-setup error (bad address, unreadable or
    /// malformed certificate material). Reported before any query is sent.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "ca_cert_path")
        key: Option<String>,
    },

    /// Network-level failure reaching the API (DNS, refused, TLS handshake,
    /// timeout, or a broken body stream)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with something other than 200 OK
    #[error("unable to retrieve groups: Got {status} {reason}")]
    Api {
        /// Numeric HTTP status code
        status: u16,
        /// Canonical reason phrase for the status, empty if unknown
        reason: String,
    },

    /// The response body could not be decoded into group records
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Writing the rendered output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding a stream of JSON records
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A value in the stream was not valid JSON or did not have the shape of
    /// a record
    #[error("record {index} at byte {offset} is malformed: {source}")]
    Malformed {
        /// 0-based position of the offending value in the stream
        index: usize,
        /// Absolute byte offset of the start of the offending value
        offset: u64,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The stream ended in the middle of a value
    #[error("record {index} at byte {offset} is truncated ({pending} bytes left undecoded)")]
    Truncated {
        /// 0-based position of the incomplete value in the stream
        index: usize,
        /// Absolute byte offset of the start of the incomplete value
        offset: u64,
        /// Number of bytes buffered but never decoded
        pending: usize,
    },

    /// The decoder already failed once and refuses further input
    #[error("decoder stopped after an earlier error at record {index}")]
    Poisoned {
        /// Index of the record that poisoned the decoder
        index: usize,
    },
}

impl DecodeError {
    /// Index of the record this error refers to
    pub fn index(&self) -> usize {
        match self {
            DecodeError::Malformed { index, .. }
            | DecodeError::Truncated { index, .. }
            | DecodeError::Poisoned { index } => *index,
        }
    }
}

/// Pipeline stage that produced an error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Configuration and secured-client construction
    Setup,
    /// Sending the request or reading the body
    Transport,
    /// Checking the response status
    Api,
    /// Decoding the record stream
    Decode,
    /// Writing the table
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Transport => "transport",
            Stage::Api => "api",
            Stage::Decode => "decode",
            Stage::Render => "render",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a configuration error tied to a configuration key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create an API error from a response status
    pub fn api(status: reqwest::StatusCode) -> Self {
        Error::Api {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// The pipeline stage this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            Error::Config { .. } => Stage::Setup,
            Error::Transport(_) => Stage::Transport,
            Error::Api { .. } => Stage::Api,
            Error::Decode(_) => Stage::Decode,
            Error::Io(_) => Stage::Render,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Transport(e) if e.is_timeout() => "transport_timeout",
            Error::Transport(e) if e.is_connect() => "transport_connect",
            Error::Transport(_) => "transport_error",
            Error::Api { .. } => "api_error",
            Error::Decode(DecodeError::Malformed { .. }) => "malformed_record",
            Error::Decode(DecodeError::Truncated { .. }) => "truncated_record",
            Error::Decode(DecodeError::Poisoned { .. }) => "decoder_poisoned",
            Error::Io(_) => "io_error",
        }
    }
}
