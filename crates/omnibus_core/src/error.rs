//! # Core Error Types
//!
//! All errors that can occur in the bundle core.
//!
//! Persistence failures are deliberately non-fatal at the bundle level: a
//! record that cannot be decoded costs exactly the offending channel, never
//! the host simulation.

use thiserror::Error;

/// Errors produced while encoding or decoding persisted records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The record was written by a version this codec does not understand.
    #[error("unsupported record version {version}, newest known is {newest}")]
    UnsupportedVersion {
        /// Version found in the record.
        version: u16,
        /// Newest version this codec can read.
        newest: u16,
    },

    /// No codec is registered for the channel kind discriminator.
    #[error("no codec registered for channel kind {0}")]
    UnknownChannelKind(String),

    /// The kind-specific payload could not be decoded.
    #[error("malformed channel payload: {0}")]
    MalformedPayload(String),

    /// A stable block identifier did not resolve against the block registry.
    #[error("unresolved block identifier: {0}")]
    UnresolvedBlock(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors produced while loading the simulation config.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file was not valid TOML for [`crate::config::SimConfig`].
    #[error("invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),
}
