//! Sberpay error types.

use thiserror::Error;

/// Errors that can occur while talking to the gateway or checking callbacks.
///
/// A checksum that does not match is *not* an error: verification returns
/// `Ok(false)` so callers can apply their own rejection policy.
#[derive(Debug, Error)]
pub enum SberpayError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Gateway public key could not be parsed.
    #[error("Invalid gateway public key: {0}")]
    InvalidPublicKey(String),

    /// Checksum is not a valid hex string.
    #[error("Invalid checksum encoding: {0}")]
    InvalidChecksumEncoding(String),

    /// Callback payload carries no `checksum` field (fail-closed).
    #[error("Callback checksum missing")]
    ChecksumMissing,

    /// Caller supplied a field that the transport injects itself.
    #[error("Request already contains reserved credential field: {field}")]
    CredentialConflict {
        /// The conflicting field name (`userName` or `password`).
        field: String,
    },

    /// Amount cannot be expressed in minor units.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// No endpoint is configured for the requested operation.
    #[error("No endpoint configured for operation: {0}")]
    UnknownEndpoint(String),

    /// HTTP transport error communicating with the gateway.
    #[error("Gateway transport error: {0}")]
    Transport(String),

    /// Failed to parse a gateway response or callback.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Outcome logging was invoked without a configured destination.
    #[error("Outcome logger has not been initialized")]
    LoggerNotInitialized,

    /// Outcome log I/O error.
    #[error("Log I/O error: {0}")]
    LogIO(String),
}
