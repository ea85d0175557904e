//! Callback verification pipeline.
//!
//! 1. Require a `checksum` field (fail-closed)
//! 2. Build the canonical string from the remaining fields
//! 3. Verify the RSA/SHA-512 signature against the gateway key

use crate::crypto::verify::{decode_public_key, verify_rsa_sha512};
use crate::protocol::models::CallbackPayload;
use crate::SberpayError;
use rsa::RsaPublicKey;

/// Verifies gateway callbacks against the gateway's public key.
///
/// The key is parsed once at construction and never changes.
#[derive(Debug, Clone)]
pub struct CallbackVerifier {
    public_key: RsaPublicKey,
}

impl CallbackVerifier {
    /// Create a verifier from a PEM-encoded gateway public key.
    ///
    /// # Errors
    /// `InvalidPublicKey` if the PEM cannot be parsed.
    pub fn from_pem(public_key_pem: &str) -> Result<Self, SberpayError> {
        Ok(Self {
            public_key: decode_public_key(public_key_pem)?,
        })
    }

    /// Create a verifier from an already decoded key.
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self { public_key }
    }

    /// Verify a hex checksum over an already built canonical string.
    pub fn verify_canonical(&self, canonical: &str, checksum_hex: &str) -> Result<bool, SberpayError> {
        verify_rsa_sha512(&self.public_key, canonical.as_bytes(), checksum_hex)
    }

    /// Verify a callback payload carrying its own `checksum` field.
    ///
    /// # Returns
    /// * `Ok(true)` - Callback is authentic
    /// * `Ok(false)` - Checksum does not match the payload
    /// * `Err(ChecksumMissing)` - Payload has no checksum
    /// * `Err(InvalidChecksumEncoding)` - Checksum is not hex
    pub fn verify(&self, payload: &CallbackPayload) -> Result<bool, SberpayError> {
        let checksum = payload.checksum().ok_or(SberpayError::ChecksumMissing)?;
        let canonical = payload.canonical_string();

        let verified = self.verify_canonical(&canonical, checksum)?;
        if verified {
            tracing::debug!(md_order = ?payload.md_order(), "callback checksum verified");
        } else {
            tracing::warn!(
                md_order = ?payload.md_order(),
                order_number = ?payload.order_number(),
                "callback checksum mismatch"
            );
        }
        Ok(verified)
    }

    /// Decode a callback query string and verify it.
    pub fn verify_query(&self, query: &str) -> Result<bool, SberpayError> {
        self.verify(&CallbackPayload::from_query(query))
    }
}
