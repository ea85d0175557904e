//! RSA PKCS#1 v1.5 / SHA-512 checksum verification.

use crate::SberpayError;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha512};

/// Decode a PEM-encoded RSA public key.
///
/// Accepts both SubjectPublicKeyInfo (`BEGIN PUBLIC KEY`) and PKCS#1
/// (`BEGIN RSA PUBLIC KEY`) encodings.
pub fn decode_public_key(pem: &str) -> Result<RsaPublicKey, SberpayError> {
    let pem = pem.trim();

    if pem.contains("BEGIN RSA PUBLIC KEY") {
        return RsaPublicKey::from_pkcs1_pem(pem)
            .map_err(|e| SberpayError::InvalidPublicKey(format!("PKCS#1: {}", e)));
    }

    RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| SberpayError::InvalidPublicKey(format!("SPKI: {}", e)))
}

/// Decode a hex checksum. Upper and lower case digits are both accepted.
pub fn decode_checksum(checksum_hex: &str) -> Result<Vec<u8>, SberpayError> {
    hex::decode(checksum_hex.to_ascii_lowercase())
        .map_err(|e| SberpayError::InvalidChecksumEncoding(e.to_string()))
}

/// Verify a hex checksum over `data` with the gateway key.
///
/// # Returns
/// * `Ok(true)` - Signature matches
/// * `Ok(false)` - Well-formed signature that does not match
/// * `Err(InvalidChecksumEncoding)` - `checksum_hex` is not hex
pub fn verify_rsa_sha512(
    public_key: &RsaPublicKey,
    data: &[u8],
    checksum_hex: &str,
) -> Result<bool, SberpayError> {
    let signature = decode_checksum(checksum_hex)?;
    let hashed = Sha512::digest(data);

    Ok(public_key
        .verify(Pkcs1v15Sign::new::<Sha512>(), &hashed, &signature)
        .is_ok())
}

/// Decode `public_key_pem` and verify a hex checksum over `data`.
pub fn verify_rsa_sha512_pem(
    public_key_pem: &str,
    data: &[u8],
    checksum_hex: &str,
) -> Result<bool, SberpayError> {
    let public_key = decode_public_key(public_key_pem)?;
    verify_rsa_sha512(&public_key, data, checksum_hex)
}
