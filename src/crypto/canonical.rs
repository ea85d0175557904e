//! Canonical string construction for callback checksums.
//!
//! The gateway signs callbacks over a string built from every callback field
//! except the checksum itself:
//! ```text
//! mdOrder;6d7dd3386fe;operation;deposited;orderNumber;10747;status;1;
//! ```
//! Keys are sorted byte-wise and each pair contributes `key;value;`.

use std::fmt::Display;

/// Fields that never take part in the signed string.
pub const EXCLUDED_FIELDS: [&str; 2] = ["checksum", "sign_alias"];

/// Whether a field is part of the signed string.
pub fn is_signed_field(key: &str) -> bool {
    !EXCLUDED_FIELDS.contains(&key)
}

/// Build the canonical string for a set of callback fields.
///
/// # Arguments
/// * `fields` - Callback fields in any order. Values are rendered with
///   their `Display` implementation.
///
/// # Returns
/// The canonical string. An empty field set yields an empty string.
pub fn canonicalize<I, K, V>(fields: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let mut pairs: Vec<(K, V)> = fields
        .into_iter()
        .filter(|(key, _)| is_signed_field(key.as_ref()))
        .collect();

    // Stable sort keeps repeated keys in arrival order
    pairs.sort_by(|(a, _), (b, _)| str::cmp(a.as_ref(), b.as_ref()));

    let mut canonical = String::new();
    for (key, value) in pairs {
        canonical.push_str(key.as_ref());
        canonical.push(';');
        canonical.push_str(&value.to_string());
        canonical.push(';');
    }
    canonical
}
