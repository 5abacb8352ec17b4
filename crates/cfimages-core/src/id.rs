//! Compact UUID encoding and custom-identifier validation.
//!
//! The service forbids raw UUIDs as caller-supplied image identifiers, so
//! UUIDs that must travel in an identifier slot are re-encoded: the 16 raw
//! bytes are Base64-encoded and the two characters that are unsafe in the
//! target context are substituted (`+` becomes `_`, `/` becomes `~`). The
//! transformation is a byte-level re-encoding and is fully reversible for
//! any RFC 4122 UUID regardless of version.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

/// Maximum length of a custom image identifier.
pub const MAX_CUSTOM_ID_LEN: usize = 1024;

/// Encode a UUID into its compact identifier form.
///
/// The output is 24 characters (Base64 of 16 bytes, padding included) and
/// never contains `+` or `/`.
#[must_use]
pub fn encode(uuid: &Uuid) -> String {
    STANDARD
        .encode(uuid.as_bytes())
        .chars()
        .map(|c| match c {
            '+' => '_',
            '/' => '~',
            c => c,
        })
        .collect()
}

/// Parse a UUID string and encode it into its compact identifier form.
///
/// # Errors
///
/// Returns [`Error::InvalidUuid`] if the input is not a well-formed UUID.
pub fn encode_str(input: &str) -> Result<String> {
    let uuid = Uuid::parse_str(input).map_err(|_| Error::InvalidUuid(input.to_string()))?;
    Ok(encode(&uuid))
}

/// Decode a compact identifier back into the UUID it encodes.
///
/// Inverse of [`encode`]: `decode(&encode(&u))` returns `u` for every UUID.
///
/// # Errors
///
/// Returns [`Error::InvalidCompactId`] if the input is not valid Base64
/// after substitution or does not decode to exactly 16 bytes.
pub fn decode(compact: &str) -> Result<Uuid> {
    let standard: String = compact
        .chars()
        .map(|c| match c {
            '_' => '+',
            '~' => '/',
            c => c,
        })
        .collect();

    let bytes = STANDARD.decode(standard.as_bytes())?;
    Uuid::from_slice(&bytes).map_err(|_| Error::InvalidCompactId(compact.to_string()))
}

/// Validate a caller-supplied custom image identifier.
///
/// The contract is validate-or-fail: `Ok(())` means the identifier is
/// acceptable, every rejection is a distinct error.
///
/// # Errors
///
/// - [`Error::EmptyId`] for the empty string
/// - [`Error::BoundarySlash`] for a leading or trailing `/`
/// - [`Error::UuidCollision`] when the string matches the canonical
///   hyphenated UUID layout (raw UUIDs are reserved by the service; encode
///   them with [`encode`] instead)
/// - [`Error::IdTooLong`] past [`MAX_CUSTOM_ID_LEN`] characters
pub fn validate_custom_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::EmptyId);
    }
    if id.starts_with('/') || id.ends_with('/') {
        return Err(Error::BoundarySlash);
    }
    if is_canonical_uuid(id) {
        return Err(Error::UuidCollision);
    }
    if id.len() > MAX_CUSTOM_ID_LEN {
        return Err(Error::IdTooLong(id.len()));
    }
    Ok(())
}

/// Whether the string matches the canonical 8-4-4-4-12 hyphenated hex
/// layout, case-insensitively.
fn is_canonical_uuid(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}
