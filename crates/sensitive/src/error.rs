//! Error taxonomy for the encryption core.

use thiserror::Error;

use crate::crypto::AlgorithmMode;
use crate::keys::KeyKind;
use crate::mask::SensitiveType;

/// Convenience alias used throughout the encryption core.
pub type Result<T, E = EnvelopeError> = std::result::Result<T, E>;

/// Errors produced while encrypting, decrypting, or parsing envelopes.
///
/// Messages name the failure kind and, where relevant, the algorithm code or
/// key kind involved. They never carry plaintext, key bytes, nonces, or tags.
/// None of these are retried internally: each one needs a different key or
/// corrected input before the same call can succeed.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The algorithm code is not one of the known suite codes.
    #[error("unknown algorithm code: {0}")]
    UnknownAlgorithm(String),

    /// The key-kind id is not one of the known key kinds.
    #[error("unknown key kind: {0}")]
    UnknownKeyKind(String),

    /// A key that the suite requires was not supplied.
    #[error("missing {kind} key for {mode} suite")]
    MissingKeyMaterial { mode: AlgorithmMode, kind: KeyKind },

    /// Supplied key material has the wrong length for its kind.
    #[error("invalid {kind} key length: expected {expected} bytes")]
    InvalidKeyLength { kind: KeyKind, expected: usize },

    /// Encoded key material could not be decoded.
    #[error("invalid {0} key encoding")]
    InvalidKeyEncoding(KeyKind),

    /// The wire string is not a well-formed envelope.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),

    /// Authentication failed: the data was tampered with or the key is wrong.
    #[error("integrity check failed for {0} envelope")]
    IntegrityViolation(AlgorithmMode),

    /// No strategy is registered for the requested suite.
    #[error("no encryption strategy registered for {0}")]
    UnsupportedAlgorithm(AlgorithmMode),

    /// The underlying cipher rejected an operation that passed authentication.
    #[error("{0} cipher operation failed")]
    Cipher(AlgorithmMode),
}

/// Errors produced while validating or masking a value.
///
/// Like [`EnvelopeError`], messages never echo the value being masked.
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("value does not satisfy the {0} validation rule")]
    Rejected(SensitiveType),

    #[error("value is too short to mask: keeping {keep} of {len} characters")]
    TooShort { keep: usize, len: usize },

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid validation pattern")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors produced by the field codec.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Mask(#[from] MaskError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_code_only() {
        let e = EnvelopeError::UnknownAlgorithm("XX".into());
        assert_eq!(e.to_string(), "unknown algorithm code: XX");

        let e = EnvelopeError::UnknownKeyKind("RSA".into());
        assert_eq!(e.to_string(), "unknown key kind: RSA");

        let e = EnvelopeError::IntegrityViolation(AlgorithmMode::Gm);
        assert_eq!(e.to_string(), "integrity check failed for GM envelope");
    }

    #[test]
    fn missing_key_names_kind_and_mode() {
        let e = EnvelopeError::MissingKeyMaterial {
            mode: AlgorithmMode::Gm,
            kind: KeyKind::GmMac,
        };
        assert_eq!(e.to_string(), "missing GM_MAC key for GM suite");
    }

    #[test]
    fn field_error_is_transparent() {
        let e = FieldError::from(MaskError::Rejected(SensitiveType::MobilePhone));
        assert_eq!(
            e.to_string(),
            "value does not satisfy the mobile_phone validation rule"
        );
        let e = FieldError::from(EnvelopeError::MalformedEnvelope("bad"));
        assert_eq!(e.to_string(), "malformed envelope: bad");
    }
}
