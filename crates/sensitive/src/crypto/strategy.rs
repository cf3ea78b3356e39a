//! The [`EncryptionStrategy`] capability shared by every suite.

use std::fmt;

use rand::{rngs::OsRng, RngCore};

use super::{envelope::EncryptionResult, mode::AlgorithmMode};
use crate::error::{EnvelopeError, Result};
use crate::keys::KeyPair;

/// One suite's encrypt/decrypt algorithm.
///
/// Every implementation takes the same [`KeyPair`] so callers can treat the
/// suites uniformly; a suite that has no use for the MAC key ignores it.
pub trait EncryptionStrategy: Send + Sync + fmt::Debug {
    /// The suite this strategy implements. Fixed per implementation.
    fn algorithm_mode(&self) -> AlgorithmMode;

    /// Encrypt UTF-8 `plaintext` under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// [`EnvelopeError::MissingKeyMaterial`] if a key the suite needs is absent,
    /// [`EnvelopeError::InvalidKeyLength`] if one is the wrong size.
    fn encrypt(&self, plaintext: &str, keys: &KeyPair) -> Result<EncryptionResult>;

    /// Authenticate and decrypt `result`.
    ///
    /// Authentication happens before any plaintext is produced; a failed tag
    /// yields [`EnvelopeError::IntegrityViolation`] and nothing else.
    fn decrypt(&self, result: &EncryptionResult, keys: &KeyPair) -> Result<String>;

    /// Returns `true` if `wire` is an envelope tagged with this suite's code.
    ///
    /// Reads only the algorithm field and never fails.
    fn supports(&self, wire: &str) -> bool {
        EncryptionResult::peek_mode(wire).is_ok_and(|mode| mode == self.algorithm_mode())
    }
}

/// Reject results produced by another suite before touching any key.
pub(crate) fn check_result(mode: AlgorithmMode, result: &EncryptionResult) -> Result<()> {
    if result.mode() != mode {
        return Err(EnvelopeError::MalformedEnvelope(
            "envelope was produced by a different suite",
        ));
    }
    if result.nonce().len() != mode.nonce_len() {
        return Err(EnvelopeError::MalformedEnvelope(
            "nonce length does not match the algorithm",
        ));
    }
    Ok(())
}

/// Draw a nonce from the OS CSPRNG.
pub(crate) fn random_nonce<const N: usize>() -> [u8; N] {
    let mut nonce = [0u8; N];
    OsRng.fill_bytes(&mut nonce);
    nonce
}
