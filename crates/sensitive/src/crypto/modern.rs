//! Modern suite: ChaCha20-Poly1305 with a 96-bit random nonce and a 128-bit tag.
//!
//! The AEAD output `ciphertext || tag` is split into the envelope's ciphertext
//! and tag fields, and rejoined in the same order to decrypt.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use zeroize::Zeroize;

use super::{
    envelope::EncryptionResult,
    mode::{AlgorithmMode, MODERN_NONCE_LEN},
    strategy::{check_result, random_nonce, EncryptionStrategy},
};
use crate::error::{EnvelopeError, Result};
use crate::keys::{KeyKind, KeyPair, SecretKey};

/// Byte length of a Poly1305 authentication tag.
pub const TAG_LEN: usize = 16;

const MODE: AlgorithmMode = AlgorithmMode::Modern;

/// ChaCha20-Poly1305. Uses only the encryption key; a MAC key is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModernStrategy;

impl ModernStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl EncryptionStrategy for ModernStrategy {
    fn algorithm_mode(&self) -> AlgorithmMode {
        MODE
    }

    fn encrypt(&self, plaintext: &str, keys: &KeyPair) -> Result<EncryptionResult> {
        let cipher = build_cipher(keys.require(MODE, KeyKind::ModernEncryption)?)?;

        let nonce: [u8; MODERN_NONCE_LEN] = random_nonce();
        let mut sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| EnvelopeError::Cipher(MODE))?;

        let tag = sealed.split_off(sealed.len() - TAG_LEN);
        Ok(EncryptionResult::new(MODE, nonce.to_vec(), sealed, tag))
    }

    fn decrypt(&self, result: &EncryptionResult, keys: &KeyPair) -> Result<String> {
        check_result(MODE, result)?;
        let cipher = build_cipher(keys.require(MODE, KeyKind::ModernEncryption)?)?;

        let mut sealed = Vec::with_capacity(result.ciphertext().len() + result.tag().len());
        sealed.extend_from_slice(result.ciphertext());
        sealed.extend_from_slice(result.tag());

        // The AEAD verifies the tag before releasing any plaintext.
        let plaintext = cipher
            .decrypt(Nonce::from_slice(result.nonce()), sealed.as_slice())
            .map_err(|_| EnvelopeError::IntegrityViolation(MODE))?;

        String::from_utf8(plaintext).map_err(|e| {
            e.into_bytes().zeroize();
            EnvelopeError::Cipher(MODE)
        })
    }
}

fn build_cipher(key: &SecretKey) -> Result<ChaCha20Poly1305> {
    ChaCha20Poly1305::new_from_slice(key.as_bytes()).map_err(|_| EnvelopeError::InvalidKeyLength {
        kind: KeyKind::ModernEncryption,
        expected: KeyKind::ModernEncryption.len(),
    })
}
