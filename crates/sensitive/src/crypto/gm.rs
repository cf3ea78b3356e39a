//! GM suite: SM4-CBC with PKCS#7 padding, authenticated by HMAC-SM3 over the
//! ciphertext (encrypt-then-MAC).

use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sm3::Sm3;
use sm4::Sm4;
use zeroize::Zeroize;

use super::{
    envelope::EncryptionResult,
    mode::{AlgorithmMode, GM_IV_LEN},
    strategy::{check_result, random_nonce, EncryptionStrategy},
};
use crate::error::{EnvelopeError, Result};
use crate::keys::{KeyKind, KeyPair, SecretKey};

type Sm4CbcEnc = cbc::Encryptor<Sm4>;
type Sm4CbcDec = cbc::Decryptor<Sm4>;
type HmacSm3 = Hmac<Sm3>;

/// Byte length of an HMAC-SM3 tag.
pub const MAC_LEN: usize = 32;

const MODE: AlgorithmMode = AlgorithmMode::Gm;

/// SM4-CBC + HMAC-SM3. Needs both an encryption key and a MAC key.
///
/// The MAC covers the ciphertext only. The IV is not authenticated, so a
/// modified IV decrypts without error to a plaintext whose first block
/// differs from the original.
#[derive(Debug, Default, Clone, Copy)]
pub struct GmStrategy;

impl GmStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl EncryptionStrategy for GmStrategy {
    fn algorithm_mode(&self) -> AlgorithmMode {
        MODE
    }

    fn encrypt(&self, plaintext: &str, keys: &KeyPair) -> Result<EncryptionResult> {
        let enc_key = keys.require(MODE, KeyKind::GmEncryption)?;
        let mac_key = keys.require(MODE, KeyKind::GmMac)?;

        let iv: [u8; GM_IV_LEN] = random_nonce();
        let ciphertext = Sm4CbcEnc::new_from_slices(enc_key.as_bytes(), &iv)
            .map_err(|_| invalid_enc_key())?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let tag = keyed_mac(mac_key)?
            .chain_update(&ciphertext)
            .finalize()
            .into_bytes()
            .to_vec();

        Ok(EncryptionResult::new(MODE, iv.to_vec(), ciphertext, tag))
    }

    fn decrypt(&self, result: &EncryptionResult, keys: &KeyPair) -> Result<String> {
        check_result(MODE, result)?;
        let enc_key = keys.require(MODE, KeyKind::GmEncryption)?;
        let mac_key = keys.require(MODE, KeyKind::GmMac)?;

        // Constant-time tag check; nothing is decrypted unless it passes.
        keyed_mac(mac_key)?
            .chain_update(result.ciphertext())
            .verify_slice(result.tag())
            .map_err(|_| EnvelopeError::IntegrityViolation(MODE))?;

        let plaintext = Sm4CbcDec::new_from_slices(enc_key.as_bytes(), result.nonce())
            .map_err(|_| invalid_enc_key())?
            .decrypt_padded_vec_mut::<Pkcs7>(result.ciphertext())
            .map_err(|_| EnvelopeError::Cipher(MODE))?;

        String::from_utf8(plaintext).map_err(|e| {
            e.into_bytes().zeroize();
            EnvelopeError::Cipher(MODE)
        })
    }
}

fn keyed_mac(key: &SecretKey) -> Result<HmacSm3> {
    <HmacSm3 as Mac>::new_from_slice(key.as_bytes()).map_err(|_| EnvelopeError::InvalidKeyLength {
        kind: KeyKind::GmMac,
        expected: KeyKind::GmMac.len(),
    })
}

fn invalid_enc_key() -> EnvelopeError {
    EnvelopeError::InvalidKeyLength {
        kind: KeyKind::GmEncryption,
        expected: KeyKind::GmEncryption.len(),
    }
}
