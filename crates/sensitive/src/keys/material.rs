//! Key kinds, zeroizing key buffers, and per-call key pairs.

use std::fmt;

use base64::Engine as _;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{envelope::WIRE_BASE64, AlgorithmMode};
use crate::error::{EnvelopeError, Result};

/// Logical key identifier: which suite a key belongs to and what it is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    /// 256-bit ChaCha20-Poly1305 key.
    ModernEncryption,
    /// 128-bit SM4 key.
    GmEncryption,
    /// 256-bit HMAC-SM3 key.
    GmMac,
}

impl KeyKind {
    pub const ALL: [KeyKind; 3] = [KeyKind::ModernEncryption, KeyKind::GmEncryption, KeyKind::GmMac];

    /// Stable identifier, usable as a cache or configuration key.
    pub const fn id(self) -> &'static str {
        match self {
            KeyKind::ModernEncryption => "MODERN_ENCRYPTION",
            KeyKind::GmEncryption => "GM_ENCRYPTION",
            KeyKind::GmMac => "GM_MAC",
        }
    }

    /// Key length in bytes.
    pub const fn len(self) -> usize {
        match self {
            KeyKind::ModernEncryption => 32,
            KeyKind::GmEncryption => 16,
            KeyKind::GmMac => 32,
        }
    }

    pub const fn mode(self) -> AlgorithmMode {
        match self {
            KeyKind::ModernEncryption => AlgorithmMode::Modern,
            KeyKind::GmEncryption | KeyKind::GmMac => AlgorithmMode::Gm,
        }
    }

    /// The kinds a suite needs, encryption key first.
    pub const fn required_by(mode: AlgorithmMode) -> &'static [KeyKind] {
        match mode {
            AlgorithmMode::Gm => &[KeyKind::GmEncryption, KeyKind::GmMac],
            AlgorithmMode::Modern => &[KeyKind::ModernEncryption],
        }
    }

    /// # Errors
    ///
    /// Returns [`EnvelopeError::UnknownKeyKind`] if `id` names no key kind.
    pub fn from_id(id: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| EnvelopeError::UnknownKeyKind(id.to_owned()))
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Symmetric key bytes, overwritten with zeroes on drop.
///
/// Clones are independent buffers and are zeroized separately.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Wrap raw key bytes for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidKeyLength`] if `bytes` is not
    /// [`KeyKind::len`] long.
    pub fn new(kind: KeyKind, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != kind.len() {
            return Err(EnvelopeError::InvalidKeyLength {
                kind,
                expected: kind.len(),
            });
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Decode a base64url key (padding optional).
    pub fn from_base64(kind: KeyKind, encoded: &str) -> Result<Self> {
        let mut raw = WIRE_BASE64
            .decode(encoded.trim())
            .map_err(|_| EnvelopeError::InvalidKeyEncoding(kind))?;
        let key = Self::new(kind, &raw);
        raw.zeroize();
        key
    }

    pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// The keys handed to a strategy for one encrypt or decrypt call.
///
/// The Modern suite only reads the encryption key; the GM suite needs both.
#[derive(Clone, Debug, Default)]
pub struct KeyPair {
    encryption: Option<SecretKey>,
    mac: Option<SecretKey>,
}

impl KeyPair {
    pub fn new(encryption: Option<SecretKey>, mac: Option<SecretKey>) -> Self {
        Self { encryption, mac }
    }

    pub fn modern(key: SecretKey) -> Self {
        Self::new(Some(key), None)
    }

    pub fn gm(encryption: SecretKey, mac: SecretKey) -> Self {
        Self::new(Some(encryption), Some(mac))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn encryption_key(&self) -> Option<&SecretKey> {
        self.encryption.as_ref()
    }

    pub fn mac_key(&self) -> Option<&SecretKey> {
        self.mac.as_ref()
    }

    /// Borrow the key of `kind` that `mode` needs, checking its length.
    pub(crate) fn require(&self, mode: AlgorithmMode, kind: KeyKind) -> Result<&SecretKey> {
        let slot = match kind {
            KeyKind::GmMac => self.mac.as_ref(),
            KeyKind::ModernEncryption | KeyKind::GmEncryption => self.encryption.as_ref(),
        };
        let key = slot.ok_or(EnvelopeError::MissingKeyMaterial { mode, kind })?;
        if key.len() != kind.len() {
            return Err(EnvelopeError::InvalidKeyLength {
                kind,
                expected: kind.len(),
            });
        }
        Ok(key)
    }
}
