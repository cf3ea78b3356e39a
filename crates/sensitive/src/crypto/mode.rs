//! [`AlgorithmMode`]: the closed set of supported cryptographic suites.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EnvelopeError, Result};

/// Byte length of the GM suite's SM4-CBC initialisation vector.
pub const GM_IV_LEN: usize = 16;

/// Byte length of the Modern suite's ChaCha20-Poly1305 nonce.
pub const MODERN_NONCE_LEN: usize = 12;

/// A cryptographic suite, identified on the wire by a short stable code.
///
/// The codes are part of the persisted envelope format. Changing what a code
/// means would make every stored envelope under that code undecodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlgorithmMode {
    /// Chinese national standard suite: SM4-CBC with HMAC-SM3 (encrypt-then-MAC).
    Gm,
    /// ChaCha20-Poly1305 AEAD.
    Modern,
}

impl AlgorithmMode {
    /// Every supported suite, in code order.
    pub const ALL: [AlgorithmMode; 2] = [AlgorithmMode::Gm, AlgorithmMode::Modern];

    /// The stable wire code for this suite.
    pub const fn code(self) -> &'static str {
        match self {
            AlgorithmMode::Gm => "GM",
            AlgorithmMode::Modern => "MODERN",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            AlgorithmMode::Gm => "GM national standard (SM4-CBC + HMAC-SM3)",
            AlgorithmMode::Modern => "Modern AEAD (ChaCha20-Poly1305)",
        }
    }

    /// Canonical name of the suite's cipher.
    pub const fn encryption_algorithm(self) -> &'static str {
        match self {
            AlgorithmMode::Gm => "SM4/CBC/PKCS7Padding",
            AlgorithmMode::Modern => "ChaCha20-Poly1305",
        }
    }

    /// Canonical name of the suite's integrity mechanism.
    pub const fn integrity_algorithm(self) -> &'static str {
        match self {
            AlgorithmMode::Gm => "HMAC-SM3",
            AlgorithmMode::Modern => "Poly1305",
        }
    }

    /// Length of the per-encryption nonce/IV carried in the envelope.
    pub const fn nonce_len(self) -> usize {
        match self {
            AlgorithmMode::Gm => GM_IV_LEN,
            AlgorithmMode::Modern => MODERN_NONCE_LEN,
        }
    }

    /// Look a suite up by its exact wire code.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::UnknownAlgorithm`] when no suite has this code.
    /// Matching is exact: no case folding, no trimming.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.code() == code)
            .ok_or_else(|| EnvelopeError::UnknownAlgorithm(code.to_owned()))
    }
}

impl fmt::Display for AlgorithmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AlgorithmMode {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

impl Serialize for AlgorithmMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for AlgorithmMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_code(&code).map_err(serde::de::Error::custom)
    }
}
