//! [`EncryptionResult`]: the immutable envelope value and its wire format.
//!
//! ```text
//! _mask|<code>|<base64url(nonce)>|<base64url(ciphertext)>|<base64url(tag)>|<display mask>
//! ```
//!
//! Six `|`-separated fields. The last one is free text reserved for a display
//! mask and may be empty. Because fields are located by splitting on `|`, a
//! mask containing `|` would shift the field count; [`EncryptionResult::with_mask`]
//! refuses such masks instead of emitting an unparseable envelope.

use std::{fmt, str::FromStr};

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use super::mode::AlgorithmMode;
use crate::error::{EnvelopeError, Result};

/// Literal first field of every envelope.
pub const SENTINEL: &str = "_mask";

/// Field separator.
pub const DELIMITER: char = '|';

const FIELD_COUNT: usize = 6;

/// URL-safe base64 that never pads on encode and accepts either form on
/// decode, so envelopes written with padding still parse.
pub(crate) const WIRE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One encrypted value: suite, nonce/IV, ciphertext, and authentication tag.
///
/// Only produced by a strategy's `encrypt` or by [`EncryptionResult::parse`].
/// The nonce length always matches [`AlgorithmMode::nonce_len`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionResult {
    mode: AlgorithmMode,
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

impl EncryptionResult {
    pub(crate) fn new(
        mode: AlgorithmMode,
        nonce: Vec<u8>,
        ciphertext: Vec<u8>,
        tag: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(nonce.len(), mode.nonce_len());
        Self {
            mode,
            nonce,
            ciphertext,
            tag,
        }
    }

    pub fn mode(&self) -> AlgorithmMode {
        self.mode
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    /// Encode to the wire format with an empty display-mask field.
    pub fn to_wire(&self) -> String {
        format!(
            "{SENTINEL}|{}|{}|{}|{}|",
            self.mode.code(),
            WIRE_BASE64.encode(&self.nonce),
            WIRE_BASE64.encode(&self.ciphertext),
            WIRE_BASE64.encode(&self.tag),
        )
    }

    /// Encode to the wire format with `mask` in the trailing field.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::MalformedEnvelope`] if `mask` contains the
    /// field delimiter, since the result could not be parsed back.
    pub fn with_mask(&self, mask: &str) -> Result<String> {
        if mask.contains(DELIMITER) {
            return Err(EnvelopeError::MalformedEnvelope(
                "display mask must not contain the field delimiter",
            ));
        }
        let mut wire = self.to_wire();
        wire.push_str(mask);
        Ok(wire)
    }

    /// Returns `true` if `text` carries the envelope sentinel.
    pub fn is_envelope(text: &str) -> bool {
        text.strip_prefix(SENTINEL)
            .is_some_and(|rest| rest.starts_with(DELIMITER))
    }

    /// Read only the algorithm field of an envelope.
    ///
    /// # Errors
    ///
    /// [`EnvelopeError::MalformedEnvelope`] if `text` is not an envelope, or
    /// [`EnvelopeError::UnknownAlgorithm`] if the code is not recognised.
    pub fn peek_mode(text: &str) -> Result<AlgorithmMode> {
        if !Self::is_envelope(text) {
            return Err(EnvelopeError::MalformedEnvelope("missing `_mask|` sentinel"));
        }
        let code = text
            .split(DELIMITER)
            .nth(1)
            .ok_or(EnvelopeError::MalformedEnvelope("missing algorithm field"))?;
        AlgorithmMode::from_code(code)
    }

    /// The display mask carried by a well-formed envelope, if any.
    ///
    /// Returns `None` when `text` does not have the envelope structure; an
    /// envelope with no mask yields `Some("")`.
    pub fn display_mask(text: &str) -> Option<&str> {
        let fields = split_fields(text).ok()?;
        Some(fields[FIELD_COUNT - 1])
    }

    /// Parse an envelope string.
    ///
    /// The trailing display mask is ignored.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MalformedEnvelope`] unless the string splits into
    ///   exactly six fields starting with the sentinel, every byte field is
    ///   valid base64url, and the nonce length matches the suite.
    /// - [`EnvelopeError::UnknownAlgorithm`] if the code is not recognised.
    pub fn parse(text: &str) -> Result<Self> {
        let fields = split_fields(text)?;
        let mode = AlgorithmMode::from_code(fields[1])?;

        let nonce = decode_field(fields[2])?;
        if nonce.len() != mode.nonce_len() {
            return Err(EnvelopeError::MalformedEnvelope(
                "nonce length does not match the algorithm",
            ));
        }
        let ciphertext = decode_field(fields[3])?;
        let tag = decode_field(fields[4])?;

        Ok(Self {
            mode,
            nonce,
            ciphertext,
            tag,
        })
    }
}

fn split_fields(text: &str) -> Result<Vec<&str>> {
    let fields: Vec<&str> = text.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT || fields[0] != SENTINEL {
        return Err(EnvelopeError::MalformedEnvelope(
            "expected `_mask|` followed by five fields",
        ));
    }
    Ok(fields)
}

fn decode_field(field: &str) -> Result<Vec<u8>> {
    WIRE_BASE64
        .decode(field)
        .map_err(|_| EnvelopeError::MalformedEnvelope("invalid base64url field"))
}

impl fmt::Display for EncryptionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl FromStr for EncryptionResult {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
