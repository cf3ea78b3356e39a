//! Field-level protection of JSON documents.
//!
//! [`FieldCodec`] turns one plaintext value into `envelope + mask` and back.
//! [`protect_fields`] and [`reveal_fields`] apply it to every string leaf at a
//! set of dot-notation paths inside a `serde_json::Value`.

use std::sync::Arc;

use serde_json::Value;

use crate::crypto::EncryptionResult;
use crate::error::{FieldError, MaskError};
use crate::mask::{MaskRule, Masker};
use crate::service::EnvelopeService;

/// Masks and encrypts single values, and reverses that.
#[derive(Debug, Clone)]
pub struct FieldCodec {
    service: Arc<EnvelopeService>,
    masker: Arc<Masker>,
}

impl FieldCodec {
    pub fn new(service: Arc<EnvelopeService>, masker: Arc<Masker>) -> Self {
        Self { service, masker }
    }

    pub fn service(&self) -> &EnvelopeService {
        &self.service
    }

    pub fn masker(&self) -> &Masker {
        &self.masker
    }

    /// Validate and mask `plaintext`, encrypt it under the active suite, and
    /// return the envelope with the mask appended.
    ///
    /// An empty value is returned unchanged.
    pub fn protect(&self, rule: &MaskRule, plaintext: &str) -> Result<String, FieldError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        let mask = self.masker.mask(rule, plaintext)?;
        Ok(self.service.encrypt_with_mask(plaintext, &mask)?)
    }

    /// Recover the plaintext behind `value`.
    ///
    /// - empty values are returned unchanged;
    /// - envelopes are decrypted with the suite named in their tag;
    /// - other values pass through if they satisfy the rule's pattern, so
    ///   rows written before protection was enabled still read back.
    ///
    /// # Errors
    ///
    /// [`MaskError::Rejected`] for a raw value that fails the pattern, or any
    /// decryption error.
    pub fn reveal(&self, rule: &MaskRule, value: &str) -> Result<String, FieldError> {
        if value.is_empty() {
            return Ok(String::new());
        }
        if EncryptionResult::is_envelope(value) {
            return Ok(self.service.decrypt(value)?);
        }
        if self.masker.matches(rule, value)? {
            return Ok(value.to_owned());
        }
        Err(MaskError::Rejected(rule.kind).into())
    }
}

/// A mask rule bound to a location in a JSON document.
///
/// Paths use `.` between object keys and a `[]` suffix to expand an array,
/// e.g. `"orders[].card"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub path: String,
    pub rule: MaskRule,
}

impl FieldRule {
    pub fn new(path: impl Into<String>, rule: impl Into<MaskRule>) -> Self {
        Self {
            path: path.into(),
            rule: rule.into(),
        }
    }
}

/// Protect every string leaf at each rule's path. Missing paths and
/// non-string leaves are left untouched.
///
/// Stops at the first failing field; `payload` may then be partly protected.
pub fn protect_fields(
    codec: &FieldCodec,
    payload: &mut Value,
    rules: &[FieldRule],
) -> Result<(), FieldError> {
    for field in rules {
        let segments = parse_path(&field.path);
        transform_at_path(payload, &segments, &mut |s: &str| codec.protect(&field.rule, s))?;
    }
    Ok(())
}

/// Reveal every string leaf at each rule's path.
pub fn reveal_fields(
    codec: &FieldCodec,
    payload: &mut Value,
    rules: &[FieldRule],
) -> Result<(), FieldError> {
    for field in rules {
        let segments = parse_path(&field.path);
        transform_at_path(payload, &segments, &mut |s: &str| codec.reveal(&field.rule, s))?;
    }
    Ok(())
}

/// Segments of a dot-notation field path.
#[derive(Debug, PartialEq, Eq)]
enum PathSegment {
    /// Navigate into an object property by name.
    Key(String),
    /// Expand into every element of a JSON array.
    ArrayItem,
}

/// `"orders[].card"` → `[Key("orders"), ArrayItem, Key("card")]`.
fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if let Some(key) = part.strip_suffix("[]") {
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_owned()));
            }
            segments.push(PathSegment::ArrayItem);
        } else {
            segments.push(PathSegment::Key(part.to_owned()));
        }
    }
    segments
}

fn transform_at_path<F>(
    value: &mut Value,
    segments: &[PathSegment],
    transform: &mut F,
) -> Result<(), FieldError>
where
    F: FnMut(&str) -> Result<String, FieldError>,
{
    let Some((head, rest)) = segments.split_first() else {
        if let Value::String(s) = value {
            *s = transform(s.as_str())?;
        }
        return Ok(());
    };

    match head {
        PathSegment::Key(key) => {
            if let Value::Object(map) = value {
                if let Some(child) = map.get_mut(key) {
                    transform_at_path(child, rest, transform)?;
                }
            }
        }
        PathSegment::ArrayItem => {
            if let Value::Array(items) = value {
                for item in items.iter_mut() {
                    transform_at_path(item, rest, transform)?;
                }
            }
        }
    }
    Ok(())
}
