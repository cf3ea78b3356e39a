//! Request and response types for the HTTP API.
//!
//! These types are serialised as JSON. They carry only plain strings, so this
//! crate does not depend on the encryption library.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

/// One field to protect or reveal inside `payload`.
///
/// `type` names a sensitive type (`"mobile_phone"`, `"email"`, ...). Setting
/// any of the optional overrides turns the rule into a custom index mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRuleSpec {
    /// Dot-notation path; `[]` expands an array, e.g. `"orders[].card"`.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_match: Option<bool>,
}

impl FieldRuleSpec {
    pub fn new(path: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
            prefix: None,
            suffix: None,
            regex: None,
            must_match: None,
        }
    }

    /// Whether any override is set.
    pub fn is_custom(&self) -> bool {
        self.prefix.is_some()
            || self.suffix.is_some()
            || self.regex.is_some()
            || self.must_match.is_some()
    }
}

// ---------------------------------------------------------------------------
// Protect / reveal endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /protect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectRequest {
    /// Arbitrary JSON document.
    pub payload: serde_json::Value,
    /// Fields of `payload` to mask and encrypt.
    pub fields: Vec<FieldRuleSpec>,
}

/// Successful response body for `POST /protect`.
///
/// Listed string fields are replaced by `_mask|<code>|...|<mask>` envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectResponse {
    pub payload: serde_json::Value,
}

/// Request body for `POST /reveal`. Same shape as [`ProtectRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealRequest {
    pub payload: serde_json::Value,
    pub fields: Vec<FieldRuleSpec>,
}

/// Successful response body for `POST /reveal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResponse {
    pub payload: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.message())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    /// Algorithm code used for new encryptions.
    pub active_mode: String,
    /// Algorithm codes that can be decrypted.
    pub supported_modes: Vec<String>,
}
