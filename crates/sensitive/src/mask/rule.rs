use std::borrow::Cow;

use super::kind::SensitiveType;

/// How one field is validated and masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskRule {
    pub kind: SensitiveType,
    pub prefix: usize,
    pub suffix: usize,
    /// Validation pattern. Empty means no validation.
    pub regex: Cow<'static, str>,
    /// Reject values that fail `regex` instead of masking them anyway.
    pub must_match: bool,
}

impl MaskRule {
    /// Pattern used by [`MaskRule::custom`] when the caller has none.
    pub const DEFAULT_CUSTOM_PATTERN: &'static str = r"^[\p{L}\p{N}]*$";

    /// The catalog rule for `kind`. Validation is enforced for every kind
    /// except [`SensitiveType::Custom`].
    pub fn of(kind: SensitiveType) -> Self {
        Self {
            kind,
            prefix: kind.prefix(),
            suffix: kind.suffix(),
            regex: Cow::Borrowed(kind.regex()),
            must_match: kind != SensitiveType::Custom,
        }
    }

    /// A caller-defined rule, masked purely by index.
    pub fn custom(
        prefix: usize,
        suffix: usize,
        regex: impl Into<Cow<'static, str>>,
        must_match: bool,
    ) -> Self {
        Self {
            kind: SensitiveType::Custom,
            prefix,
            suffix,
            regex: regex.into(),
            must_match,
        }
    }
}

impl Default for MaskRule {
    fn default() -> Self {
        Self::custom(1, 1, Self::DEFAULT_CUSTOM_PATTERN, true)
    }
}

impl From<SensitiveType> for MaskRule {
    fn from(kind: SensitiveType) -> Self {
        Self::of(kind)
    }
}
