//! [`Masker`]: validation and masking, with a compiled-pattern cache.

use std::{
    collections::HashMap,
    iter,
    sync::{PoisonError, RwLock},
};

use regex::Regex;

use super::{kind::SensitiveType, rule::MaskRule};
use crate::{crypto::envelope::DELIMITER, error::MaskError};

const MASK_CHAR: char = '*';

/// Validates and masks values according to a [`MaskRule`].
///
/// Compiled patterns are cached by source text. A miss compiles under the
/// write lock so each pattern is compiled once.
#[derive(Debug, Default)]
pub struct Masker {
    patterns: RwLock<HashMap<String, Regex>>,
}

impl Masker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled form of `pattern`, compiling and caching it on first use.
    ///
    /// # Errors
    ///
    /// [`MaskError::InvalidPattern`] if `pattern` does not compile. Failures
    /// are not cached.
    pub fn pattern(&self, pattern: &str) -> Result<Regex, MaskError> {
        if let Some(regex) = self
            .patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return Ok(regex.clone());
        }

        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(regex) = patterns.get(pattern) {
            return Ok(regex.clone());
        }
        let regex = Regex::new(pattern)?;
        patterns.insert(pattern.to_owned(), regex.clone());
        Ok(regex)
    }

    /// Whether `source` satisfies the rule's pattern. An empty pattern
    /// matches everything.
    pub fn matches(&self, rule: &MaskRule, source: &str) -> Result<bool, MaskError> {
        if rule.regex.is_empty() {
            return Ok(true);
        }
        Ok(self.pattern(&rule.regex)?.is_match(source))
    }

    /// Validate `source` against `rule` and return its masked form.
    ///
    /// Blank input is returned unchanged. Kept characters equal to the
    /// envelope delimiter are starred so the mask can always be embedded.
    pub fn mask(&self, rule: &MaskRule, source: &str) -> Result<String, MaskError> {
        if is_blank(source) {
            return Ok(source.to_owned());
        }
        if rule.must_match && !self.matches(rule, source)? {
            return Err(MaskError::Rejected(rule.kind));
        }

        let masked = match rule.kind {
            SensitiveType::ChineseName => mask_chinese_name(source)?,
            SensitiveType::Email => mask_email(source)?,
            _ => mask_with_index(source, rule.prefix, rule.suffix)?,
        };
        Ok(star_delimiters(masked))
    }

    pub fn cached_patterns(&self) -> usize {
        self.patterns.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Keep `prefix` leading and `suffix` trailing characters and star the rest.
///
/// Lengths count `char`s, not bytes. Blank input is returned unchanged.
///
/// # Errors
///
/// [`MaskError::TooShort`] if nothing would be left to star.
pub fn mask_with_index(source: &str, prefix: usize, suffix: usize) -> Result<String, MaskError> {
    if is_blank(source) {
        return Ok(source.to_owned());
    }
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let keep = prefix.saturating_add(suffix);
    if keep >= len {
        return Err(MaskError::TooShort { keep, len });
    }

    let mut masked = String::with_capacity(source.len());
    masked.extend(&chars[..prefix]);
    masked.extend(iter::repeat(MASK_CHAR).take(len - keep));
    masked.extend(&chars[len - suffix..]);
    Ok(masked)
}

fn mask_chinese_name(source: &str) -> Result<String, MaskError> {
    match source.chars().count() {
        len @ 0..=1 => Err(MaskError::TooShort { keep: 2, len }),
        2 => mask_with_index(source, 1, 0),
        3 => mask_with_index(source, 1, 1),
        _ => mask_with_index(source, 2, 1),
    }
}

fn mask_email(source: &str) -> Result<String, MaskError> {
    let (local, domain) = source.split_once('@').ok_or(MaskError::InvalidEmail)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(MaskError::InvalidEmail);
    }

    let visible = match local.chars().count() {
        1 => 0,
        2..=4 => 2,
        _ => 4,
    };
    let head: String = local.chars().take(visible).collect();
    let stars = if visible == 0 { "*" } else { "*****" };
    Ok(format!("{head}{stars}@{domain}"))
}

fn star_delimiters(masked: String) -> String {
    if !masked.contains(DELIMITER) {
        return masked;
    }
    masked
        .chars()
        .map(|c| if c == DELIMITER { MASK_CHAR } else { c })
        .collect()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
