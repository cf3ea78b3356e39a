//! [`SensitiveType`]: the catalog of known sensitive value shapes.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const BANK_CARD: &str = r"^[1-9]\d{12,18}$";
const EMAIL: &str = r"^(?i)[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$";
const CITIZEN_ID: &str = r"(^[1-9]\d{5}\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{2}[0-9Xx]$)|(^[1-9]\d{5}(18|19|20)\d{2}((0[1-9])|(1[0-2]))(([0-2][1-9])|10|20|30|31)\d{3}[0-9Xx]$)";
const MOBILE_PHONE: &str = r"^1[3-9]\d{9}$";
const TELEPHONE: &str = r"^(0\d{2,3}[-\s]?)?\d{7,8}([-\s]?\d{1,6})?$";
const CHINESE_NAME: &str = r"^[\x{4e00}-\x{9fa5}]+(·[\x{4e00}-\x{9fa5}]+)*$";
const ENGLISH_NAME: &str = r"^[A-Za-z][A-Za-z'\-.]{1,19}(?:\s+[A-Za-z][A-Za-z'\-.]{1,19})*$";
const CUSTOM: &str = r"^[\p{L}\p{N}]*$";

/// A kind of sensitive value, with its validation pattern and default
/// visible prefix/suffix lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveType {
    BankCard,
    Email,
    CitizenId,
    MobilePhone,
    Telephone,
    ChineseName,
    EnglishName,
    Custom,
}

impl SensitiveType {
    pub const ALL: [SensitiveType; 8] = [
        SensitiveType::BankCard,
        SensitiveType::Email,
        SensitiveType::CitizenId,
        SensitiveType::MobilePhone,
        SensitiveType::Telephone,
        SensitiveType::ChineseName,
        SensitiveType::EnglishName,
        SensitiveType::Custom,
    ];

    /// Stable snake_case name, as used in JSON.
    pub fn name(self) -> &'static str {
        match self {
            SensitiveType::BankCard => "bank_card",
            SensitiveType::Email => "email",
            SensitiveType::CitizenId => "citizen_id",
            SensitiveType::MobilePhone => "mobile_phone",
            SensitiveType::Telephone => "telephone",
            SensitiveType::ChineseName => "chinese_name",
            SensitiveType::EnglishName => "english_name",
            SensitiveType::Custom => "custom",
        }
    }

    /// Validation pattern for values of this type.
    pub fn regex(self) -> &'static str {
        match self {
            SensitiveType::BankCard => BANK_CARD,
            SensitiveType::Email => EMAIL,
            SensitiveType::CitizenId => CITIZEN_ID,
            SensitiveType::MobilePhone => MOBILE_PHONE,
            SensitiveType::Telephone => TELEPHONE,
            SensitiveType::ChineseName => CHINESE_NAME,
            SensitiveType::EnglishName => ENGLISH_NAME,
            SensitiveType::Custom => CUSTOM,
        }
    }

    /// Leading characters left visible.
    pub fn prefix(self) -> usize {
        match self {
            SensitiveType::BankCard | SensitiveType::CitizenId => 6,
            SensitiveType::Email | SensitiveType::MobilePhone | SensitiveType::Telephone => 3,
            SensitiveType::ChineseName | SensitiveType::EnglishName | SensitiveType::Custom => 1,
        }
    }

    /// Trailing characters left visible.
    pub fn suffix(self) -> usize {
        match self {
            SensitiveType::ChineseName | SensitiveType::EnglishName | SensitiveType::Custom => 1,
            _ => 4,
        }
    }
}

impl fmt::Display for SensitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unrecognised type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensitive type: {0}")]
pub struct UnknownSensitiveType(pub String);

impl FromStr for SensitiveType {
    type Err = UnknownSensitiveType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensitiveType::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownSensitiveType(s.to_owned()))
    }
}
